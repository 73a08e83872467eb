//! Filter settings and their migration from older stored shapes.
//!
//! [`FilterConfig`] is read-only input to the card pipeline. It arrives from
//! the configuration store as loosely typed JSON, so [`migrate`] is the single
//! place that knows about legacy field shapes:
//!
//! - `terms`, `bannedTerms`, `bannedUsers` stored as comma-separated strings
//! - `mutedUsers` stored as bare nicks (treated as permanent mutes) or as a
//!   `{nick: until}` map
//! - `showEmbeds: false` meaning "render every platform as text"
//! - per-platform booleans (`true` → embed, `false` → filter)
//!
//! Keys are accepted in camelCase and snake_case. Anything the pipeline does
//! not interpret is kept verbatim in [`FilterConfig::cosmetic`].

use crate::types::{MuteEntry, Platform, VisibilityMode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MigrateError {
    #[error("settings must be a table, found {0}")]
    NotATable(&'static str),
    #[error("`{field}` must be a string or a list of strings")]
    BadList { field: &'static str },
    #[error("`{field}` must be a boolean")]
    BadFlag { field: &'static str },
    #[error("invalid mute entry for `{nick}`: {reason}")]
    BadMute { nick: String, reason: String },
    #[error("invalid visibility `{value}` for platform `{platform}`")]
    BadVisibility { platform: String, value: String },
}

/// Settings consumed by the filter pipeline and the link classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterConfig {
    pub terms: Vec<String>,
    pub show_nsfw: bool,
    pub show_nsfl: bool,
    pub show_non_links: bool,
    pub banned_terms: Vec<String>,
    pub banned_users: Vec<String>,
    pub muted_users: Vec<MuteEntry>,
    pub platform_visibility: HashMap<Platform, VisibilityMode>,
    /// Display-only settings (emotes, trusted users, loading imagery) passed
    /// through untouched. Nothing in the pipeline reads them.
    pub cosmetic: BTreeMap<String, Value>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            terms: Vec::new(),
            show_nsfw: false,
            show_nsfl: false,
            show_non_links: false,
            banned_terms: Vec::new(),
            banned_users: Vec::new(),
            muted_users: Vec::new(),
            platform_visibility: HashMap::new(),
            cosmetic: BTreeMap::new(),
        }
    }
}

impl FilterConfig {
    /// Visibility for `platform`; unlisted platforms embed.
    pub fn visibility(&self, platform: Platform) -> VisibilityMode {
        self.platform_visibility
            .get(&platform)
            .copied()
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Migration
// ---------------------------------------------------------------------------

const KNOWN_KEYS: &[&str] = &[
    "terms",
    "show_nsfw",
    "showNsfw",
    "show_nsfl",
    "showNsfl",
    "show_non_links",
    "showNonLinks",
    "banned_terms",
    "bannedTerms",
    "banned_users",
    "bannedUsers",
    "muted_users",
    "mutedUsers",
    "platform_visibility",
    "platformVisibility",
    "show_embeds",
    "showEmbeds",
];

/// Upgrade a raw stored settings value into a [`FilterConfig`].
///
/// Pure and idempotent: migrating the serialized output of a previous
/// migration yields the same config.
pub fn migrate(raw: &Value) -> Result<FilterConfig, MigrateError> {
    let table = match raw {
        Value::Object(map) => map,
        Value::Null => return Ok(FilterConfig::default()),
        other => return Err(MigrateError::NotATable(json_kind(other))),
    };

    let mut cfg = FilterConfig {
        terms: list(table, "terms", "terms")?,
        show_nsfw: flag(table, "show_nsfw", "showNsfw")?.unwrap_or(false),
        show_nsfl: flag(table, "show_nsfl", "showNsfl")?.unwrap_or(false),
        show_non_links: flag(table, "show_non_links", "showNonLinks")?.unwrap_or(false),
        banned_terms: list(table, "banned_terms", "bannedTerms")?,
        banned_users: list(table, "banned_users", "bannedUsers")?,
        muted_users: mutes(lookup(table, "muted_users", "mutedUsers"))?,
        platform_visibility: visibility(lookup(table, "platform_visibility", "platformVisibility"))?,
        cosmetic: BTreeMap::new(),
    };

    if flag(table, "show_embeds", "showEmbeds")? == Some(false) {
        for platform in Platform::ALL {
            let mode = cfg.platform_visibility.entry(platform).or_insert(VisibilityMode::Text);
            if *mode == VisibilityMode::Embed {
                *mode = VisibilityMode::Text;
            }
        }
    }

    cfg.cosmetic = table
        .iter()
        .filter(|(k, _)| !KNOWN_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(cfg)
}

fn lookup<'a>(table: &'a Map<String, Value>, snake: &str, camel: &str) -> Option<&'a Value> {
    table.get(snake).or_else(|| table.get(camel))
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a table",
    }
}

fn flag(
    table: &Map<String, Value>,
    snake: &'static str,
    camel: &str,
) -> Result<Option<bool>, MigrateError> {
    match lookup(table, snake, camel) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) => match s.trim() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(MigrateError::BadFlag { field: snake }),
        },
        Some(_) => Err(MigrateError::BadFlag { field: snake }),
    }
}

/// Lists may be stored as arrays or as legacy comma-separated strings.
/// Entries are trimmed; empty entries are dropped.
fn list(
    table: &Map<String, Value>,
    snake: &'static str,
    camel: &str,
) -> Result<Vec<String>, MigrateError> {
    let items: Vec<String> = match lookup(table, snake, camel) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| match v {
                Value::String(s) => Ok(s.clone()),
                _ => Err(MigrateError::BadList { field: snake }),
            })
            .collect::<Result<_, _>>()?,
        Some(_) => return Err(MigrateError::BadList { field: snake }),
    };
    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

fn mutes(value: Option<&Value>) -> Result<Vec<MuteEntry>, MigrateError> {
    let permanent = DateTime::<Utc>::MAX_UTC;
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(s
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|nick| MuteEntry { nick: nick.to_string(), mute_until: permanent })
            .collect()),
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| match v {
                Value::String(nick) => Ok(MuteEntry { nick: nick.trim().to_string(), mute_until: permanent }),
                Value::Object(entry) => {
                    let nick = entry
                        .get("nick")
                        .and_then(Value::as_str)
                        .ok_or_else(|| MigrateError::BadMute {
                            nick: String::new(),
                            reason: "missing nick".to_string(),
                        })?;
                    let until = lookup(entry, "mute_until", "muteUntil");
                    Ok(MuteEntry { nick: nick.to_string(), mute_until: mute_time(nick, until)? })
                }
                other => Err(MigrateError::BadMute {
                    nick: String::new(),
                    reason: format!("expected a nick or a table, found {}", json_kind(other)),
                }),
            })
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(nick, until)| {
                Ok(MuteEntry { nick: nick.clone(), mute_until: mute_time(nick, Some(until))? })
            })
            .collect(),
        Some(other) => Err(MigrateError::BadMute {
            nick: String::new(),
            reason: format!("expected a list or a table, found {}", json_kind(other)),
        }),
    }
}

/// Mute deadlines are epoch milliseconds or RFC 3339 strings; absent means permanent.
fn mute_time(nick: &str, value: Option<&Value>) -> Result<DateTime<Utc>, MigrateError> {
    let bad = |reason: &str| MigrateError::BadMute { nick: nick.to_string(), reason: reason.to_string() };
    match value {
        None | Some(Value::Null) => Ok(DateTime::<Utc>::MAX_UTC),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .ok_or_else(|| bad("timestamp out of range")),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| bad(&e.to_string())),
        Some(_) => Err(bad("expected epoch milliseconds or an RFC 3339 string")),
    }
}

fn visibility(value: Option<&Value>) -> Result<HashMap<Platform, VisibilityMode>, MigrateError> {
    let mut out = HashMap::new();
    let map = match value {
        None | Some(Value::Null) => return Ok(out),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(MigrateError::BadVisibility {
                platform: "*".to_string(),
                value: json_kind(other).to_string(),
            })
        }
    };
    for (name, mode) in map {
        let Some(platform) = Platform::from_name(name) else {
            tracing::debug!(platform = %name, "ignoring visibility for unknown platform");
            continue;
        };
        let mode = match mode {
            Value::Bool(true) => VisibilityMode::Embed,
            Value::Bool(false) => VisibilityMode::Filter,
            Value::String(s) => VisibilityMode::parse(s).ok_or_else(|| MigrateError::BadVisibility {
                platform: name.clone(),
                value: s.clone(),
            })?,
            other => {
                return Err(MigrateError::BadVisibility {
                    platform: name.clone(),
                    value: other.to_string(),
                })
            }
        };
        out.insert(platform, mode);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
