//! Configuration types for linkwall.
//!
//! [`Config::load`] reads `~/.config/linkwall/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::defaults`] returns
//! the same defaults without touching the filesystem (useful in tests).
//!
//! The `[filter]` table is kept as raw JSON and only becomes a
//! [`FilterConfig`] through [`crate::settings::migrate`], so older settings
//! files keep loading.

use crate::settings::{self, FilterConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[sources]
primary_url        = "https://polecat.me/api"
fallback_url       = "https://api-v2.rustlesearch.dev/anon"
stream_url         = "https://chat.destiny.gg/stream"
page_size          = 50
history_timeout_ms = 5000
request_timeout_ms = 10000

[layout]
breakpoints   = [640, 1024, 1440]
cell_width_px = 8

[ui]
show_timestamps  = true
timestamp_format = "%Y-%m-%d %H:%M"
"#;

// Written into a freshly created file only. Filter defaults live in
// `settings::migrate`; layering a `[filter]` table under the user's file would
// shadow the camelCase spellings older files use.
const STARTER_FILTER: &str = r#"
# [filter]
# terms          = ["rust"]
# show_nsfw      = false
# show_nsfl      = false
# show_non_links = false
# banned_terms   = []
# banned_users   = []
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration, loaded from `~/.config/linkwall/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub ui: UiConfig,
    /// Raw `[filter]` table; see [`Config::filter`].
    #[serde(default)]
    pub filter: serde_json::Value,
}

/// `[sources]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_primary_url")]
    pub primary_url: String,
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    /// Empty disables the streaming transport.
    #[serde(default = "default_stream_url")]
    pub stream_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_history_timeout_ms")]
    pub history_timeout_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_primary_url() -> String { "https://polecat.me/api".to_string() }
fn default_fallback_url() -> String { "https://api-v2.rustlesearch.dev/anon".to_string() }
fn default_stream_url() -> String { "https://chat.destiny.gg/stream".to_string() }
fn default_page_size() -> usize { 50 }
fn default_history_timeout_ms() -> u64 { 5_000 }
fn default_request_timeout_ms() -> u64 { 10_000 }

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            primary_url: default_primary_url(),
            fallback_url: default_fallback_url(),
            stream_url: default_stream_url(),
            page_size: default_page_size(),
            history_timeout_ms: default_history_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl SourcesConfig {
    pub fn history_timeout(&self) -> Duration {
        Duration::from_millis(self.history_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// `[layout]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    /// Viewport widths (px) at which the grid grows to 2, 3 and 4 columns.
    #[serde(default = "default_breakpoints")]
    pub breakpoints: [u32; 3],
    /// Pixel width assumed per terminal cell when converting to a viewport width.
    #[serde(default = "default_cell_width_px")]
    pub cell_width_px: u32,
}

fn default_breakpoints() -> [u32; 3] { crate::layout::DEFAULT_BREAKPOINTS }
fn default_cell_width_px() -> u32 { 8 }

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            breakpoints: default_breakpoints(),
            cell_width_px: default_cell_width_px(),
        }
    }
}

/// `[ui]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_show_timestamps")]
    pub show_timestamps: bool,
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

fn default_show_timestamps() -> bool { true }
fn default_timestamp_format() -> String { "%Y-%m-%d %H:%M".to_string() }

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_timestamps: default_show_timestamps(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/linkwall/config.toml`, layered on top of the
    /// built-in defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path())
    }

    /// Same as [`Config::load`] for an explicit path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, format!("{}{STARTER_FILTER}", DEFAULT_CONFIG.trim_start()))?;
        }

        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(false))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    /// Migrate the `[filter]` table into a [`FilterConfig`].
    pub fn filter(&self) -> Result<FilterConfig, settings::MigrateError> {
        settings::migrate(&self.filter)
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("linkwall")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
