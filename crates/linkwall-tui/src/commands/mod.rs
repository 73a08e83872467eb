// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

use crate::app::{AppState, DisplayMode};
use linkwall_core::embed::parse_start_time;

/// Mute length used when `mute` is given no duration, and by the `m` key.
pub fn default_mute() -> chrono::Duration {
    chrono::Duration::minutes(10)
}

/// A parsed, validated command ready to be executed by the app shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    // Replace the search terms, restarting the feed
    Terms(Vec<String>),
    Refresh,
    Mute { nick: String, duration: chrono::Duration },
    Unmute(String),
    // Toggle timestamps on cards
    Timestamps,
    // Switch to the overview grid / single-card view
    Grid,
    Focus,
}

impl Command {
    /// Parse a raw command string (the text after the `:` prefix).
    ///
    /// An empty string returns `Err("")` as a sentinel meaning "close
    /// without acting".
    pub fn parse(input: &str) -> Result<Command, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err(String::new());
        }

        let (word, rest) = input
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((input, ""));

        match word {
            "q" | "quit" => Ok(Command::Quit),
            "help" => Ok(Command::Help),
            "r" | "refresh" => Ok(Command::Refresh),
            "ts" | "timestamps" => Ok(Command::Timestamps),
            "grid" => Ok(Command::Grid),
            "focus" => Ok(Command::Focus),
            "terms" | "t" => {
                let terms: Vec<String> = rest
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect();
                if terms.is_empty() {
                    Err("usage: terms <term> [term...]".to_string())
                } else {
                    Ok(Command::Terms(terms))
                }
            }
            "mute" => {
                let mut parts = rest.split_whitespace();
                let Some(nick) = parts.next() else {
                    return Err("usage: mute <nick> [duration, e.g. 30m or 1h]".to_string());
                };
                let duration = match parts.next() {
                    None => default_mute(),
                    Some(raw) => match parse_start_time(raw)
                        .filter(|&secs| secs > 0)
                        .and_then(|secs| i64::try_from(secs).ok())
                        .and_then(chrono::TimeDelta::try_seconds)
                    {
                        Some(duration) => duration,
                        None => return Err(format!("invalid duration: {raw}")),
                    },
                };
                Ok(Command::Mute { nick: nick.to_string(), duration })
            }
            "unmute" => {
                if rest.is_empty() {
                    Err("usage: unmute <nick>".to_string())
                } else {
                    Ok(Command::Unmute(rest.to_string()))
                }
            }
            other => Err(format!("unknown command: {other}")),
        }
    }
}

/// Execute a parsed [`Command`] against the application state.
pub fn execute_command(s: &mut AppState, cmd: Command) {
    match cmd {
        Command::Quit => s.quit = true,
        Command::Help => s.show_help = !s.show_help,
        Command::Terms(terms) => {
            s.feed.set_terms(terms);
        }
        Command::Refresh => {
            s.feed.refresh();
        }
        Command::Mute { nick, duration } => {
            s.feed.mute(nick, duration);
        }
        Command::Unmute(nick) => {
            s.feed.unmute(nick);
        }
        Command::Timestamps => s.show_timestamps = !s.show_timestamps,
        Command::Grid => s.mode = DisplayMode::Overview,
        Command::Focus => s.mode = DisplayMode::Highlight,
    }
}
