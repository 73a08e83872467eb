//! Stream framing and term matching.
//!
//! The transport speaks one frame per line: `NAME <json>`. Only two frames
//! matter here, `HISTORY [<msg>, ...]` (once per connection) and `MSG <msg>`;
//! everything else (joins, pings, broadcasts) is ignored.

use crate::error::{Result, SourceError};
use crate::source::{ChatMessage, StreamEvent};
use linkwall_core::Mention;

/// Parse one line. `Ok(None)` for frames the feed does not use.
pub fn parse_frame(line: &str) -> Result<Option<StreamEvent>> {
    let line = line.trim();
    let Some((name, payload)) = line.split_once(' ') else {
        return Ok(None);
    };
    match name {
        "HISTORY" => {
            let messages: Vec<ChatMessage> = serde_json::from_str(payload)?;
            Ok(Some(StreamEvent::History(messages)))
        }
        "MSG" => {
            let message: ChatMessage = serde_json::from_str(payload)?;
            Ok(Some(StreamEvent::Message(message)))
        }
        _ => Ok(None),
    }
}

/// Terms `msg` matches: case-insensitive substring of its text or nick.
pub fn matching_terms(msg: &ChatMessage, terms: &[String]) -> Vec<String> {
    let text = msg.text.to_lowercase();
    let nick = msg.nick.to_lowercase();
    terms
        .iter()
        .filter(|t| {
            let t = t.to_lowercase();
            !t.is_empty() && (text.contains(&t) || nick.contains(&t))
        })
        .cloned()
        .collect()
}

/// Mention for a streamed message, or `None` when no term matches.
pub fn to_mention(msg: &ChatMessage, terms: &[String]) -> Option<Mention> {
    let matched = matching_terms(msg, terms);
    if matched.is_empty() {
        return None;
    }
    let mut mention = Mention::new(msg.timestamp, msg.nick.clone(), msg.text.clone());
    mention.is_streaming = true;
    for term in &matched {
        mention.add_term(term);
    }
    Some(mention)
}

pub(crate) fn frame_error(line: &str, err: SourceError) -> SourceError {
    let head: String = line.chars().take(40).collect();
    SourceError::Parse(format!("{err} in frame {head:?}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn msg(nick: &str, text: &str) -> ChatMessage {
        ChatMessage {
            timestamp: chrono::DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            nick: nick.into(),
            text: text.into(),
            features: vec![],
        }
    }

    #[test]
    fn parses_msg_frames() {
        let event = parse_frame(
            r#"MSG {"nick":"ferris","data":"hi https://youtu.be/x","timestamp":1700000000000,"features":["subscriber"]}"#,
        )
        .unwrap();
        let Some(StreamEvent::Message(m)) = event else {
            panic!("expected a message, got {event:?}");
        };
        assert_eq!(m.nick, "ferris");
        assert_eq!(m.text, "hi https://youtu.be/x");
        assert_eq!(m.timestamp.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(m.features, vec!["subscriber"]);
    }

    #[test]
    fn parses_history_frames() {
        let event = parse_frame(
            r#"HISTORY [{"nick":"a","data":"one","timestamp":1},{"nick":"b","data":"two","timestamp":2}]"#,
        )
        .unwrap();
        match event {
            Some(StreamEvent::History(list)) => assert_eq!(list.len(), 2),
            other => panic!("expected history, got {other:?}"),
        }
    }

    #[test]
    fn ignores_unknown_frames_and_rejects_garbage() {
        assert_eq!(parse_frame(r#"JOIN {"nick":"a"}"#).unwrap(), None);
        assert_eq!(parse_frame("PING").unwrap(), None);
        assert!(parse_frame("MSG {not json").is_err());
    }

    #[test]
    fn matches_text_or_nick_case_insensitively() {
        let terms = vec!["Rust".to_string(), "bob".to_string()];
        assert_eq!(matching_terms(&msg("Bobby", "nothing"), &terms), vec!["bob"]);
        assert_eq!(matching_terms(&msg("x", "RUSTACEANS"), &terms), vec!["Rust"]);
        assert!(to_mention(&msg("x", "nope"), &terms).is_none());
    }

    #[test]
    fn streamed_mentions_are_flagged() {
        let m = to_mention(&msg("x", "rust"), &["rust".to_string()]).unwrap();
        assert!(m.is_streaming);
        assert_eq!(m.matched_terms, vec!["rust"]);
    }
}
