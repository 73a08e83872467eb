//! Semantic application events — crossterm key events mapped to a
//! widget-agnostic vocabulary so widgets never touch crossterm directly.
//!
//! | Key(s)                       | Event           |
//! |------------------------------|-----------------|
//! | `q`, `Ctrl+c`                | `Quit`          |
//! | `→` / `l` / `↓` / `j` / `n`  | `Next`          |
//! | `←` / `h` / `↑` / `k` / `p`  | `Previous`      |
//! | `g` / `Home`                 | `First`         |
//! | `G` / `End`                  | `Last`          |
//! | `Tab`                        | `ToggleMode`    |
//! | `r`                          | `Refresh`       |
//! | `m`                          | `MuteCurrent`   |
//! | printable char               | `Char(c)`       |
//! | `Backspace`                  | `Backspace`     |
//! | `Enter`                      | `Enter`         |
//! | `Esc`                        | `Escape`        |
//! | terminal resize              | `Resize(w, h)`  |
//!
//! While the command bar is open the loop calls [`to_app_event_insert`]:
//! every printable key types its character and only `Ctrl+c`, `Esc`,
//! `Enter`, `Backspace` and the horizontal arrows keep a binding.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Quit,
    /// Advance to the next card.
    Next,
    /// Go back one card; at the first card this refreshes the feed.
    Previous,
    /// Jump to the first / last loaded card without fetching.
    First,
    Last,
    /// Switch between the overview grid and the single-card view.
    ToggleMode,
    Refresh,
    /// Mute the author of the selected card for the default duration.
    MuteCurrent,
    /// Text-cursor movement inside the command bar.
    Cursor(Direction),
    Char(char),
    Backspace,
    Enter,
    Escape,
    Resize(u16, u16),
}

/// Map a raw crossterm [`Event`] in normal mode.
pub fn to_app_event(event: Event) -> Option<AppEvent> {
    match event {
        Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        Event::Key(key) => map_key(key),
        _ => None,
    }
}

/// Map a raw crossterm [`Event`] while the command bar has focus.
pub fn to_app_event_insert(event: Event) -> Option<AppEvent> {
    match event {
        Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        Event::Key(key) => map_key_insert(key),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Option<AppEvent> {
    use KeyCode::*;
    use KeyModifiers as Mod;

    match key.code {
        Char('q') if key.modifiers == Mod::NONE => Some(AppEvent::Quit),
        Char('c') if key.modifiers == Mod::CONTROL => Some(AppEvent::Quit),

        Right | Down | Char('l') | Char('j') | Char('n') if key.modifiers == Mod::NONE => {
            Some(AppEvent::Next)
        }
        Left | Up | Char('h') | Char('k') | Char('p') if key.modifiers == Mod::NONE => {
            Some(AppEvent::Previous)
        }

        Home | Char('g') if key.modifiers == Mod::NONE => Some(AppEvent::First),
        End if key.modifiers == Mod::NONE => Some(AppEvent::Last),
        Char('G') if key.modifiers == Mod::NONE || key.modifiers == Mod::SHIFT => {
            Some(AppEvent::Last)
        }

        Tab if key.modifiers == Mod::NONE => Some(AppEvent::ToggleMode),
        Char('r') if key.modifiers == Mod::NONE => Some(AppEvent::Refresh),
        Char('m') if key.modifiers == Mod::NONE => Some(AppEvent::MuteCurrent),

        Char(c) if key.modifiers == Mod::NONE || key.modifiers == Mod::SHIFT => {
            Some(AppEvent::Char(c))
        }

        Backspace if key.modifiers == Mod::NONE => Some(AppEvent::Backspace),
        Enter if key.modifiers == Mod::NONE => Some(AppEvent::Enter),
        Esc => Some(AppEvent::Escape),

        _ => None,
    }
}

fn map_key_insert(key: KeyEvent) -> Option<AppEvent> {
    use KeyCode::*;
    use KeyModifiers as Mod;

    match key.code {
        Char('c') if key.modifiers == Mod::CONTROL => Some(AppEvent::Quit),

        Left => Some(AppEvent::Cursor(Direction::Left)),
        Right => Some(AppEvent::Cursor(Direction::Right)),

        Char(c) if key.modifiers == Mod::NONE || key.modifiers == Mod::SHIFT => {
            Some(AppEvent::Char(c))
        }

        Backspace if key.modifiers == Mod::NONE => Some(AppEvent::Backspace),
        Enter if key.modifiers == Mod::NONE => Some(AppEvent::Enter),
        Esc => Some(AppEvent::Escape),

        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
