//! Ratatui widgets for the linkwall TUI.

pub mod card_grid;
pub mod card_view;
pub mod command_bar;
pub mod help;
pub mod status_bar;
