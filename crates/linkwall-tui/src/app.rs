//! Top-level application state and the main event loop.
//!
//! [`App::run`] sets up the terminal, drives the crossterm event loop, and
//! tears everything down cleanly on exit or panic. Feed state is never
//! mutated here: key presses become [`FeedHandle`] commands and the owner
//! task's latest [`FeedView`] is picked up before every frame.

use crate::{
    commands::{default_mute, execute_command, Command},
    event::{self, AppEvent},
    widgets::{
        card_grid::CardGrid, card_view::CardView, command_bar::{CommandBar, CommandBarState},
        help::HelpPopup, status_bar::StatusBar,
    },
};
use crossterm::{
    event::{self as ct_event, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use linkwall_core::{config::Config, layout::columns_for_width};
use linkwall_feeds::{FeedHandle, FeedView};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDir, Layout, Rect},
    Frame, Terminal,
};
use std::{io, time::Duration};
use tokio::sync::watch;

/// How the card list is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Overview,
    Highlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Normal,
    /// Vim-style `:` command line is active.
    Command,
}

pub struct AppState {
    pub mode: DisplayMode,
    pub focus: Focus,
    pub view: FeedView,
    pub feed: FeedHandle,
    pub config: Config,
    pub show_help: bool,
    pub show_timestamps: bool,
    pub command_bar: CommandBarState,
    pub quit: bool,
}

pub struct App {
    state: AppState,
    views: watch::Receiver<FeedView>,
}

impl App {
    pub fn new(config: Config, feed: FeedHandle, views: watch::Receiver<FeedView>) -> Self {
        let view = views.borrow().clone();
        let state = AppState {
            mode: DisplayMode::Overview,
            focus: Focus::Normal,
            view,
            feed,
            show_help: false,
            show_timestamps: config.ui.show_timestamps,
            config,
            command_bar: CommandBarState::default(),
            quit: false,
        };
        App { state, views }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Set up the terminal, run the event loop, and restore the terminal on exit.
    pub fn run(mut self) -> anyhow::Result<()> {
        install_panic_hook();

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        loop {
            self.sync_view();
            {
                let s = &self.state;
                terminal.draw(|frame| draw(frame, s))?;
            }

            if self.state.quit {
                break;
            }

            if ct_event::poll(Duration::from_millis(16))? {
                match ct_event::read()? {
                    Event::Key(key) if key.kind == crossterm::event::KeyEventKind::Press => {
                        let raw = Event::Key(key);
                        let app_event = if self.state.focus == Focus::Command {
                            event::to_app_event_insert(raw)
                        } else {
                            event::to_app_event(raw)
                        };
                        if let Some(ev) = app_event {
                            tracing::debug!(focus = ?self.state.focus, event = ?ev, "key event");
                            self.handle(ev);
                        }
                    }
                    other => {
                        if let Some(ev) = event::to_app_event(other) {
                            self.handle(ev);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Pick up the owner's latest snapshot, if it published one.
    pub fn sync_view(&mut self) {
        if self.views.has_changed().unwrap_or(false) {
            self.state.view = self.views.borrow_and_update().clone();
        }
    }

    pub fn handle(&mut self, event: AppEvent) {
        let s = &mut self.state;

        if s.show_help {
            if matches!(event, AppEvent::Char('?') | AppEvent::Escape | AppEvent::Quit) {
                tracing::debug!("help popup closed");
                s.show_help = false;
            }
            return;
        }

        if s.focus == Focus::Command {
            match event {
                AppEvent::Quit => s.quit = true,
                AppEvent::Escape => {
                    tracing::debug!("command bar cancelled");
                    s.command_bar.clear();
                    s.focus = Focus::Normal;
                }
                AppEvent::Enter => {
                    let input = s.command_bar.input.clone();
                    match Command::parse(&input) {
                        Ok(cmd) => {
                            tracing::debug!(command = ?cmd, "executing command");
                            s.command_bar.clear();
                            s.focus = Focus::Normal;
                            execute_command(s, cmd);
                        }
                        Err(msg) if msg.is_empty() => {
                            s.command_bar.clear();
                            s.focus = Focus::Normal;
                        }
                        Err(msg) => s.command_bar.error = Some(msg),
                    }
                }
                other => s.command_bar.handle(&other),
            }
            return;
        }

        match event {
            AppEvent::Quit => {
                tracing::debug!("quit");
                s.quit = true;
            }
            AppEvent::Char('?') => s.show_help = true,
            AppEvent::Char(':') => {
                s.command_bar.clear();
                s.focus = Focus::Command;
            }
            AppEvent::Next => {
                s.feed.next();
            }
            AppEvent::Previous => {
                s.feed.previous();
            }
            AppEvent::Refresh => {
                s.feed.refresh();
            }
            AppEvent::First => {
                s.feed.select(0);
            }
            AppEvent::Last => {
                if let Some(last) = s.view.cards.len().checked_sub(1) {
                    s.feed.select(last);
                }
            }
            AppEvent::ToggleMode | AppEvent::Enter => {
                s.mode = match s.mode {
                    DisplayMode::Overview => DisplayMode::Highlight,
                    DisplayMode::Highlight => DisplayMode::Overview,
                };
                tracing::debug!(mode = ?s.mode, "display mode");
            }
            AppEvent::Escape => s.mode = DisplayMode::Overview,
            AppEvent::MuteCurrent => {
                let nick = s
                    .view
                    .current()
                    .and_then(|card| s.view.mention_of(card))
                    .map(|m| m.nick.clone());
                if let Some(nick) = nick {
                    s.feed.mute(nick, default_mute());
                }
            }
            AppEvent::Resize(_, _)
            | AppEvent::Char(_)
            | AppEvent::Backspace
            | AppEvent::Cursor(_) => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn draw(frame: &mut Frame, state: &AppState) {
    let area = frame.area();

    // Vertical: 1-line status bar | body
    let vert = Layout::default()
        .direction(LayoutDir::Vertical)
        .constraints([Constraint::Length(1), Constraint::Fill(1)])
        .split(area);

    let view = &state.view;
    let ts_format = state
        .show_timestamps
        .then_some(state.config.ui.timestamp_format.as_str());

    frame.render_widget(StatusBar::new(view), vert[0]);

    match state.mode {
        DisplayMode::Overview => {
            let layout = &state.config.layout;
            let columns = columns_for_width(
                vert[1].width as u32 * layout.cell_width_px,
                &layout.breakpoints,
            );
            frame.render_widget(
                CardGrid::new(&view.cards, &view.mentions, view.cursor, columns, ts_format),
                vert[1],
            );
        }
        DisplayMode::Highlight => {
            let card = view.current();
            let mention = card.and_then(|c| view.mention_of(c));
            frame.render_widget(
                CardView::new(card, mention, (view.cursor, view.cards.len()), ts_format),
                vert[1],
            );
        }
    }

    if state.show_help {
        frame.render_widget(HelpPopup, area);
    }

    // Command bar overlays the bottom row of the screen
    if state.focus == Focus::Command {
        let cmd_area = Rect { y: area.bottom().saturating_sub(1), height: 1, ..area };
        frame.render_widget(CommandBar::new(&state.command_bar), cmd_area);
        let col = state.command_bar.cursor_col(cmd_area);
        frame.set_cursor_position((col, cmd_area.y));
    }
}

// ---------------------------------------------------------------------------
// Terminal helpers
// ---------------------------------------------------------------------------

fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original(info);
    }));
}
