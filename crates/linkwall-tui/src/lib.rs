//! linkwall TUI — ratatui application shell.
//!
//! The shell is a pure consumer of the feed owner: it renders the latest
//! [`linkwall_feeds::FeedView`] and turns keys into feed commands.

pub mod app;
pub mod commands;
pub mod event;
pub mod widgets;

pub use app::App;

use linkwall_core::config::Config;
use linkwall_feeds::{FeedHandle, FeedView};
use tokio::sync::watch;

/// Run the TUI on the calling thread until the user quits.
///
/// Must be called from outside the async runtime that drives the feed
/// owner; the event loop blocks.
pub fn run(config: Config, feed: FeedHandle, views: watch::Receiver<FeedView>) -> anyhow::Result<()> {
    App::new(config, feed, views).run()
}
