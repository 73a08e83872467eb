//! linkwall-core — mention aggregation core.
//!
//! Everything in this crate is a pure transform over owned data; the I/O and
//! the feed-owner task live in `linkwall-feeds`.
//!
//! # Architecture
//!
//! ```text
//! pages ──► merge ──► filter ──► classify ──► cards ──┬─► layout
//!                                                     └─► navigation
//! ```
//!
//! [`settings::migrate`] turns whatever the configuration store holds into a
//! [`settings::FilterConfig`]; [`config`] layers the TOML file over the
//! embedded defaults.

pub mod cards;
pub mod classify;
pub mod config;
pub mod embed;
pub mod filter;
pub mod layout;
pub mod merge;
pub mod navigation;
pub mod settings;
pub mod types;

pub use settings::FilterConfig;
pub use types::{
    Card, MediaKind, Mention, MuteEntry, PaginationCursor, Platform, SourceKind, VisibilityMode,
};
