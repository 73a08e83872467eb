//! linkwall-feeds — mention sources and the feed owner task.
//!
//! ```text
//! PrimaryQuery ─┐
//!               ├─► Orchestrator ─► Feed ─► owner task ─► watch<FeedView>
//! FallbackSearch┘                    ▲
//! StreamTransport ───────────────────┘
//! ```
//!
//! Start with [`owner::spawn`]; it returns a [`FeedHandle`] for commands and
//! a `watch` receiver for [`FeedView`] snapshots.

pub mod error;
pub mod feed;
pub mod guard;
pub mod http;
pub mod orchestrator;
pub mod owner;
pub mod source;
pub mod stream;

pub use error::{FeedError, SourceError};
pub use feed::{Feed, FeedState};
pub use orchestrator::{FetchMode, Orchestrator, Page};
pub use owner::{spawn, FeedCommand, FeedHandle, FeedView, OwnerOptions};
pub use source::{ChatMessage, FallbackPage, FallbackSearch, PrimaryQuery, RateLimit, StreamEvent, StreamTransport};
