//! # chanwatch
//!
//! Incremental watcher for imageboard-style JSON APIs.
//!
//! A [`Watcher`] polls a board catalog or a single thread at a fixed cadence,
//! sends conditional requests (`If-Modified-Since`) so unchanged rounds cost
//! almost nothing on the wire, and reports only the threads or posts that
//! were not present in the previous snapshot.
//!
//! ## Guarantees
//!
//! - **Non-overlapping polls**: the next fetch is not scheduled until the
//!   previous fetch and its handler invocation have fully settled.
//! - **New-only deltas**: each delivery contains exactly the items whose
//!   identifiers were absent from the previous snapshot, in snapshot order.
//! - **Cooperative cancellation**: after [`Subscription::cancel`] returns, no
//!   further handler invocation is observable; a request already in flight
//!   completes and its result is discarded.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chanwatch::{ListenerContext, WatchConfig, WatchEvent, Watcher};
//!
//! #[tokio::main]
//! async fn main() -> chanwatch::Result<()> {
//!     let watcher = Watcher::new(WatchConfig::default())?;
//!
//!     let subscription = watcher.board("g").listen(
//!         |context: &ListenerContext, event: WatchEvent| match event {
//!             WatchEvent::Update(update) => {
//!                 println!("{} new on /{}/", update.len(), context.board());
//!             }
//!             WatchEvent::Error(error) => eprintln!("poll failed: {error}"),
//!         },
//!     )?;
//!
//!     // ... some time later
//!     subscription.cancel();
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod poller;
pub mod subscriber;
pub mod target;
pub mod watch;

pub use config::WatchConfig;
pub use error::{Error, Result};
pub use subscriber::Update;
pub use watch::{Handler, ListenerContext, Subscription, WatchBuilder, WatchEvent, Watcher};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::WatchConfig;
    pub use crate::error::{Error, Result};
    pub use crate::model::{CatalogPage, CatalogThread, Post, ThreadPayload};
    pub use crate::subscriber::Update;
    pub use crate::watch::{Handler, ListenerContext, Subscription, WatchEvent, Watcher};
}
