//! Incremental diff engines over catalogs and threads.
//!
//! A subscriber owns one [`ConditionalClient`] and the set of identifiers
//! seen in the most recent snapshot. Each `next()` fetches a snapshot and
//! reports the items whose identifiers were absent from that set, in
//! snapshot order.
//!
//! The seen set is replaced wholesale on every successful snapshot, never
//! merged, so it mirrors exactly the latest snapshot. An item that drops out
//! of one snapshot and returns in a later one is therefore reported as new
//! again — for a board that means a thread falling off the catalog and
//! climbing back re-notifies. This mirrors the observed upstream behavior
//! and is intentional.

use std::collections::HashSet;

use crate::client::ConditionalClient;
use crate::config::WatchConfig;
use crate::error::Result;
use crate::model::{CatalogPage, CatalogThread, Post, ThreadPayload};
use crate::target::Target;

/// New items reported by one successful poll.
#[derive(Debug, Clone)]
pub enum Update {
    /// New threads on a board catalog, in catalog order.
    Threads(Vec<CatalogThread>),
    /// New posts in a thread, oldest first.
    Posts(Vec<Post>),
}

impl Update {
    /// Number of new items in this update.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Threads(threads) => threads.len(),
            Self::Posts(posts) => posts.len(),
        }
    }

    /// True when the snapshot was fetched but contained nothing novel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Diff engine for either watch shape.
#[derive(Debug)]
pub enum Subscriber {
    /// Watches a board catalog.
    Board(BoardSubscriber),
    /// Watches a single thread.
    Thread(ThreadSubscriber),
}

impl Subscriber {
    /// Builds the subscriber matching `target`: board-only targets get the
    /// board variant, board+thread targets the thread variant.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be constructed.
    pub fn for_target(config: &WatchConfig, target: Target) -> Result<Self> {
        let client = ConditionalClient::new(config)?;
        Ok(if target.thread_no().is_some() {
            Self::Thread(ThreadSubscriber::new(client, target))
        } else {
            Self::Board(BoardSubscriber::new(client, target))
        })
    }

    /// Polls once. `Ok(None)` means "not modified this round"; it is not an
    /// error and must not be confused with `Ok(Some(update))` carrying an
    /// empty delta, which means a fresh snapshot held nothing novel.
    ///
    /// # Errors
    ///
    /// Propagates [`ConditionalClient::fetch`] failures unchanged; the seen
    /// set is untouched on failure.
    pub async fn next(&mut self) -> Result<Option<Update>> {
        match self {
            Self::Board(board) => board.next().await,
            Self::Thread(thread) => thread.next().await,
        }
    }
}

/// Watches a board catalog for threads not previously seen.
#[derive(Debug)]
pub struct BoardSubscriber {
    client: ConditionalClient,
    target: Target,
    seen: HashSet<u64>,
}

impl BoardSubscriber {
    fn new(client: ConditionalClient, target: Target) -> Self {
        Self {
            client,
            target,
            seen: HashSet::new(),
        }
    }

    /// Fetches the catalog and reports threads new since the last snapshot.
    ///
    /// # Errors
    ///
    /// Propagates fetch failures; the seen set is untouched on failure.
    pub async fn next(&mut self) -> Result<Option<Update>> {
        let Some(pages) = self.client.fetch::<Vec<CatalogPage>>(&self.target).await? else {
            return Ok(None);
        };

        // One ordered sequence across pages: page order preserved,
        // within-page order preserved.
        let threads: Vec<CatalogThread> =
            pages.into_iter().flat_map(|page| page.threads).collect();
        let fresh = replace_and_diff(&mut self.seen, threads, |thread| thread.no);
        Ok(Some(Update::Threads(fresh)))
    }
}

/// Watches a single thread for posts not previously seen.
#[derive(Debug)]
pub struct ThreadSubscriber {
    client: ConditionalClient,
    target: Target,
    seen: HashSet<u64>,
}

impl ThreadSubscriber {
    fn new(client: ConditionalClient, target: Target) -> Self {
        Self {
            client,
            target,
            seen: HashSet::new(),
        }
    }

    /// Fetches the thread and reports posts new since the last snapshot.
    ///
    /// # Errors
    ///
    /// Propagates fetch failures; the seen set is untouched on failure.
    pub async fn next(&mut self) -> Result<Option<Update>> {
        let Some(payload) = self.client.fetch::<ThreadPayload>(&self.target).await? else {
            return Ok(None);
        };

        let fresh = replace_and_diff(&mut self.seen, payload.posts, |post| post.no);
        Ok(Some(Update::Posts(fresh)))
    }
}

/// Replaces `seen` with this snapshot's identifiers and returns the items
/// whose identifiers were absent from the previous set, preserving snapshot
/// order.
fn replace_and_diff<T>(
    seen: &mut HashSet<u64>,
    items: Vec<T>,
    id: impl Fn(&T) -> u64,
) -> Vec<T> {
    let mut next_seen = HashSet::with_capacity(items.len());
    let mut fresh = Vec::new();
    for item in items {
        let key = id(&item);
        let novel = !seen.contains(&key);
        next_seen.insert(key);
        if novel {
            fresh.push(item);
        }
    }
    *seen = next_seen;
    fresh
}
