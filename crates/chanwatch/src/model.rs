//! Wire models for the upstream JSON API.
//!
//! Deserialization is deliberately lenient: unknown fields are ignored and
//! missing metadata defaults, since the upstream adds fields freely.

use serde::{Deserialize, Serialize};

/// One page of a board catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogPage {
    /// Page number as reported by the upstream.
    #[serde(default)]
    pub page: u32,
    /// Threads on this page, in catalog order.
    #[serde(default)]
    pub threads: Vec<CatalogThread>,
}

/// A thread as listed in a board catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogThread {
    /// Thread number; the identifier diffing keys on.
    pub no: u64,
    /// Unix creation time.
    pub time: Option<i64>,
    /// Subject line.
    pub sub: Option<String>,
    /// Comment body (HTML).
    pub com: Option<String>,
    /// Poster name.
    pub name: Option<String>,
    /// Reply count.
    pub replies: Option<u32>,
    /// Image count.
    pub images: Option<u32>,
    /// Unix time of the last change the upstream attributes to the thread.
    pub last_modified: Option<i64>,
}

/// Payload of a thread endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadPayload {
    /// Posts in the thread, oldest first.
    #[serde(default)]
    pub posts: Vec<Post>,
}

/// A single post within a thread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Post {
    /// Post number; the identifier diffing keys on.
    pub no: u64,
    /// Thread this post replies to; `0` marks the opening post.
    #[serde(default)]
    pub resto: u64,
    /// Unix creation time.
    pub time: Option<i64>,
    /// Poster name.
    pub name: Option<String>,
    /// Tripcode.
    pub trip: Option<String>,
    /// Subject line.
    pub sub: Option<String>,
    /// Comment body (HTML).
    pub com: Option<String>,
    /// Original filename of an attached file.
    pub filename: Option<String>,
    /// File extension of an attached file.
    pub ext: Option<String>,
}
