// src/ingest/types.rs
use anyhow::Result;

/// One normalized feed entry. Immutable once constructed; lives only for the
/// duration of a single pipeline run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    /// Stable identity key. May be empty for malformed entries; such articles
    /// are excluded from persistence-keyed lookups.
    pub link: String,
    pub summary: String,
    /// Opaque passthrough of the feed's published field.
    pub published: String,
}

impl Article {
    /// Articles without a link cannot be tracked in the seen-store.
    pub fn is_identifiable(&self) -> bool {
        !self.link.is_empty()
    }
}

/// A configured feed: either a literal feed URL, or a query expanded into a
/// search-feed URL at collection time.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub enum FeedSpec {
    Url(String),
    Query(String),
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Article>>;
    fn name(&self) -> String;
}
