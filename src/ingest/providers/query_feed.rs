//! Query-template feeds: a configured query string is percent-encoded and
//! substituted into a search-feed URL template, then fetched like any other
//! RSS feed.

use reqwest::Client;

use super::rss::RssFeedSource;

/// Google News style search feed. `{query}` is replaced with the encoded query.
pub const DEFAULT_SEARCH_FEED_BASE: &str =
    "https://news.google.com/rss/search?q={query}&hl=en-IN&gl=IN&ceid=IN:en";

/// Expand a query into a concrete search-feed URL.
pub fn expand_query_url(base: &str, query: &str) -> String {
    base.replace("{query}", &urlencoding::encode(query))
}

/// Build an RSS source for a search query.
pub fn query_feed_source(base: &str, query: &str, client: Client) -> RssFeedSource {
    RssFeedSource::from_url(expand_query_url(base, query), client)
}
