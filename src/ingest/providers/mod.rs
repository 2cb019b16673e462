pub mod query_feed;
pub mod rss;
