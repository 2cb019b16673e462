// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::FeedSpec;

const ENV_PATH: &str = "NEWS_FEEDS_PATH";

/// Load the feed roster from an explicit path. Supports TOML or JSON formats.
///
/// Order is preserved: collection iterates feeds in declaration order, which
/// keeps downstream behavior deterministic.
pub fn load_feeds_from(path: &Path) -> Result<Vec<FeedSpec>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feed roster from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_feeds(&content, ext.as_str())
}

/// Load the feed roster using env var + fallbacks:
/// 1) $NEWS_FEEDS_PATH
/// 2) config/feeds.toml
/// 3) config/feeds.json
/// 4) built-in seed roster
pub fn load_feeds_default() -> Result<Vec<FeedSpec>> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_feeds_from(&pb);
        } else {
            return Err(anyhow!("NEWS_FEEDS_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/feeds.toml");
    if toml_p.exists() {
        return load_feeds_from(&toml_p);
    }
    let json_p = PathBuf::from("config/feeds.json");
    if json_p.exists() {
        return load_feeds_from(&json_p);
    }
    Ok(seed_roster())
}

fn parse_feeds(s: &str, hint_ext: &str) -> Result<Vec<FeedSpec>> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("feeds") && !s.trim_start().starts_with('{');
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported feed roster format"))
}

#[derive(serde::Deserialize)]
struct RosterFile {
    #[serde(default)]
    feeds: Vec<String>,
    #[serde(default)]
    queries: Vec<String>,
}

fn parse_toml(s: &str) -> Result<Vec<FeedSpec>> {
    let v: RosterFile = toml::from_str(s)?;
    Ok(to_specs(v))
}

fn parse_json(s: &str) -> Result<Vec<FeedSpec>> {
    let v: RosterFile = serde_json::from_str(s)?;
    Ok(to_specs(v))
}

fn to_specs(f: RosterFile) -> Vec<FeedSpec> {
    let mut out = Vec::with_capacity(f.feeds.len() + f.queries.len());
    for u in f.feeds {
        let t = u.trim();
        if !t.is_empty() {
            out.push(FeedSpec::Url(t.to_string()));
        }
    }
    for q in f.queries {
        let t = q.trim();
        if !t.is_empty() {
            out.push(FeedSpec::Query(t.to_string()));
        }
    }
    out
}

/// Built-in roster used when no feed file is present: national dailies plus
/// search queries scoped to official bodies and recurring civic topics.
pub fn seed_roster() -> Vec<FeedSpec> {
    let feeds = [
        "https://www.thehindu.com/news/national/feeder/default.rss",
        "https://indianexpress.com/section/india/feed/",
        "https://www.livemint.com/rss/news",
        "https://economictimes.indiatimes.com/news/economy/rssfeeds/12416805.cms",
        "https://ddnews.gov.in/rss-feeds/national",
        "https://pib.gov.in/newsite/rss_english.aspx",
        "https://timesofindia.indiatimes.com/rssfeedstopstories.cms",
    ];
    let queries = [
        "site:imf.org",
        "site:worldbank.org",
        "site:who.int",
        "site:mea.gov.in",
        "site:mof.gov.in",
        "site:mha.gov.in",
        "site:moef.gov.in",
        "site:isro.gov.in",
        "site:rbi.org.in",
        "site:sebi.gov.in",
        "site:niti.gov.in",
        "Supreme Court of India verdict",
        "Govt of India Scheme",
        "Constitutional Amendment",
    ];
    feeds
        .iter()
        .map(|u| FeedSpec::Url((*u).to_string()))
        .chain(queries.iter().map(|q| FeedSpec::Query((*q).to_string())))
        .collect()
}
