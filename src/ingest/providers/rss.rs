use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::ingest::types::{Article, FeedSource};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    // Some feeds carry <summary> instead of <description>.
    summary: Option<String>,
}

/// Generic RSS feed source. One instance per configured feed URL.
pub struct RssFeedSource {
    label: String,
    mode: Mode,
}

enum Mode {
    /// Embedded XML, used by tests and fixtures.
    Fixture(String),
    Http {
        url: String,
        client: reqwest::Client,
    },
}

impl RssFeedSource {
    pub fn from_url(url: impl Into<String>, client: reqwest::Client) -> Self {
        let url = url.into();
        Self {
            label: url.clone(),
            mode: Mode::Http { url, client },
        }
    }

    pub fn from_fixture_str(label: impl Into<String>, xml: &str) -> Self {
        Self {
            label: label.into(),
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    fn parse_items_from_str(s: &str) -> Result<Vec<Article>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            // Missing fields degrade to empty text; a bad entry never fails
            // the whole feed.
            out.push(Article {
                title: it.title.unwrap_or_default(),
                link: it.link.unwrap_or_default(),
                summary: it.description.or(it.summary).unwrap_or_default(),
                published: it.pub_date.unwrap_or_default(),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        counter!("ingest_entries_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl FeedSource for RssFeedSource {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_items_from_str(s),

            Mode::Http { url, client } => {
                // Errors propagate to `collect`, which logs and counts them.
                let body = client
                    .get(url)
                    .send()
                    .await
                    .context("feed http get()")?
                    .text()
                    .await
                    .context("feed http .text()")?;
                Self::parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> String {
        self.label.clone()
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>National</title>
    <item>
      <title>RBI cuts repo rate by 25 bps</title>
      <link>https://www.rbi.org.in/press/123</link>
      <description>Central bank eases policy&nbsp;rate.</description>
      <pubDate>Mon, 12 Aug 2024 09:00:00 +0530</pubDate>
    </item>
    <item>
      <title>Untitled entry keeps going</title>
    </item>
  </channel>
</rss>"#;

    #[tokio::test]
    async fn fixture_parses_and_defaults_missing_fields() {
        let src = RssFeedSource::from_fixture_str("fixture", FIXTURE);
        let items = src.fetch_latest().await.unwrap();
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].title, "RBI cuts repo rate by 25 bps");
        assert_eq!(items[0].link, "https://www.rbi.org.in/press/123");
        assert_eq!(items[0].summary, "Central bank eases policy rate.");
        assert_eq!(items[0].published, "Mon, 12 Aug 2024 09:00:00 +0530");

        // second entry has no link/summary/date
        assert_eq!(items[1].link, "");
        assert_eq!(items[1].summary, "");
        assert!(!items[1].is_identifiable());
    }

    #[tokio::test]
    async fn garbage_xml_is_an_error_not_a_panic() {
        let src = RssFeedSource::from_fixture_str("bad", "this is not xml at all");
        assert!(src.fetch_latest().await.is_err());
    }
}
