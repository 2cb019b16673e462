// tests/common/mod.rs
// Shared mocks for pipeline integration tests. Not every test binary uses
// every helper.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use news_digest_engine::classify::{Classifier, Summarizer};
use news_digest_engine::cluster::Cluster;
use news_digest_engine::ingest::types::{Article, FeedSource};
use news_digest_engine::notify::DeliverySink;

pub fn article(title: &str, link: &str) -> Article {
    Article {
        title: title.to_string(),
        link: link.to_string(),
        summary: format!("summary of {title}"),
        published: "Mon, 12 Aug 2024 09:00:00 +0530".to_string(),
    }
}

/// Feed that returns a fixed batch.
pub struct MockFeed(pub Vec<Article>);

#[async_trait]
impl FeedSource for MockFeed {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        Ok(self.0.clone())
    }
    fn name(&self) -> String {
        "MockFeed".to_string()
    }
}

/// Classifier that accepts every article, echoing its title, and counts
/// invocations.
pub struct EchoClassifier {
    pub calls: AtomicUsize,
}

impl EchoClassifier {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for EchoClassifier {
    async fn classify(&self, title: &str, _summary: &str) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(title.to_string()))
    }
    fn provider_name(&self) -> &'static str {
        "echo"
    }
}

/// Summarizer that lists representatives and remembers how many clusters it
/// was given.
pub struct ListingSummarizer {
    pub seen_clusters: Mutex<Vec<usize>>,
}

impl ListingSummarizer {
    pub fn new() -> Self {
        Self {
            seen_clusters: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Summarizer for ListingSummarizer {
    async fn digest(&self, clusters: &[Cluster]) -> Result<String> {
        self.seen_clusters.lock().unwrap().push(clusters.len());
        let lines: Vec<String> = clusters
            .iter()
            .map(|c| format!("* {}", c.representative().title))
            .collect();
        Ok(lines.join("\n\n"))
    }
    fn provider_name(&self) -> &'static str {
        "listing"
    }
}

/// Sink that records delivered messages; optionally fails the first N sends.
pub struct RecordingSink {
    pub sent: Mutex<Vec<String>>,
    pub fail_first: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_first: AtomicUsize::new(0),
        }
    }

    pub fn failing_first(n: usize) -> Self {
        let s = Self::new();
        s.fail_first.store(n, Ordering::SeqCst);
        s
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliverySink for RecordingSink {
    async fn send(&self, text: &str) -> Result<()> {
        let remaining = self.fail_first.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_first.store(remaining - 1, Ordering::SeqCst);
            return Err(anyhow!("simulated send failure"));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Convenience: Arc the common fixtures into pipeline arguments.
pub fn boxed_feed(articles: Vec<Article>) -> Vec<Box<dyn FeedSource>> {
    vec![Box::new(MockFeed(articles))]
}

pub fn distinct_articles(n: usize) -> Vec<Article> {
    // Titles built to stay far apart under sequence matching.
    let topics = [
        "monsoon floods hit coastal villages",
        "parliament debates education funding",
        "satellite launch window announced",
        "wheat procurement prices revised",
        "border trade talks resume",
        "vaccine coverage expands in districts",
        "railway corridor project cleared",
        "solar capacity tender issued",
        "judicial appointments announced",
        "census schedule published",
        "fisheries subsidy scheme launched",
        "highway toll policy updated",
    ];
    (0..n)
        .map(|i| {
            article(
                &format!("{} {}", topics[i % topics.len()], i),
                &format!("https://example.com/story/{i}"),
            )
        })
        .collect()
}
