// src/store.rs
//! Persistence of processed articles.
//!
//! The store is append-only: one record per delivered headline, keyed by
//! link. The pipeline reads the full link set before a run (seen check) and
//! the tail of recent headlines (semantic re-check), then appends as it
//! delivers.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// One processed article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeenRecord {
    /// When the pipeline processed it (RFC 3339, UTC).
    pub processed_at: String,
    /// Feed-supplied publish field, passed through untouched.
    pub published: String,
    pub link: String,
    pub headline: String,
}

pub trait SeenStore: Send + Sync {
    /// Every link ever recorded. Used to skip already-processed articles.
    fn all_links(&self) -> Result<HashSet<String>>;
    /// Last `limit` recorded headlines, oldest first.
    fn recent_headlines(&self, limit: usize) -> Result<Vec<String>>;
    /// Append one record. A failed append must not have partially recorded
    /// the article.
    fn append(&self, link: &str, headline: &str, published: &str) -> Result<()>;
}

fn record(link: &str, headline: &str, published: &str) -> SeenRecord {
    SeenRecord {
        processed_at: Utc::now().to_rfc3339(),
        published: published.to_string(),
        link: link.to_string(),
        headline: headline.to_string(),
    }
}

// ------------------------------------------------------------
// In-memory store
// ------------------------------------------------------------

/// Mutex-guarded vector; the default for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Vec<SeenRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<SeenRecord> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl SeenStore for MemoryStore {
    fn all_links(&self) -> Result<HashSet<String>> {
        let v = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(v.iter().map(|r| r.link.clone()).collect())
    }

    fn recent_headlines(&self, limit: usize) -> Result<Vec<String>> {
        let v = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let start = v.len().saturating_sub(limit);
        Ok(v[start..].iter().map(|r| r.headline.clone()).collect())
    }

    fn append(&self, link: &str, headline: &str, published: &str) -> Result<()> {
        let mut v = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        v.push(record(link, headline, published));
        Ok(())
    }
}

// ------------------------------------------------------------
// JSONL file store
// ------------------------------------------------------------

/// One JSON record per line, appended on delivery. Survives restarts; reads
/// re-parse the file, which is fine at the few-thousand-record scale this
/// runs at.
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<Vec<SeenRecord>> {
        let s = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("reading seen store {}", self.path.display()))
            }
        };
        let mut out = Vec::new();
        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<SeenRecord>(line) {
                Ok(r) => out.push(r),
                Err(e) => {
                    // A corrupt line loses one record, not the store.
                    tracing::warn!(target: "store", error = ?e, "skipping malformed record");
                }
            }
        }
        Ok(out)
    }
}

impl SeenStore for JsonlStore {
    fn all_links(&self) -> Result<HashSet<String>> {
        Ok(self.read_all()?.into_iter().map(|r| r.link).collect())
    }

    fn recent_headlines(&self, limit: usize) -> Result<Vec<String>> {
        let all = self.read_all()?;
        let start = all.len().saturating_sub(limit);
        Ok(all[start..].iter().map(|r| r.headline.clone()).collect())
    }

    fn append(&self, link: &str, headline: &str, published: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let rec = record(link, headline, published);
        let mut line = serde_json::to_string(&rec).context("serializing seen record")?;
        line.push('\n');
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening seen store {}", self.path.display()))?;
        f.write_all(line.as_bytes())
            .with_context(|| format!("appending to {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let s = MemoryStore::new();
        s.append("https://a/1", "first headline", "Mon, 12 Aug").unwrap();
        s.append("https://a/2", "second headline", "").unwrap();

        let links = s.all_links().unwrap();
        assert!(links.contains("https://a/1"));
        assert!(links.contains("https://a/2"));

        assert_eq!(
            s.recent_headlines(10).unwrap(),
            vec!["first headline", "second headline"]
        );
        // Window keeps the newest, oldest first.
        assert_eq!(s.recent_headlines(1).unwrap(), vec!["second headline"]);
    }

    #[test]
    fn jsonl_store_persists_and_skips_corrupt_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.jsonl");
        let s = JsonlStore::new(&path);

        assert!(s.all_links().unwrap().is_empty());

        s.append("https://a/1", "headline one", "pub").unwrap();
        s.append("https://a/2", "headline two", "").unwrap();

        // Inject a corrupt line between appends from a previous process.
        {
            let mut f = OpenOptions::new().append(true).open(&path).unwrap();
            f.write_all(b"{not json}\n").unwrap();
        }
        s.append("https://a/3", "headline three", "").unwrap();

        let reopened = JsonlStore::new(&path);
        let links = reopened.all_links().unwrap();
        assert_eq!(links.len(), 3);
        assert_eq!(
            reopened.recent_headlines(2).unwrap(),
            vec!["headline two", "headline three"]
        );
    }
}
