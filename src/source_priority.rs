//! # Source priorities
//!
//! Configurable ordered mapping from a domain substring (e.g. "rbi.org.in",
//! "timesofindia") to an integer trust priority. Lower is more trusted.
//!
//! - Loads from TOML or JSON config; falls back to a built-in `default_seed()`.
//! - Lookup scans the entries in declaration order and returns the first
//!   whose substring occurs in the link.
//! - Unmatched links get `default_priority` (10), lower-trust than every
//!   seeded entry.
//!
//! Loaded once at startup and passed by reference into dedup/clustering; no
//! mutable global state.

use serde::Deserialize;
use std::{fs, path::Path};

pub const DEFAULT_PRIORITY: i32 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct PriorityEntry {
    pub domain: String,
    pub priority: i32,
}

/// Ordered priority table, loaded from config or defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct PriorityTable {
    /// Priority for links that match no configured domain.
    #[serde(default = "default_default_priority")]
    pub default_priority: i32,
    /// Ordered entries; earlier entries win when several substrings match.
    #[serde(default)]
    pub sources: Vec<PriorityEntry>,
}

fn default_default_priority() -> i32 {
    DEFAULT_PRIORITY
}

impl PriorityTable {
    /// Load from a TOML or JSON file (extension-hinted, both attempted).
    /// Falls back to `default_seed()` on any read/parse error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let Ok(s) = fs::read_to_string(path) else {
            return Self::default_seed();
        };
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let parsed = if ext == "json" {
            serde_json::from_str(&s).ok()
        } else {
            toml::from_str(&s).ok().or_else(|| serde_json::from_str(&s).ok())
        };
        parsed.unwrap_or_else(Self::default_seed)
    }

    /// Priority score for a link. First configured substring found in the
    /// link wins; no match yields `default_priority`. Infallible.
    pub fn priority_for(&self, link: &str) -> i32 {
        for entry in &self.sources {
            if link.contains(&entry.domain) {
                return entry.priority;
            }
        }
        self.default_priority
    }

    /// Built-in seed: official bodies first, then trusted agencies.
    /// Used as fallback if no config is found.
    pub fn default_seed() -> Self {
        let sources = [
            // Official government / international bodies (highest trust)
            ("pib.gov.in", 1),
            ("ddnews.gov.in", 1),
            ("newsonair.gov.in", 1),
            ("imf.org", 1),
            ("worldbank.org", 1),
            ("who.int", 1),
            ("rbi.org.in", 1),
            ("sebi.gov.in", 1),
            ("isro.gov.in", 1),
            ("niti.gov.in", 1),
            ("mea.gov.in", 1),
            // Trusted news agencies
            ("thehindu.com", 3),
            ("indianexpress.com", 3),
            ("livemint.com", 4),
            ("economictimes", 4),
            ("timesofindia", 5),
            ("google", 6),
        ]
        .into_iter()
        .map(|(domain, priority)| PriorityEntry {
            domain: domain.to_string(),
            priority,
        })
        .collect();

        Self {
            default_priority: DEFAULT_PRIORITY,
            sources,
        }
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self::default_seed()
    }
}
