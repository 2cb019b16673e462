// src/dedup.rs
//! Near-duplicate removal over a raw collection batch.
//!
//! Articles are ordered most-trusted-first before scanning, so when two
//! outlets carry the same story the copy from the more trusted source is the
//! one that survives.

use metrics::counter;

use crate::ingest::types::Article;
use crate::similarity::Matcher;
use crate::source_priority::PriorityTable;

/// Upper bound on how many articles a single dedup pass will scan. The scan
/// is quadratic in batch size, so the cap keeps a misbehaving feed from
/// blowing up run time.
pub const DEFAULT_SCAN_CAP: usize = 150;

#[derive(Debug)]
pub struct DedupOutcome {
    /// Survivors, ordered most-trusted-first.
    pub kept: Vec<Article>,
    /// Near-duplicates dropped by the title scan.
    pub removed: usize,
    /// Articles cut by the scan cap before the scan ran.
    pub truncated: usize,
}

/// Drop near-duplicate titles from a batch.
///
/// The batch is stably sorted by source priority (ascending, lower = more
/// trusted), truncated to `scan_cap`, then each article is compared against
/// every already-kept title. Ties in priority keep collection order, so the
/// winner of a duplicate pair is deterministic.
pub fn deduplicate(
    articles: Vec<Article>,
    priorities: &PriorityTable,
    matcher: &Matcher,
    scan_cap: usize,
) -> DedupOutcome {
    let total = articles.len();

    let mut sorted = articles;
    sorted.sort_by_key(|a| priorities.priority_for(&a.link));

    let truncated = total.saturating_sub(scan_cap);
    if truncated > 0 {
        tracing::warn!(
            target: "dedup",
            total,
            scan_cap,
            dropped = truncated,
            "batch over scan cap, truncating"
        );
        counter!("dedup_truncated_total").increment(truncated as u64);
        sorted.truncate(scan_cap);
    }

    let mut kept: Vec<Article> = Vec::with_capacity(sorted.len());
    let mut removed = 0usize;
    for article in sorted {
        let dup = kept.iter().any(|k| matcher.is_similar(&k.title, &article.title));
        if dup {
            removed += 1;
        } else {
            kept.push(article);
        }
    }

    if removed > 0 {
        counter!("dedup_removed_total").increment(removed as u64);
    }
    tracing::info!(
        target: "dedup",
        total,
        kept = kept.len(),
        removed,
        truncated,
        "dedup pass complete"
    );

    DedupOutcome {
        kept,
        removed,
        truncated,
    }
}
