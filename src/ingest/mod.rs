// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod types;

use crate::ingest::types::{Article, FeedSource};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_entries_total", "Entries parsed from feeds.");
        describe_counter!(
            "ingest_source_errors_total",
            "Feed fetch/parse errors (source skipped)."
        );
        describe_counter!(
            "dedup_removed_total",
            "Articles removed as near-duplicate titles."
        );
        describe_counter!(
            "dedup_truncated_total",
            "Dedup inputs truncated to the scan cap."
        );
        describe_counter!("clusters_formed_total", "Story clusters formed.");
        describe_counter!("pipeline_runs_total", "Pipeline runs started.");
        describe_counter!("pipeline_emitted_total", "Headlines emitted for delivery.");
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!(
            "pipeline_last_run_ts",
            "Unix ts when a pipeline run last finished."
        );
    });
}

/// Strip HTML and collapse whitespace in summary text before it is handed to
/// the classifier. Titles are passed through untouched so similarity behavior
/// stays keyed to what the feed published.
pub fn normalize_summary(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Fetch all configured sources in order and concatenate their entries.
///
/// Per-source failures are logged and skipped; one bad feed never aborts the
/// batch. No filtering or dedup happens here. The result order is the
/// source-iteration order, so downstream behavior does not depend on fetch
/// timing.
pub async fn collect(sources: &[Box<dyn FeedSource>]) -> Vec<Article> {
    ensure_metrics_described();

    let mut articles = Vec::new();
    for source in sources {
        match source.fetch_latest().await {
            Ok(mut batch) => {
                for a in &mut batch {
                    a.summary = normalize_summary(&a.summary);
                }
                articles.append(&mut batch);
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, source = %source.name(), "source error");
                counter!("ingest_source_errors_total").increment(1);
            }
        }
    }

    tracing::info!(target: "ingest", fetched = articles.len(), "collected raw articles");
    articles
}
