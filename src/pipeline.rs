// src/pipeline.rs
//! Run orchestration: ties collection, dedup/clustering, the external
//! classifier/summarizer, the seen-store and the delivery sink together.
//!
//! Runs are serialized through a run-level lock; the store is read once at
//! run start into in-memory working sets and written through one item at a
//! time, so a crash mid-run leaves it consistent with what was actually
//! delivered.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use metrics::{counter, gauge};
use tokio::sync::Mutex;

use crate::classify::{DynClassifier, DynSummarizer};
use crate::cluster::{cluster, Cluster};
use crate::config::AppConfig;
use crate::dedup::deduplicate;
use crate::ingest::types::FeedSource;
use crate::notify::DeliverySink;
use crate::similarity::Matcher;
use crate::source_priority::PriorityTable;
use crate::store::SeenStore;

/// Result of an incremental run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum RunOutcome {
    /// No articles came back from any source.
    Empty,
    Completed {
        emitted: usize,
        /// True when the per-run emission cap stopped the loop; the caller
        /// should tell the end user to re-invoke for more.
        cap_hit: bool,
    },
}

/// Result of a digest run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum DigestOutcome {
    /// No articles came back from any source.
    Empty,
    /// Every cluster was filtered out as already seen.
    AllSeen,
    Completed {
        text: String,
        clusters: usize,
        /// Articles newly recorded in the store by this digest.
        recorded: usize,
    },
}

pub struct Pipeline {
    sources: Vec<Box<dyn FeedSource>>,
    priorities: PriorityTable,
    matcher: Matcher,
    classifier: DynClassifier,
    summarizer: DynSummarizer,
    store: Arc<dyn SeenStore>,
    sink: Arc<dyn DeliverySink>,
    cfg: AppConfig,
    run_lock: Mutex<()>,
}

impl Pipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sources: Vec<Box<dyn FeedSource>>,
        priorities: PriorityTable,
        classifier: DynClassifier,
        summarizer: DynSummarizer,
        store: Arc<dyn SeenStore>,
        sink: Arc<dyn DeliverySink>,
        cfg: AppConfig,
    ) -> Self {
        let matcher = Matcher::new(cfg.similarity_threshold);
        Self {
            sources,
            priorities,
            matcher,
            classifier,
            summarizer,
            store,
            sink,
            cfg,
            run_lock: Mutex::new(()),
        }
    }

    /// Fetch, dedup, classify and deliver new headlines one by one.
    ///
    /// Each accepted article is delivered first and recorded second; a
    /// failed send leaves it unrecorded so the next run retries it. Stops
    /// after `emission_cap` deliveries.
    pub async fn run_incremental(&self) -> Result<RunOutcome> {
        let _guard = self.run_lock.lock().await;
        counter!("pipeline_runs_total", "kind" => "incremental").increment(1);

        let raw = crate::ingest::collect(&self.sources).await;
        if raw.is_empty() {
            tracing::info!(target: "pipeline", "incremental run: nothing fetched");
            return Ok(RunOutcome::Empty);
        }

        let deduped = deduplicate(raw, &self.priorities, &self.matcher, self.cfg.dedup_scan_cap);

        // Working sets: read once, mutated locally as items are accepted so
        // later articles in the same run see them.
        let mut known = self.store.all_links()?;
        let mut recent = self.store.recent_headlines(self.cfg.recent_window)?;

        let mut emitted = 0usize;
        let mut cap_hit = false;

        for article in deduped.kept {
            if !article.is_identifiable() {
                tracing::debug!(target: "pipeline", title = %article.title, "skipping entry without link");
                continue;
            }
            if known.contains(&article.link) {
                continue;
            }

            let headline = match self
                .classifier
                .classify(&article.title, &article.summary)
                .await
            {
                Ok(Some(h)) => h,
                Ok(None) => continue,
                Err(e) => {
                    // Failed classification reads as "not relevant".
                    tracing::warn!(target: "pipeline", error = ?e, link = %article.link, "classification failed, skipping");
                    continue;
                }
            };

            if recent.iter().any(|old| self.matcher.is_similar(&headline, old)) {
                tracing::info!(target: "pipeline", headline = %headline, "skipping semantic duplicate");
                continue;
            }

            let message = format!("📰 {headline}\n🔗 {}", article.link);
            if let Err(e) = self.sink.send(&message).await {
                // Not recorded, so the next run retries this article.
                tracing::error!(target: "pipeline", error = ?e, link = %article.link, "delivery failed");
                continue;
            }

            if let Err(e) = self
                .store
                .append(&article.link, &headline, &article.published)
            {
                // Delivered but unrecorded; the next run may resend it. A
                // retry here could double-record, so one attempt only.
                tracing::warn!(target: "pipeline", error = ?e, link = %article.link, "store append failed");
            }
            known.insert(article.link.clone());
            recent.push(headline);
            emitted += 1;
            counter!("pipeline_emitted_total").increment(1);

            if emitted >= self.cfg.emission_cap {
                cap_hit = true;
                tracing::info!(target: "pipeline", cap = self.cfg.emission_cap, "emission cap hit");
                break;
            }
        }

        gauge!("pipeline_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
        tracing::info!(target: "pipeline", emitted, cap_hit, "incremental run complete");
        Ok(RunOutcome::Completed { emitted, cap_hit })
    }

    /// Fetch, cluster, summarize and deliver one digest message.
    ///
    /// Clusters whose top members are already known are dropped before
    /// summarization. All articles of surviving clusters are recorded (tagged
    /// as digest-sourced) so later incremental runs treat them as seen.
    pub async fn run_digest(&self) -> Result<DigestOutcome> {
        let _guard = self.run_lock.lock().await;
        counter!("pipeline_runs_total", "kind" => "digest").increment(1);

        let raw = crate::ingest::collect(&self.sources).await;
        if raw.is_empty() {
            tracing::info!(target: "pipeline", "digest run: nothing fetched");
            return Ok(DigestOutcome::Empty);
        }

        // Clustering keeps every copy of a story, so the digest path works
        // from the raw batch rather than the deduped one.
        let clusters = cluster(raw, &self.priorities, &self.matcher);

        let mut known = self.store.all_links()?;
        let fresh: Vec<Cluster> = clusters
            .into_iter()
            .filter(|c| !is_old_story(c, &known))
            .collect();

        if fresh.is_empty() {
            tracing::info!(target: "pipeline", "digest run: every cluster already seen");
            return Ok(DigestOutcome::AllSeen);
        }

        // Summarizer failure aborts before anything is recorded, so the
        // whole digest can be retried.
        let text = self.summarizer.digest(&fresh).await?;

        let mut recorded = 0usize;
        for cluster in &fresh {
            for article in &cluster.members {
                if !article.is_identifiable() || known.contains(&article.link) {
                    continue;
                }
                let headline = format!("[Digest] {}", article.title);
                match self
                    .store
                    .append(&article.link, &headline, &article.published)
                {
                    Ok(()) => {
                        known.insert(article.link.clone());
                        recorded += 1;
                    }
                    Err(e) => {
                        tracing::warn!(target: "pipeline", error = ?e, link = %article.link, "store append failed");
                    }
                }
            }
        }
        tracing::info!(target: "pipeline", recorded, clusters = fresh.len(), "digest recorded");

        if let Err(e) = self.sink.send(&text).await {
            // Articles are already marked; the text is still in the outcome
            // for the caller to surface.
            tracing::error!(target: "pipeline", error = ?e, "digest delivery failed");
        }

        gauge!("pipeline_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
        Ok(DigestOutcome::Completed {
            clusters: fresh.len(),
            recorded,
            text,
        })
    }

    pub fn priorities(&self) -> &PriorityTable {
        &self.priorities
    }
}

/// A cluster is an old story when any of its first three members carries a
/// known link. Checking past the representative catches the case where the
/// same story resurfaces under a slightly different top link.
fn is_old_story(cluster: &Cluster, known: &HashSet<String>) -> bool {
    cluster
        .members
        .iter()
        .take(3)
        .any(|a| known.contains(&a.link))
}
