// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod classify;
pub mod cluster;
pub mod config;
pub mod dedup;
pub mod ingest;
pub mod metrics;
pub mod notify;
pub mod pipeline;
pub mod similarity;
pub mod source_priority;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::AppConfig;
pub use crate::pipeline::{DigestOutcome, Pipeline, RunOutcome};
pub use crate::similarity::Matcher;
pub use crate::source_priority::PriorityTable;
