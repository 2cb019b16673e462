// src/api.rs
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::pipeline::{DigestOutcome, Pipeline, RunOutcome};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/news", post(run_news))
        .route("/digest", post(run_digest))
        .route("/debug/priority", get(debug_priority))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
struct NewsResp {
    status: &'static str,
    emitted: usize,
    cap_hit: bool,
    message: String,
}

async fn run_news(State(state): State<AppState>) -> Json<NewsResp> {
    match state.pipeline.run_incremental().await {
        Ok(RunOutcome::Empty) => Json(NewsResp {
            status: "empty",
            emitted: 0,
            cap_hit: false,
            message: "No news found from sources at the moment.".to_string(),
        }),
        Ok(RunOutcome::Completed { emitted: 0, .. }) => Json(NewsResp {
            status: "no_new",
            emitted: 0,
            cap_hit: false,
            message: "Checked latest news. No new relevant updates found since last check."
                .to_string(),
        }),
        Ok(RunOutcome::Completed { emitted, cap_hit }) => {
            let message = if cap_hit {
                format!("Sent {emitted} updates, stopped at the cap. Run /news again for more.")
            } else {
                format!("Sent {emitted} new relevant articles.")
            };
            Json(NewsResp {
                status: "ok",
                emitted,
                cap_hit,
                message,
            })
        }
        Err(e) => {
            tracing::error!(target: "api", error = ?e, "incremental run failed");
            Json(NewsResp {
                status: "error",
                emitted: 0,
                cap_hit: false,
                message: format!("Run failed: {e}"),
            })
        }
    }
}

#[derive(serde::Serialize)]
struct DigestResp {
    status: &'static str,
    clusters: usize,
    recorded: usize,
    message: String,
}

async fn run_digest(State(state): State<AppState>) -> Json<DigestResp> {
    match state.pipeline.run_digest().await {
        Ok(DigestOutcome::Empty) => Json(DigestResp {
            status: "empty",
            clusters: 0,
            recorded: 0,
            message: "No news found to digest.".to_string(),
        }),
        Ok(DigestOutcome::AllSeen) => Json(DigestResp {
            status: "all_seen",
            clusters: 0,
            recorded: 0,
            message: "All current important news has already been sent or digested.".to_string(),
        }),
        Ok(DigestOutcome::Completed {
            clusters,
            recorded,
            text,
        }) => Json(DigestResp {
            status: "ok",
            clusters,
            recorded,
            message: text,
        }),
        Err(e) => {
            tracing::error!(target: "api", error = ?e, "digest run failed");
            Json(DigestResp {
                status: "error",
                clusters: 0,
                recorded: 0,
                message: format!("Digest failed: {e}"),
            })
        }
    }
}

#[derive(serde::Deserialize)]
struct PriorityQuery {
    link: String,
}

#[derive(serde::Serialize)]
struct PriorityResp {
    link: String,
    priority: i32,
}

async fn debug_priority(
    State(state): State<AppState>,
    Query(q): Query<PriorityQuery>,
) -> Json<PriorityResp> {
    let priority = state.pipeline.priorities().priority_for(&q.link);
    Json(PriorityResp {
        link: q.link,
        priority,
    })
}
