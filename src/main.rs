//! News Digest Engine — Binary Entrypoint
//! Boots the Axum HTTP server, wiring feeds, pipeline, store and delivery.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_digest_engine::api::{create_router, AppState};
use news_digest_engine::classify;
use news_digest_engine::config::AppConfig;
use news_digest_engine::ingest::config::load_feeds_default;
use news_digest_engine::ingest::providers::query_feed::{
    query_feed_source, DEFAULT_SEARCH_FEED_BASE,
};
use news_digest_engine::ingest::providers::rss::RssFeedSource;
use news_digest_engine::ingest::types::{FeedSource, FeedSpec};
use news_digest_engine::metrics::Metrics;
use news_digest_engine::notify::telegram::TelegramSink;
use news_digest_engine::notify::{DeliverySink, LogSink};
use news_digest_engine::pipeline::Pipeline;
use news_digest_engine::source_priority::PriorityTable;
use news_digest_engine::store::{JsonlStore, SeenStore};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_digest_engine=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

fn build_sources(specs: Vec<FeedSpec>, cfg: &AppConfig) -> Result<Vec<Box<dyn FeedSource>>> {
    let client = reqwest::Client::builder()
        .user_agent("news-digest-engine/0.1")
        .timeout(std::time::Duration::from_secs(cfg.fetch_timeout_secs))
        .build()
        .context("building feed http client")?;

    let base = std::env::var("ENGINE_SEARCH_FEED_BASE")
        .unwrap_or_else(|_| DEFAULT_SEARCH_FEED_BASE.to_string());

    let mut sources: Vec<Box<dyn FeedSource>> = Vec::with_capacity(specs.len());
    for spec in specs {
        match spec {
            FeedSpec::Url(url) => sources.push(Box::new(RssFeedSource::from_url(url, client.clone()))),
            FeedSpec::Query(q) => sources.push(Box::new(query_feed_source(&base, &q, client.clone()))),
        }
    }
    Ok(sources)
}

fn build_sink(chunk_limit: usize) -> Arc<dyn DeliverySink> {
    let token = std::env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default();
    let chat_id = std::env::var("TELEGRAM_CHAT_ID").unwrap_or_default();
    if token.is_empty() || chat_id.is_empty() {
        tracing::warn!("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID not set, logging deliveries only");
        Arc::new(LogSink)
    } else {
        Arc::new(TelegramSink::new(token, chat_id).with_chunk_limit(chunk_limit))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let metrics = Metrics::init()?;

    let cfg = AppConfig::load()?;
    let priorities = match &cfg.priority_path {
        Some(p) => PriorityTable::load_from_file(p),
        None => PriorityTable::load_from_file("config/priority.toml"),
    };

    let specs = load_feeds_default().context("loading feed roster")?;
    tracing::info!(feeds = specs.len(), "feed roster loaded");
    let sources = build_sources(specs, &cfg)?;

    let (classifier, summarizer) = classify::build_from_env();
    let store: Arc<dyn SeenStore> = Arc::new(JsonlStore::new(
        std::env::var("ENGINE_SEEN_STORE_PATH").unwrap_or_else(|_| "data/seen.jsonl".to_string()),
    ));
    let sink = build_sink(cfg.chunk_limit);

    let pipeline = Pipeline::new(
        sources,
        priorities,
        classifier,
        summarizer,
        store,
        sink,
        cfg,
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };
    let router = create_router(state).merge(metrics.router());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, router).await.context("serving http")?;
    Ok(())
}
