// src/config.rs
//! Engine configuration: TOML file with env-var overrides.
//!
//! Load order per field: environment variable, then `config/engine.toml`
//! (or `$ENGINE_CONFIG_PATH`), then the built-in default. All tunables have
//! working defaults so the engine runs with zero config.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

pub const ENV_CONFIG_PATH: &str = "ENGINE_CONFIG_PATH";
pub const ENV_SIMILARITY_THRESHOLD: &str = "ENGINE_SIMILARITY_THRESHOLD";
pub const ENV_DEDUP_SCAN_CAP: &str = "ENGINE_DEDUP_SCAN_CAP";
pub const ENV_EMISSION_CAP: &str = "ENGINE_EMISSION_CAP";
pub const ENV_RECENT_WINDOW: &str = "ENGINE_RECENT_WINDOW";
pub const ENV_CHUNK_LIMIT: &str = "ENGINE_CHUNK_LIMIT";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "ENGINE_FETCH_TIMEOUT_SECS";
pub const ENV_PRIORITY_PATH: &str = "ENGINE_PRIORITY_PATH";

pub const DEFAULT_CONFIG_PATH: &str = "config/engine.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Similarity threshold shared by dedup, clustering and the recent-
    /// headline re-check. Strict greater-than comparison.
    pub similarity_threshold: f64,
    /// Max articles scanned by a single dedup pass.
    pub dedup_scan_cap: usize,
    /// Max headlines delivered per incremental run.
    pub emission_cap: usize,
    /// How many recent stored headlines the incremental run re-checks
    /// against.
    pub recent_window: usize,
    /// Per-message character limit for chunked delivery.
    pub chunk_limit: usize,
    /// HTTP timeout for feed fetches, in seconds.
    pub fetch_timeout_secs: u64,
    /// Optional path to a source-priority table (TOML or JSON).
    pub priority_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: crate::similarity::DEFAULT_SIMILARITY_THRESHOLD,
            dedup_scan_cap: crate::dedup::DEFAULT_SCAN_CAP,
            emission_cap: 7,
            recent_window: 50,
            chunk_limit: crate::notify::DEFAULT_CHUNK_LIMIT,
            fetch_timeout_secs: 15,
            priority_path: None,
        }
    }
}

impl AppConfig {
    /// Load from `$ENGINE_CONFIG_PATH` or the default path, then apply env
    /// overrides. A missing file is fine; a present-but-broken file is an
    /// error so a typo never silently reverts a deployment to defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut cfg = if path.exists() {
            let s = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path.display()))?;
            toml::from_str(&s).with_context(|| format!("parsing config {}", path.display()))?
        } else {
            Self::default()
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = env_parse::<f64>(ENV_SIMILARITY_THRESHOLD) {
            self.similarity_threshold = v;
        }
        if let Some(v) = env_parse::<usize>(ENV_DEDUP_SCAN_CAP) {
            self.dedup_scan_cap = v;
        }
        if let Some(v) = env_parse::<usize>(ENV_EMISSION_CAP) {
            self.emission_cap = v;
        }
        if let Some(v) = env_parse::<usize>(ENV_RECENT_WINDOW) {
            self.recent_window = v;
        }
        if let Some(v) = env_parse::<usize>(ENV_CHUNK_LIMIT) {
            self.chunk_limit = v;
        }
        if let Some(v) = env_parse::<u64>(ENV_FETCH_TIMEOUT_SECS) {
            self.fetch_timeout_secs = v;
        }
        if let Ok(p) = std::env::var(ENV_PRIORITY_PATH) {
            if !p.is_empty() {
                self.priority_path = Some(PathBuf::from(p));
            }
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(target: "config", key, value = %raw, "ignoring unparseable override");
            None
        }
    }
}
