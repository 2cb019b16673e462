// src/notify/mod.rs
//! Delivery of rendered messages to the configured channel.

pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// Hard per-message limit for chat transports.
pub const DEFAULT_CHUNK_LIMIT: usize = 4000;

#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Deliver one message. Implementations chunk internally when the text
    /// exceeds the transport limit.
    async fn send(&self, text: &str) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Sink that only logs; used when no transport is configured.
pub struct LogSink;

#[async_trait]
impl DeliverySink for LogSink {
    async fn send(&self, text: &str) -> Result<()> {
        for chunk in split_for_delivery(text, DEFAULT_CHUNK_LIMIT) {
            tracing::info!(target: "notify", len = chunk.len(), "delivery (log sink):\n{chunk}");
        }
        Ok(())
    }
    fn name(&self) -> &'static str {
        "log"
    }
}

/// Split a long message into chunks under `limit` characters, breaking only
/// at blank lines so no paragraph is ever cut mid-way. A single paragraph
/// over the limit becomes its own oversized chunk; the transport decides what
/// to do with it.
pub fn split_for_delivery(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for para in text.split("\n\n") {
        if current.is_empty() {
            current = para.to_string();
            continue;
        }
        // +2 for the separator being restored
        if current.len() + 2 + para.len() <= limit {
            current.push_str("\n\n");
            current.push_str(para);
        } else {
            chunks.push(current);
            current = para.to_string();
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
