// src/classify.rs
//! Relevance classification and digest summarization seams.
//!
//! Both are trait objects so the pipeline never knows which model (if any)
//! sits behind them. The classifier answers one question per article: is this
//! exam-relevant, and if so, what is the one-line headline for it. The
//! summarizer turns a batch of story clusters into a categorized digest.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cluster::Cluster;

/// Sentinel the model returns for an irrelevant article.
const IRRELEVANT_SENTINEL: &str = "NO";

/// Digest input is capped to keep the request under model token limits.
pub const DIGEST_CLUSTER_CAP: usize = 30;

#[async_trait]
pub trait Classifier: Send + Sync {
    /// `Ok(Some(headline))` for a relevant article, `Ok(None)` for an
    /// irrelevant one. `Err` means the call itself failed; callers decide
    /// whether to skip or retry.
    async fn classify(&self, title: &str, summary: &str) -> Result<Option<String>>;
    fn provider_name(&self) -> &'static str;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Render a categorized digest over at most [`DIGEST_CLUSTER_CAP`]
    /// clusters.
    async fn digest(&self, clusters: &[Cluster]) -> Result<String>;
    fn provider_name(&self) -> &'static str;
}

pub type DynClassifier = Arc<dyn Classifier>;
pub type DynSummarizer = Arc<dyn Summarizer>;

/// Build both seams from the environment. With no `OPENAI_API_KEY` the
/// disabled implementations are returned and the pipeline degrades to
/// pass-through behavior.
pub fn build_from_env() -> (DynClassifier, DynSummarizer) {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => {
            let client = OpenAiClient::new(key, std::env::var("OPENAI_MODEL").ok());
            let client = Arc::new(client);
            (client.clone(), client)
        }
        _ => {
            tracing::warn!(target: "classify", "OPENAI_API_KEY not set, classification disabled");
            (Arc::new(Disabled), Arc::new(Disabled))
        }
    }
}

// ------------------------------------------------------------
// OpenAI-backed implementation
// ------------------------------------------------------------

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}
#[derive(Serialize)]
struct ChatReq<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
    max_tokens: u32,
}
#[derive(Deserialize)]
struct ChatResp {
    choices: Vec<Choice>,
}
#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}
#[derive(Deserialize)]
struct ChoiceMsg {
    content: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, model_override: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("news-digest-engine/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key,
            model: model_override.unwrap_or_else(|| "gpt-4o-mini".to_string()),
        }
    }

    async fn chat(&self, system: &str, user: &str, max_tokens: u32) -> Result<String> {
        let req = ChatReq {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system,
                },
                Msg {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.2,
            max_tokens,
        };
        let resp = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("chat completions send()")?;
        if !resp.status().is_success() {
            return Err(anyhow!("chat completions status {}", resp.status()));
        }
        let body: ChatResp = resp.json().await.context("chat completions body")?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default();
        if content.is_empty() {
            return Err(anyhow!("chat completions returned empty content"));
        }
        Ok(content)
    }
}

const CLASSIFIER_SYSTEM: &str = "You are a strict news content filter for a student preparing \
for UPSC (Civil Services), SSC, and Bank exams in India. Relevant topics: government policies, \
economy, international relations, supreme court verdicts, major appointments, science & tech, \
environment. Irrelevant: local crime, political gossip, sports (unless major tournaments), \
entertainment, trivial accidents. If the article is NOT relevant, reply with exactly NO. If it \
is relevant, reply with a single concise factual headline for current affairs notes, no \
markdown, no prefix.";

const SUMMARIZER_SYSTEM: &str = "You are a senior editor for a civil-services exam preparation \
portal. You receive clusters of news reports on the same events. Ignore clusters irrelevant to \
UPSC/SSC/Bank exams. For each relevant cluster write one master headline combining the key \
facts, with a markdown link to the best one or two articles (prefer official sources). Group \
headlines under themes (Polity & Governance, Economy & Banking, International Relations, \
Science & Technology, Environment, Defence & Security, Society & Education, Legal & \
Constitutional). Return clean markdown; omit empty themes.";

#[async_trait]
impl Classifier for OpenAiClient {
    async fn classify(&self, title: &str, summary: &str) -> Result<Option<String>> {
        let user = format!("Title: {title}\nSummary: {summary}");
        let text = self.chat(CLASSIFIER_SYSTEM, &user, 120).await?;
        if text.trim().eq_ignore_ascii_case(IRRELEVANT_SENTINEL) {
            return Ok(None);
        }
        let line = sanitize_headline(&text);
        if line.is_empty() {
            Ok(None)
        } else {
            Ok(Some(line))
        }
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

const EMPTY_DIGEST_TEXT: &str = "Nothing new to digest right now.";

#[async_trait]
impl Summarizer for OpenAiClient {
    async fn digest(&self, clusters: &[Cluster]) -> Result<String> {
        if clusters.is_empty() {
            return Ok(EMPTY_DIGEST_TEXT.to_string());
        }
        let user = render_cluster_input(clusters);
        self.chat(SUMMARIZER_SYSTEM, &user, 1500).await
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

/// Serialize clusters for the summarizer prompt, capped at
/// [`DIGEST_CLUSTER_CAP`].
fn render_cluster_input(clusters: &[Cluster]) -> String {
    let mut out = String::new();
    for (i, cluster) in clusters.iter().take(DIGEST_CLUSTER_CAP).enumerate() {
        out.push_str(&format!("\nCluster {}:\n", i + 1));
        for art in &cluster.members {
            out.push_str(&format!("- Title: {}\n  Link: {}\n", art.title, art.link));
        }
    }
    out
}

/// Collapse the model reply to one trimmed line.
fn sanitize_headline(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_space = false;
    for ch in input.chars() {
        let c = match ch {
            '\r' | '\n' | '\t' => ' ',
            c => c,
        };
        if c == ' ' {
            if !prev_space && !out.is_empty() {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(c);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

// ------------------------------------------------------------
// Disabled implementation
// ------------------------------------------------------------

/// Pass-through used when no provider is configured: every article is kept
/// with its feed title, and digests degrade to a plain cluster listing.
pub struct Disabled;

#[async_trait]
impl Classifier for Disabled {
    async fn classify(&self, title: &str, _summary: &str) -> Result<Option<String>> {
        Ok(Some(title.to_string()))
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

#[async_trait]
impl Summarizer for Disabled {
    async fn digest(&self, clusters: &[Cluster]) -> Result<String> {
        if clusters.is_empty() {
            return Ok(EMPTY_DIGEST_TEXT.to_string());
        }
        let mut out = String::new();
        for cluster in clusters.iter().take(DIGEST_CLUSTER_CAP) {
            let rep = cluster.representative();
            out.push_str(&format!("* {} ({})\n", rep.title, rep.link));
        }
        Ok(out.trim_end().to_string())
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}
