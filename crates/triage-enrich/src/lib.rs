//! Triage Enrich - AI provider client
//!
//! This crate owns the single outbound HTTP call of the pipeline: batching a
//! scan's findings into one analysis prompt, sending it to an
//! OpenAI-compatible chat-completions endpoint, and parsing the (possibly
//! markdown-fenced) JSON verdict that comes back. Every failure mode maps to
//! a typed error so the worker can fall back deterministically.

pub mod client;
pub mod prompt;
pub mod response;

use thiserror::Error;

pub use client::AnalysisClient;
pub use response::AnalysisVerdict;

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned status {0}")]
    Provider(u16),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type EnrichResult<T> = Result<T, EnrichError>;

/// Configuration for the analysis provider
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Provider base URL; the chat-completions path is appended.
    pub base_url: String,

    /// Bearer credential.
    pub api_key: String,

    /// Model identifier requested from the provider.
    pub model: String,

    /// Completion token budget per batch.
    pub max_tokens: u32,

    /// Sampling temperature; kept low, the output must be machine-parseable.
    pub temperature: f32,

    /// Hard timeout for the one external call (seconds).
    pub timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.z.ai/v1".to_string(),
            api_key: String::new(),
            model: "glm-4-flash".to_string(),
            max_tokens: 1000,
            temperature: 0.3,
            timeout_secs: 30,
        }
    }
}
