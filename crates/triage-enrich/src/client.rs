//! Chat-completions client

use serde::{Deserialize, Serialize};

use triage_core::Finding;

use crate::prompt::{batch_prompt, SYSTEM_PROMPT};
use crate::response::{parse_verdict, AnalysisVerdict};
use crate::{AnalysisConfig, EnrichError, EnrichResult};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Client for the analysis provider. Cheap to clone; the underlying
/// connection pool is shared.
#[derive(Clone)]
pub struct AnalysisClient {
    client: reqwest::Client,
    config: AnalysisConfig,
}

impl AnalysisClient {
    pub fn new(config: AnalysisConfig) -> EnrichResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Analyze one scan's findings with a single provider call.
    ///
    /// Exactly one attempt is made; any transport, status, or parse failure
    /// is returned to the caller, which is expected to fall back rather than
    /// retry.
    pub async fn analyze_batch(&self, findings: &[Finding]) -> EnrichResult<AnalysisVerdict> {
        let user_prompt = batch_prompt(findings);

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::Provider(status.as_u16()));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::Parse(format!("invalid completion body: {}", e)))?;

        let content = completion
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| EnrichError::Parse("completion has no choices".to_string()))?;

        tracing::debug!(findings = findings.len(), "analysis completed");

        parse_verdict(content)
    }
}
