//! Google Gemini client
//!
//! POSTs a single-turn prompt to `generateContent` and hands the reply text
//! to the fenced-payload extractor.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use super::{extract_structured_payload, ReasoningService};
use crate::error::{Result, ScanError};

/// Default API base URL
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default timeout for generation requests (60 seconds)
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Low temperature keeps verdicts close to the rubric
const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Gemini generative-language client
pub struct GeminiClient {
    base_url: String,
    model: String,
    http_client: Client,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a client for `model` against the public endpoint
    pub fn new(model: &str) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, model)
    }

    /// Create client with specific URL (for testing)
    pub fn with_base_url(base_url: &str, model: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| ScanError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            http_client,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a prompt and return the concatenated reply text
    pub async fn generate(&self, prompt: &str, credential: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GeminiGenerationConfig {
                temperature: Some(DEFAULT_TEMPERATURE),
                max_output_tokens: None,
            }),
        };

        debug!("Requesting verdict from Gemini: model={}, prompt_len={}", self.model, prompt.len());

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", credential)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScanError::Transport(format!(
                        "Gemini request timed out after {:?}",
                        self.timeout
                    ))
                } else if e.is_connect() {
                    ScanError::Transport(format!("Failed to connect to Gemini at {}: {}", url, e))
                } else {
                    ScanError::Transport(format!("Gemini request failed: {}", e))
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Gemini returned error: status={}, body={}", status, body);
            return Err(ScanError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let body: GeminiResponse = response.json().await.map_err(|e| {
            ScanError::MalformedResponse(format!("Failed to parse Gemini response: {}", e))
        })?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ScanError::MalformedResponse("Gemini reply has no text".to_string()))?;

        Ok(text)
    }
}

#[async_trait::async_trait]
impl ReasoningService for GeminiClient {
    async fn evaluate(&self, prompt: &str, credential: &str) -> Result<serde_json::Value> {
        let text = self.generate(prompt, credential).await?;
        extract_structured_payload(&text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// Wire types for generateContent

#[derive(Debug, Clone, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Clone, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

    fn reply(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }]
        })
    }

    #[tokio::test]
    async fn test_evaluate_extracts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply(
                "Analysis follows.\n```json\n{\"isValid\": true, \"entry\": 100, \"stopLoss\": 95, \"rationale\": \"OB retest\"}\n```",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(&server.uri(), "gemini-2.0-flash").unwrap();
        let payload = client.evaluate("prompt", "secret").await.unwrap();

        assert_eq!(payload["entry"], 100);
        assert_eq!(payload["rationale"], "OB retest");
    }

    #[tokio::test]
    async fn test_non_success_is_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key invalid"))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(&server.uri(), "gemini-2.0-flash").unwrap();
        let err = client.evaluate("prompt", "bad").await.unwrap_err();

        assert_eq!(
            err,
            ScanError::Service {
                status: 403,
                body: "API key invalid".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_reply_without_fence_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(reply("I cannot judge this chart.")),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(&server.uri(), "gemini-2.0-flash").unwrap();
        let err = client.evaluate("prompt", "secret").await.unwrap_err();
        assert!(matches!(err, ScanError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reply("```json\n{}\n```"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(&server.uri(), "gemini-2.0-flash")
            .unwrap()
            .with_timeout(Duration::from_millis(50));
        let err = client.evaluate("prompt", "secret").await.unwrap_err();
        assert!(matches!(err, ScanError::Transport(_)));
    }
}
