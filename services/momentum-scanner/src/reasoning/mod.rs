//! Reasoning service seam
//!
//! A reasoning service takes a natural-language prompt and answers with free
//! text that should contain one fenced JSON block. The block is pulled out and
//! parsed here; no schema is enforced by the service itself.

pub mod gemini;

pub use gemini::GeminiClient;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, ScanError};

/// First ```json fenced block in a reply
static JSON_FENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```json\s*(.*?)```").expect("Invalid JSON fence regex"));

/// Text-generation backend consulted once per candidate
#[async_trait::async_trait]
pub trait ReasoningService: Send + Sync {
    /// Send `prompt`, return the structured payload embedded in the reply.
    ///
    /// Single attempt. Transport failures, non-success statuses and replies
    /// without a parseable payload are all errors.
    async fn evaluate(&self, prompt: &str, credential: &str) -> Result<serde_json::Value>;

    fn name(&self) -> &str;
}

/// Extract and parse the first fenced JSON block of a reply
pub fn extract_structured_payload(text: &str) -> Result<serde_json::Value> {
    let block = JSON_FENCE_PATTERN
        .captures(text)
        .and_then(|cap| cap.get(1))
        .ok_or_else(|| {
            ScanError::MalformedResponse("no fenced json block in reply".to_string())
        })?;

    let payload: serde_json::Value = serde_json::from_str(block.as_str().trim())
        .map_err(|e| ScanError::MalformedResponse(format!("invalid json block: {}", e)))?;

    if !payload.is_object() {
        return Err(ScanError::MalformedResponse(
            "json block is not an object".to_string(),
        ));
    }

    Ok(payload)
}
