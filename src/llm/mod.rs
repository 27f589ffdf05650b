//! Language-model collaborators for the repair loop.
//!
//! A provider turns a prompt into text. The adapters in [`services`] build the
//! prompts, call a provider and parse the JSON answers into plan types.

mod fake;
mod gemini;
mod prompts;
mod services;

pub use fake::FakeProvider;
pub use gemini::GeminiProvider;
pub use services::{extract_json, LlmModificationSuggester, LlmRuleValidator};

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Text-in, text-out model access.
#[async_trait]
pub trait LlmProvider: Send + Sync + fmt::Debug {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Short provider id ("gemini", "fake").
    fn provider_name(&self) -> &'static str;

    fn model_name(&self) -> &str;
}

/// Build a provider from the environment.
///
/// - `PLANNER_LLM_PROVIDER`: "gemini" (default) or "fake"
/// - `GOOGLE_API_KEY`: required for gemini
/// - `GEMINI_MODEL`: model name, defaults to [`DEFAULT_GEMINI_MODEL`]
pub fn create_provider_from_env() -> Result<Box<dyn LlmProvider>, LlmError> {
    let provider =
        std::env::var("PLANNER_LLM_PROVIDER").unwrap_or_else(|_| "gemini".to_string());

    match provider.as_str() {
        "fake" => Ok(Box::new(FakeProvider::default())),
        "gemini" => {
            let api_key = std::env::var("GOOGLE_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| LlmError::NotConfigured("GOOGLE_API_KEY not set".to_string()))?;
            let model = std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
            Ok(Box::new(GeminiProvider::new(api_key, model)))
        }
        other => Err(LlmError::NotConfigured(format!(
            "Unknown provider: {}",
            other
        ))),
    }
}
