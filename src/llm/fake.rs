//! Deterministic provider for tests and offline runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use super::{LlmError, LlmProvider};

/// Answers prompts by substring match, in registration order.
///
/// Falls back to a default response, or an error when none is set.
#[derive(Debug)]
pub struct FakeProvider {
    responses: RwLock<Vec<(String, String)>>,
    default_response: Option<String>,
    calls: AtomicUsize,
}

impl Default for FakeProvider {
    /// Reports no violations and suggests nothing.
    fn default() -> Self {
        Self {
            responses: RwLock::new(Vec::new()),
            default_response: Some(
                r#"{"violations": [], "isValid": true, "modifications": []}"#.to_string(),
            ),
            calls: AtomicUsize::new(0),
        }
    }
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            responses: RwLock::new(Vec::new()),
            default_response: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_response(prompt_contains: &str, response: &str) -> Self {
        let provider = Self::new();
        provider.add_response(prompt_contains, response);
        provider
    }

    pub fn add_response(&self, prompt_contains: &str, response: &str) {
        if let Ok(mut responses) = self.responses.write() {
            responses.push((prompt_contains.to_lowercase(), response.to_string()));
        }
    }

    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }

    /// Number of `complete` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let prompt_lower = prompt.to_lowercase();
        if let Ok(responses) = self.responses.read() {
            if let Some((_, response)) = responses
                .iter()
                .find(|(pattern, _)| prompt_lower.contains(pattern.as_str()))
            {
                return Ok(response.clone());
            }
        }

        match &self.default_response {
            Some(response) => Ok(response.clone()),
            None => Err(LlmError::RequestFailed(format!(
                "FakeProvider: no response configured for prompt starting with: {}",
                prompt.chars().take(100).collect::<String>()
            ))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}
