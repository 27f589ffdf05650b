use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::prompts::{suggestion_prompt, validation_prompt};
use super::LlmProvider;
use crate::agent::{ModificationSuggester, RuleValidator, ServiceError, ValidationOutcome};
use crate::models::{Ingredient, MealPattern, PlanModification, Rule, RuleViolation, WeeklyPlan};

/// Cut the JSON document out of a model reply.
///
/// Handles bare JSON, ```json fenced blocks and prose around a single object.
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.trim_end();
        let rest = rest.strip_suffix("```").unwrap_or(rest);
        // The info string ("json") ends at the first newline, or where the JSON starts.
        let body = match rest.split_once('\n') {
            Some((info, body)) if !info.contains(['{', '[']) => body,
            _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
        return body.trim();
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

fn parse_reply<'de, T: Deserialize<'de>>(reply: &'de str) -> Result<T, ServiceError> {
    serde_json::from_str(extract_json(reply))
        .map_err(|e| ServiceError::InvalidResponse(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct ValidationReply {
    #[serde(default)]
    violations: Vec<RuleViolation>,
    #[serde(default, rename = "isValid")]
    is_valid: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct SuggestionReply {
    #[serde(default)]
    modifications: Vec<PlanModification>,
}

/// Rule validator backed by a language model.
#[derive(Debug, Clone)]
pub struct LlmRuleValidator {
    provider: Arc<dyn LlmProvider>,
}

impl LlmRuleValidator {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl RuleValidator for LlmRuleValidator {
    async fn validate(
        &self,
        plan: &WeeklyPlan,
        rules: &[Rule],
    ) -> Result<ValidationOutcome, ServiceError> {
        if rules.is_empty() {
            return Ok(ValidationOutcome::valid());
        }

        let prompt =
            validation_prompt(plan, rules).map_err(|e| ServiceError::Request(e.to_string()))?;
        tracing::debug!(
            "Validating plan against {} rules with {}/{}",
            rules.len(),
            self.provider.provider_name(),
            self.provider.model_name()
        );
        let reply = self.provider.complete(&prompt).await?;
        let parsed: ValidationReply = parse_reply(&reply)?;

        Ok(ValidationOutcome {
            // Only an explicit `false` marks the plan invalid.
            is_valid: parsed.is_valid != Some(false),
            violations: parsed.violations,
        })
    }
}

/// Modification suggester backed by a language model.
#[derive(Debug, Clone)]
pub struct LlmModificationSuggester {
    provider: Arc<dyn LlmProvider>,
}

impl LlmModificationSuggester {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ModificationSuggester for LlmModificationSuggester {
    async fn suggest(
        &self,
        violations: &[RuleViolation],
        plan: &WeeklyPlan,
        ingredients: &[Ingredient],
        patterns: &[MealPattern],
    ) -> Result<Vec<PlanModification>, ServiceError> {
        if violations.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = suggestion_prompt(violations, plan, ingredients, patterns)
            .map_err(|e| ServiceError::Request(e.to_string()))?;
        let reply = self.provider.complete(&prompt).await?;
        let parsed: SuggestionReply = parse_reply(&reply)?;
        tracing::debug!("Suggester proposed {} modifications", parsed.modifications.len());
        Ok(parsed.modifications)
    }
}
