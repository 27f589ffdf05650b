//! Seams to the two external collaborators of the repair loop.

use async_trait::async_trait;
use thiserror::Error;

use crate::llm::LlmError;
use crate::models::{Ingredient, MealPattern, PlanModification, Rule, RuleViolation, WeeklyPlan};

/// Failure of a collaborator call. The loop turns these into warnings.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to build request: {0}")]
    Request(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutcome {
    pub violations: Vec<RuleViolation>,
    pub is_valid: bool,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            violations: Vec::new(),
            is_valid: true,
        }
    }
}

/// Checks a plan against natural-language rules.
#[async_trait]
pub trait RuleValidator: Send + Sync {
    async fn validate(
        &self,
        plan: &WeeklyPlan,
        rules: &[Rule],
    ) -> Result<ValidationOutcome, ServiceError>;
}

/// Proposes ingredient substitutions that fix violations.
#[async_trait]
pub trait ModificationSuggester: Send + Sync {
    async fn suggest(
        &self,
        violations: &[RuleViolation],
        plan: &WeeklyPlan,
        ingredients: &[Ingredient],
        patterns: &[MealPattern],
    ) -> Result<Vec<PlanModification>, ServiceError>;
}
