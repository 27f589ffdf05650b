use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{PlanModification, RuleViolation, WeeklyPlan};

/// How a repair run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalStatus {
    /// No violations remain.
    Success,
    /// Violations remain after the loop stopped.
    MaxIterations,
    /// The AI path failed and the plan came from the engine alone.
    Error,
}

/// One step of the repair loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentLogEntry {
    pub step: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

/// Execution record of one repair run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentLog {
    pub iteration_count: u32,
    pub total_duration_ms: u64,
    /// Violations from the last validation pass.
    pub violations_found: Vec<RuleViolation>,
    /// Every modification that was applied, across all passes.
    pub modifications_applied: Vec<PlanModification>,
    pub final_status: FinalStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub entries: Vec<AgentLogEntry>,
}

impl AgentLog {
    pub fn new() -> Self {
        Self {
            iteration_count: 0,
            total_duration_ms: 0,
            violations_found: Vec::new(),
            modifications_applied: Vec::new(),
            final_status: FinalStatus::Success,
            error_message: None,
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, step: &str, message: impl Into<String>, data: Value) {
        let message = message.into();
        tracing::debug!("[{}] {}", step, message);
        self.entries.push(AgentLogEntry {
            step: step.to_string(),
            message,
            timestamp: Utc::now(),
            data,
        });
    }

    pub fn steps(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.step.as_str())
    }
}

impl Default for AgentLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary counts over the final plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStats {
    pub total_meals: usize,
    /// Distinct pattern ids.
    pub patterns_used: usize,
    /// Distinct ingredient ids.
    pub ingredients_used: usize,
}

impl AgentStats {
    pub fn from_plan(plan: &WeeklyPlan) -> Self {
        let patterns: HashSet<&str> = plan.meals().map(|m| m.pattern_id.as_str()).collect();
        let ingredients: HashSet<&str> = plan
            .meals()
            .flat_map(|m| m.ingredient_ids.iter().map(String::as_str))
            .collect();
        Self {
            total_meals: plan.total_meals(),
            patterns_used: patterns.len(),
            ingredients_used: ingredients.len(),
        }
    }
}

/// Output of a repair run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub plan: WeeklyPlan,
    pub warnings: Vec<String>,
    pub stats: AgentStats,
    pub agent_log: AgentLog,
}

impl AgentResult {
    pub fn status(&self) -> FinalStatus {
        self.agent_log.final_status
    }

    pub fn remaining_violations(&self) -> &[RuleViolation] {
        &self.agent_log.violations_found
    }
}
