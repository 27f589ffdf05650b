//! Bounded validate -> suggest -> apply loop around the planning engine.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use super::apply::apply_modifications;
use super::cancel::CancellationFlag;
use super::events::{map_violations_to_conflicts, ProgressEvent};
use super::report::{AgentLog, AgentResult, AgentStats, FinalStatus};
use super::services::{ModificationSuggester, RuleValidator};
use crate::error::{PlannerError, Result};
use crate::models::{
    Ingredient, MealPattern, PlanModification, PlanningConfig, PlanningResult, Rule,
    RuleViolation, WeeklyPlan,
};
use crate::planner::constants::MAX_REPAIR_ITERATIONS;
use crate::planner::generate_plan;
use crate::state::Inventory;

/// Callback receiving progress events.
pub type ProgressFn<'a> = &'a (dyn Fn(&ProgressEvent) + Send + Sync);

/// Inputs of one repair run.
#[derive(Debug, Clone)]
pub struct RepairRequest<'a> {
    pub config: &'a PlanningConfig,
    pub ingredients: &'a [Ingredient],
    pub patterns: &'a [MealPattern],
    pub rules: &'a [Rule],
    /// Start from this plan instead of generating one.
    pub existing_plan: Option<WeeklyPlan>,
    /// Seed for the engine; entropy when `None`.
    pub seed: Option<u64>,
    pub cancel: Option<CancellationFlag>,
}

impl<'a> RepairRequest<'a> {
    pub fn new(
        config: &'a PlanningConfig,
        ingredients: &'a [Ingredient],
        patterns: &'a [MealPattern],
        rules: &'a [Rule],
    ) -> Self {
        Self {
            config,
            ingredients,
            patterns,
            rules,
            existing_plan: None,
            seed: None,
            cancel: None,
        }
    }

    pub fn with_existing_plan(mut self, plan: WeeklyPlan) -> Self {
        self.existing_plan = Some(plan);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn run_engine(&self) -> Result<PlanningResult> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        generate_plan(self.ingredients, self.patterns, self.config, &mut rng)
    }
}

/// Working state of one run. Nothing here outlives the call.
struct Session<'r> {
    validator: &'r dyn RuleValidator,
    suggester: &'r dyn ModificationSuggester,
    on_progress: Option<ProgressFn<'r>>,
    cancel: Option<&'r CancellationFlag>,
    log: AgentLog,
    warnings: Vec<String>,
}

impl Session<'_> {
    fn emit(&self, event: ProgressEvent) {
        if let Some(callback) = self.on_progress {
            callback(&event);
        }
    }

    fn check_cancelled(&self) -> Result<()> {
        match self.cancel {
            Some(flag) => flag.check(),
            None => Ok(()),
        }
    }

    /// Violations of `rules` in `plan`. Collaborator failures count as none.
    async fn validate(&mut self, plan: &WeeklyPlan, rules: &[Rule]) -> Result<Vec<RuleViolation>> {
        if rules.is_empty() {
            self.log.record(
                "validate_rules",
                "No rules to validate",
                json!({ "violations_count": 0 }),
            );
            return Ok(Vec::new());
        }

        self.check_cancelled()?;
        let started = Instant::now();
        match self.validator.validate(plan, rules).await {
            Ok(outcome) => {
                self.log.record(
                    "validate_rules",
                    format!("Found {} rule violations", outcome.violations.len()),
                    json!({
                        "violations_count": outcome.violations.len(),
                        "is_valid": outcome.is_valid,
                        "duration_ms": started.elapsed().as_millis() as u64,
                    }),
                );
                Ok(outcome.violations)
            }
            Err(e) => {
                tracing::warn!("Rule validation failed, continuing without it: {}", e);
                self.log.record(
                    "validate_rules",
                    "Error validating rules with AI",
                    json!({ "error": e.to_string() }),
                );
                self.warnings
                    .push("Could not validate rules with AI".to_string());
                Ok(Vec::new())
            }
        }
    }

    /// Proposed fixes. Collaborator failures yield none.
    async fn suggest(
        &mut self,
        violations: &[RuleViolation],
        plan: &WeeklyPlan,
        ingredients: &[Ingredient],
        patterns: &[MealPattern],
    ) -> Result<Vec<PlanModification>> {
        self.check_cancelled()?;
        let started = Instant::now();
        match self
            .suggester
            .suggest(violations, plan, ingredients, patterns)
            .await
        {
            Ok(modifications) => {
                self.log.record(
                    "suggest_modifications",
                    format!("Suggested {} modifications", modifications.len()),
                    json!({
                        "modifications_count": modifications.len(),
                        "duration_ms": started.elapsed().as_millis() as u64,
                    }),
                );
                Ok(modifications)
            }
            Err(e) => {
                tracing::warn!("Suggesting modifications failed: {}", e);
                self.log.record(
                    "suggest_modifications",
                    "Error suggesting modifications with AI",
                    json!({ "error": e.to_string() }),
                );
                self.warnings.push(
                    "Could not suggest modifications with AI. Plan returned with violations."
                        .to_string(),
                );
                Ok(Vec::new())
            }
        }
    }
}

/// Generate (or take) a plan and repair it against the active rules.
///
/// Collaborator failures are absorbed as warnings. `Err` means no plan could
/// be produced at all, or the run was cancelled; an `Error` progress event is
/// emitted first in both cases.
pub async fn run_repair_loop(
    request: RepairRequest<'_>,
    validator: &dyn RuleValidator,
    suggester: &dyn ModificationSuggester,
    on_progress: Option<ProgressFn<'_>>,
) -> Result<AgentResult> {
    let result = drive(&request, validator, suggester, on_progress).await;
    if let Err(e) = &result {
        tracing::error!("Repair run failed: {}", e);
        if let Some(callback) = on_progress {
            callback(&ProgressEvent::Error {
                message: e.to_string(),
            });
        }
    }
    result
}

async fn drive(
    request: &RepairRequest<'_>,
    validator: &dyn RuleValidator,
    suggester: &dyn ModificationSuggester,
    on_progress: Option<ProgressFn<'_>>,
) -> Result<AgentResult> {
    let started = Instant::now();
    let active_rules: Vec<Rule> = request
        .rules
        .iter()
        .filter(|r| r.is_active)
        .cloned()
        .collect();
    let inventory = Inventory::new(request.ingredients);

    let mut session = Session {
        validator,
        suggester,
        on_progress,
        cancel: request.cancel.as_ref(),
        log: AgentLog::new(),
        warnings: Vec::new(),
    };

    tracing::info!(
        "Starting repair run: {} rules, {} ingredients, {} patterns",
        active_rules.len(),
        request.ingredients.len(),
        request.patterns.len()
    );

    let mut plan = match &request.existing_plan {
        Some(existing) => {
            session.emit(ProgressEvent::Generating {
                message: "Adjusting existing plan...".to_string(),
            });
            session.log.record(
                "generate_base_plan",
                "Using existing plan",
                json!({ "days": existing.days().len() }),
            );
            existing.clone()
        }
        None => {
            session.emit(ProgressEvent::Generating {
                message: "Generating your weekly plan...".to_string(),
            });
            let generated = request.run_engine().map_err(|e| {
                PlannerError::NoPlan(format!("failed to generate base plan: {}", e))
            })?;
            session.log.record(
                "generate_base_plan",
                format!("Generated base plan with {} days", generated.plan.days().len()),
                json!({
                    "total_meals": generated.stats.total_meals,
                    "warnings_count": generated.warnings.len(),
                }),
            );
            session.warnings.extend(generated.warnings);
            generated.plan
        }
    };

    let mut violations: Vec<RuleViolation> = Vec::new();
    let mut iteration: u32 = 0;

    while iteration < MAX_REPAIR_ITERATIONS {
        session.emit(ProgressEvent::Validating {
            active_rules_count: active_rules.len(),
        });
        violations = session.validate(&plan, &active_rules).await?;

        if violations.is_empty() {
            tracing::info!("No violations found, stopping");
            break;
        }
        tracing::info!(
            "Iteration {}: {} violations",
            iteration + 1,
            violations.len()
        );

        let modifications = session
            .suggest(&violations, &plan, request.ingredients, request.patterns)
            .await?;
        if modifications.is_empty() {
            tracing::info!("No modifications suggested, stopping");
            break;
        }

        session.emit(ProgressEvent::Fixing {
            changes_count: modifications.len(),
            iteration: iteration + 1,
        });
        let apply_started = Instant::now();
        let (updated, applied) = apply_modifications(&plan, &modifications, &inventory);
        session.log.record(
            "apply_modifications",
            format!(
                "Applied {}/{} modifications",
                applied.len(),
                modifications.len()
            ),
            json!({
                "modifications_applied": applied.len(),
                "modifications_attempted": modifications.len(),
                "duration_ms": apply_started.elapsed().as_millis() as u64,
            }),
        );
        plan = updated;
        session.log.modifications_applied.extend(applied);
        iteration += 1;
    }

    if iteration >= MAX_REPAIR_ITERATIONS && !violations.is_empty() {
        tracing::info!("Max iterations reached, validating once more");
        violations = session.validate(&plan, &active_rules).await?;
    }

    // Finalize.
    if !violations.is_empty() {
        session
            .warnings
            .push(format!("{} rule violations found:", violations.len()));
        for (i, v) in violations.iter().enumerate() {
            session.warnings.push(format!(
                "{}. {}: {} (affects: {})",
                i + 1,
                v.rule_text,
                v.explanation,
                v.affected_meals.join(", ")
            ));
        }
    }

    let final_status = if violations.is_empty() {
        FinalStatus::Success
    } else {
        FinalStatus::MaxIterations
    };

    session.log.record(
        "finalize",
        if violations.is_empty() {
            "Plan finalized successfully".to_string()
        } else {
            format!("Plan finalized with {} violations", violations.len())
        },
        json!({
            "violations_count": violations.len(),
            "warnings_count": session.warnings.len(),
            "iteration_count": iteration,
        }),
    );

    match final_status {
        FinalStatus::Success => session.emit(ProgressEvent::Success),
        _ => session.emit(ProgressEvent::PartialSuccess {
            conflicts: map_violations_to_conflicts(&violations, request.config.locale),
        }),
    }

    let Session {
        mut log, warnings, ..
    } = session;
    log.iteration_count = iteration;
    log.total_duration_ms = started.elapsed().as_millis() as u64;
    log.violations_found = violations;
    log.final_status = final_status;

    tracing::info!(
        "Repair run complete: {} iterations, {} violations left, {} modifications applied, {} ms",
        log.iteration_count,
        log.violations_found.len(),
        log.modifications_applied.len(),
        log.total_duration_ms
    );

    Ok(AgentResult {
        stats: AgentStats::from_plan(&plan),
        plan,
        warnings,
        agent_log: log,
    })
}

/// Run the repair loop under a wall-clock budget.
///
/// On timeout or failure the engine's direct plan is returned instead, with a
/// warning and a log whose status is `Error`. Cancellation is passed through.
pub async fn plan_with_timeout(
    request: RepairRequest<'_>,
    validator: &dyn RuleValidator,
    suggester: &dyn ModificationSuggester,
    on_progress: Option<ProgressFn<'_>>,
    budget: Duration,
) -> Result<AgentResult> {
    let fallback_request = RepairRequest {
        existing_plan: None,
        ..request.clone()
    };
    let started = Instant::now();

    let reason = match tokio::time::timeout(
        budget,
        run_repair_loop(request, validator, suggester, on_progress),
    )
    .await
    {
        Ok(Ok(result)) => return Ok(result),
        Ok(Err(PlannerError::Cancelled)) => return Err(PlannerError::Cancelled),
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("timed out after {} s", budget.as_secs()),
    };

    tracing::warn!("AI planning unavailable ({}), using engine plan", reason);
    let generated = fallback_request.run_engine()?;

    let mut warnings = generated.warnings;
    warnings.push(format!(
        "AI rule checking unavailable ({}). Plan generated without rule validation.",
        reason
    ));

    let mut log = AgentLog::new();
    log.record("fallback", "Returned plan without AI validation", json!({ "reason": reason }));
    log.final_status = FinalStatus::Error;
    log.error_message = Some(reason);
    log.total_duration_ms = started.elapsed().as_millis() as u64;

    Ok(AgentResult {
        stats: AgentStats::from_plan(&generated.plan),
        plan: generated.plan,
        warnings,
        agent_log: log,
    })
}
