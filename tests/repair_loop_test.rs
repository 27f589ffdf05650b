use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;

use weekly_meal_planner::agent::{
    plan_with_timeout, run_repair_loop, CancellationFlag, FinalStatus, ModificationSuggester,
    ProgressEvent, ProgressFn, RepairRequest, RuleValidator, ServiceError, ValidationOutcome,
};
use weekly_meal_planner::error::PlannerError;
use weekly_meal_planner::generate_plan;
use weekly_meal_planner::models::{
    Ingredient, IngredientType, MealPattern, MealType, PatternDistribution, PlanModification,
    PlanningConfig, RequiredComponent, Rule, RuleViolation, SlotKey, ViolationType, WeeklyPlan,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
}

fn lunch() -> MealType {
    MealType::new("Lunch").unwrap()
}

fn ingredients() -> Vec<Ingredient> {
    let ty = IngredientType::new("Protein").unwrap();
    vec![
        Ingredient::new("fish", "Fish", ty.clone()),
        Ingredient::new("chicken", "Chicken", ty.clone()),
        Ingredient::new("beans", "Beans", ty),
    ]
}

fn patterns() -> Vec<MealPattern> {
    vec![MealPattern {
        id: "lunch-1".to_string(),
        meal_type: lunch(),
        name: "Protein plate".to_string(),
        description: String::new(),
        required_components: vec![RequiredComponent::new(
            IngredientType::new("Protein").unwrap(),
            1,
        )],
        is_system: false,
        display_order: 1,
    }]
}

fn config() -> PlanningConfig {
    let mut config = PlanningConfig::new(start(), 3, vec![lunch()]);
    config
        .distributions
        .insert(lunch(), vec![PatternDistribution::new("lunch-1", 100.0)]);
    config
}

fn rules() -> Vec<Rule> {
    vec![Rule {
        id: "r1".to_string(),
        rule_text: "No fish on Monday".to_string(),
        meal_type: None,
        is_active: true,
    }]
}

fn violation() -> RuleViolation {
    RuleViolation {
        rule_id: "r1".to_string(),
        rule_text: "No fish on Monday".to_string(),
        violation_type: ViolationType::Restriction,
        affected_meals: vec!["2024-03-11-Lunch".to_string()],
        explanation: "Fish is served on Monday".to_string(),
        suggested_fix: None,
    }
}

fn swap_to(ingredient_id: &str) -> PlanModification {
    PlanModification {
        day_date: "2024-03-11".to_string(),
        meal_type: "Lunch".to_string(),
        old_ingredient_ids: vec![],
        new_ingredient_ids: vec![ingredient_id.to_string()],
        reason: "swap".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Scripted collaborators
// ---------------------------------------------------------------------------

/// Returns scripted outcomes in order, then repeats the fallback.
struct ScriptedValidator {
    script: Mutex<VecDeque<Result<Vec<RuleViolation>, String>>>,
    fallback: Vec<RuleViolation>,
    calls: Mutex<usize>,
}

impl ScriptedValidator {
    fn new(script: Vec<Result<Vec<RuleViolation>, String>>, fallback: Vec<RuleViolation>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl RuleValidator for ScriptedValidator {
    async fn validate(
        &self,
        _plan: &WeeklyPlan,
        _rules: &[Rule],
    ) -> Result<ValidationOutcome, ServiceError> {
        *self.calls.lock().unwrap() += 1;
        let next = self.script.lock().unwrap().pop_front();
        match next.unwrap_or_else(|| Ok(self.fallback.clone())) {
            Ok(violations) => Ok(ValidationOutcome {
                is_valid: violations.is_empty(),
                violations,
            }),
            Err(message) => Err(ServiceError::InvalidResponse(message)),
        }
    }
}

struct ScriptedSuggester {
    script: Mutex<VecDeque<Result<Vec<PlanModification>, String>>>,
    fallback: Vec<PlanModification>,
    calls: Mutex<usize>,
}

impl ScriptedSuggester {
    fn new(
        script: Vec<Result<Vec<PlanModification>, String>>,
        fallback: Vec<PlanModification>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ModificationSuggester for ScriptedSuggester {
    async fn suggest(
        &self,
        _violations: &[RuleViolation],
        _plan: &WeeklyPlan,
        _ingredients: &[Ingredient],
        _patterns: &[MealPattern],
    ) -> Result<Vec<PlanModification>, ServiceError> {
        *self.calls.lock().unwrap() += 1;
        let next = self.script.lock().unwrap().pop_front();
        match next.unwrap_or_else(|| Ok(self.fallback.clone())) {
            Ok(modifications) => Ok(modifications),
            Err(message) => Err(ServiceError::Request(message)),
        }
    }
}

/// Flags every meal that contains fish. Depends only on the plan.
struct NoFishValidator;

#[async_trait]
impl RuleValidator for NoFishValidator {
    async fn validate(
        &self,
        plan: &WeeklyPlan,
        rules: &[Rule],
    ) -> Result<ValidationOutcome, ServiceError> {
        let Some(rule) = rules.first() else {
            return Ok(ValidationOutcome::valid());
        };
        let violations: Vec<RuleViolation> = plan
            .days()
            .iter()
            .flat_map(|day| {
                day.meals
                    .iter()
                    .filter(|meal| meal.ingredient_ids.iter().any(|id| id == "fish"))
                    .map(move |meal| RuleViolation {
                        rule_id: rule.id.clone(),
                        rule_text: rule.rule_text.clone(),
                        violation_type: ViolationType::Restriction,
                        affected_meals: vec![SlotKey::format(day.date, meal.meal_type.as_str())],
                        explanation: format!("Fish on {}", day.day_name),
                        suggested_fix: None,
                    })
            })
            .collect();
        Ok(ValidationOutcome {
            is_valid: violations.is_empty(),
            violations,
        })
    }
}

struct SlowValidator;

#[async_trait]
impl RuleValidator for SlowValidator {
    async fn validate(
        &self,
        _plan: &WeeklyPlan,
        _rules: &[Rule],
    ) -> Result<ValidationOutcome, ServiceError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(ValidationOutcome::valid())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_one_fix_then_clean_ends_with_success() {
    let (config, lib, pats, rules) = (config(), ingredients(), patterns(), rules());
    let validator = ScriptedValidator::new(vec![Ok(vec![violation()]), Ok(vec![])], vec![]);
    let suggester = ScriptedSuggester::new(vec![Ok(vec![swap_to("beans")])], vec![]);

    let request = RepairRequest::new(&config, &lib, &pats, &rules).with_seed(1);
    let result = run_repair_loop(request, &validator, &suggester, None)
        .await
        .unwrap();

    assert_eq!(result.status(), FinalStatus::Success);
    assert_eq!(result.agent_log.iteration_count, 1);
    assert_eq!(result.agent_log.modifications_applied.len(), 1);
    assert!(result.remaining_violations().is_empty());
    assert_eq!(validator.calls(), 2);
    assert_eq!(suggester.calls(), 1);

    let monday = result.plan.day(start()).unwrap();
    assert_eq!(monday.meal("Lunch").unwrap().ingredient_ids, vec!["beans"]);
    assert_eq!(result.stats.total_meals, 3);
}

#[tokio::test]
async fn test_suggester_failure_leaves_violations_with_warning() {
    let (config, lib, pats, rules) = (config(), ingredients(), patterns(), rules());
    let validator = ScriptedValidator::new(vec![], vec![violation()]);
    let suggester = ScriptedSuggester::new(vec![Err("quota exceeded".to_string())], vec![]);

    let request = RepairRequest::new(&config, &lib, &pats, &rules).with_seed(2);
    let result = run_repair_loop(request, &validator, &suggester, None)
        .await
        .unwrap();

    assert_eq!(result.status(), FinalStatus::MaxIterations);
    assert_eq!(result.remaining_violations().len(), 1);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.contains("Could not suggest modifications")));
    assert!(result.warnings.iter().any(|w| w == "1 rule violations found:"));
    let detail = "1. No fish on Monday: Fish is served on Monday (affects: 2024-03-11-Lunch)";
    assert!(result.warnings.iter().any(|w| w.starts_with(detail)));
}

#[tokio::test]
async fn test_validator_failure_fails_open() {
    let (config, lib, pats, rules) = (config(), ingredients(), patterns(), rules());
    let validator = ScriptedValidator::new(vec![Err("bad json".to_string())], vec![]);
    let suggester = ScriptedSuggester::new(vec![], vec![]);

    let request = RepairRequest::new(&config, &lib, &pats, &rules).with_seed(3);
    let result = run_repair_loop(request, &validator, &suggester, None)
        .await
        .unwrap();

    assert_eq!(result.status(), FinalStatus::Success);
    assert_eq!(result.agent_log.iteration_count, 0);
    assert!(result
        .warnings
        .contains(&"Could not validate rules with AI".to_string()));
    assert_eq!(suggester.calls(), 0);
}

#[tokio::test]
async fn test_persistent_violation_stops_after_max_iterations() {
    let (config, lib, pats, rules) = (config(), ingredients(), patterns(), rules());
    let validator = ScriptedValidator::new(vec![], vec![violation()]);
    let suggester = ScriptedSuggester::new(vec![], vec![swap_to("chicken")]);

    let events: Mutex<Vec<ProgressEvent>> = Mutex::new(Vec::new());
    let record = |event: &ProgressEvent| events.lock().unwrap().push(event.clone());
    let on_progress: ProgressFn<'_> = &record;

    let request = RepairRequest::new(&config, &lib, &pats, &rules).with_seed(4);
    let result = run_repair_loop(request, &validator, &suggester, Some(on_progress))
        .await
        .unwrap();

    assert_eq!(result.status(), FinalStatus::MaxIterations);
    assert_eq!(result.agent_log.iteration_count, 3);
    assert_eq!(result.agent_log.modifications_applied.len(), 3);
    // Three passes plus the closing re-validation.
    assert_eq!(validator.calls(), 4);
    assert_eq!(suggester.calls(), 3);

    let events = events.into_inner().unwrap();
    let fixing: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Fixing { iteration, .. } => Some(*iteration),
            _ => None,
        })
        .collect();
    assert_eq!(fixing, vec![1, 2, 3]);
    match events.last() {
        Some(ProgressEvent::PartialSuccess { conflicts }) => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].rule_text, "No fish on Monday");
            assert_eq!(conflicts[0].affected_meals[0].day, "Monday");
        }
        other => panic!("unexpected last event: {:?}", other),
    }
}

#[tokio::test]
async fn test_progress_sequence_for_single_repair() {
    let (config, lib, pats, rules) = (config(), ingredients(), patterns(), rules());
    let validator = ScriptedValidator::new(vec![Ok(vec![violation()])], vec![]);
    let suggester = ScriptedSuggester::new(vec![Ok(vec![swap_to("beans")])], vec![]);

    let events: Mutex<Vec<ProgressEvent>> = Mutex::new(Vec::new());
    let record = |event: &ProgressEvent| events.lock().unwrap().push(event.clone());
    let on_progress: ProgressFn<'_> = &record;

    let request = RepairRequest::new(&config, &lib, &pats, &rules).with_seed(5);
    run_repair_loop(request, &validator, &suggester, Some(on_progress))
        .await
        .unwrap();

    let events = events.into_inner().unwrap();
    assert_eq!(
        events,
        vec![
            ProgressEvent::Generating {
                message: "Generating your weekly plan...".to_string()
            },
            ProgressEvent::Validating {
                active_rules_count: 1
            },
            ProgressEvent::Fixing {
                changes_count: 1,
                iteration: 1
            },
            ProgressEvent::Validating {
                active_rules_count: 1
            },
            ProgressEvent::Success,
        ]
    );
}

#[tokio::test]
async fn test_existing_plan_is_adjusted_not_regenerated() {
    let (config, lib, pats, rules) = (config(), ingredients(), patterns(), rules());
    let mut rng = StdRng::seed_from_u64(6);
    let existing = generate_plan(&lib, &pats, &config, &mut rng).unwrap().plan;

    let validator = ScriptedValidator::new(vec![], vec![]);
    let suggester = ScriptedSuggester::new(vec![], vec![]);

    let events: Mutex<Vec<ProgressEvent>> = Mutex::new(Vec::new());
    let record = |event: &ProgressEvent| events.lock().unwrap().push(event.clone());
    let on_progress: ProgressFn<'_> = &record;

    let request =
        RepairRequest::new(&config, &lib, &pats, &rules).with_existing_plan(existing.clone());
    let result = run_repair_loop(request, &validator, &suggester, Some(on_progress))
        .await
        .unwrap();

    assert_eq!(result.plan, existing);
    assert_eq!(
        events.into_inner().unwrap()[0],
        ProgressEvent::Generating {
            message: "Adjusting existing plan...".to_string()
        }
    );
}

#[tokio::test]
async fn test_unknown_ingredient_modification_is_skipped() {
    let (config, lib, pats, rules) = (config(), ingredients(), patterns(), rules());
    let validator = ScriptedValidator::new(vec![Ok(vec![violation()])], vec![]);
    let suggester = ScriptedSuggester::new(vec![Ok(vec![swap_to("salmon")])], vec![]);

    let request = RepairRequest::new(&config, &lib, &pats, &rules).with_seed(7);
    let result = run_repair_loop(request, &validator, &suggester, None)
        .await
        .unwrap();

    assert!(result.agent_log.modifications_applied.is_empty());
    assert_eq!(result.agent_log.iteration_count, 1);
    let monday = result.plan.day(start()).unwrap();
    assert_ne!(monday.meal("Lunch").unwrap().ingredient_ids, vec!["salmon"]);
}

#[tokio::test]
async fn test_inactive_rules_skip_validator() {
    let (config, lib, pats) = (config(), ingredients(), patterns());
    let mut rules = rules();
    rules[0].is_active = false;
    let validator = ScriptedValidator::new(vec![], vec![violation()]);
    let suggester = ScriptedSuggester::new(vec![], vec![]);

    let request = RepairRequest::new(&config, &lib, &pats, &rules).with_seed(8);
    let result = run_repair_loop(request, &validator, &suggester, None)
        .await
        .unwrap();

    assert_eq!(result.status(), FinalStatus::Success);
    assert_eq!(validator.calls(), 0);
}

#[tokio::test]
async fn test_cancelled_run_returns_cancelled() {
    let (config, lib, pats, rules) = (config(), ingredients(), patterns(), rules());
    let validator = ScriptedValidator::new(vec![], vec![violation()]);
    let suggester = ScriptedSuggester::new(vec![], vec![]);
    let flag = CancellationFlag::new();
    flag.cancel();

    let events: Mutex<Vec<ProgressEvent>> = Mutex::new(Vec::new());
    let record = |event: &ProgressEvent| events.lock().unwrap().push(event.clone());
    let on_progress: ProgressFn<'_> = &record;

    let request = RepairRequest::new(&config, &lib, &pats, &rules)
        .with_seed(9)
        .with_cancellation(flag);
    let result = run_repair_loop(request, &validator, &suggester, Some(on_progress)).await;

    assert!(matches!(result, Err(PlannerError::Cancelled)));
    assert_eq!(validator.calls(), 0);
    assert!(matches!(
        events.into_inner().unwrap().last(),
        Some(ProgressEvent::Error { .. })
    ));
}

#[tokio::test]
async fn test_engine_failure_is_an_error() {
    let (lib, pats, rules) = (ingredients(), patterns(), rules());
    let mut config = config();
    config.num_days = 0;
    let validator = ScriptedValidator::new(vec![], vec![]);
    let suggester = ScriptedSuggester::new(vec![], vec![]);

    let request = RepairRequest::new(&config, &lib, &pats, &rules);
    let result = run_repair_loop(request, &validator, &suggester, None).await;
    assert!(matches!(result, Err(PlannerError::NoPlan(_))));
}

#[tokio::test]
async fn test_timeout_falls_back_to_engine_plan() {
    let (config, lib, pats, rules) = (config(), ingredients(), patterns(), rules());
    let suggester = ScriptedSuggester::new(vec![], vec![]);

    let request = RepairRequest::new(&config, &lib, &pats, &rules).with_seed(10);
    let result = plan_with_timeout(
        request,
        &SlowValidator,
        &suggester,
        None,
        Duration::from_millis(50),
    )
    .await
    .unwrap();

    assert_eq!(result.status(), FinalStatus::Error);
    assert!(result.agent_log.error_message.is_some());
    assert_eq!(result.plan.days().len(), 3);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.starts_with("AI rule checking unavailable")));
}

#[tokio::test]
async fn test_timeout_wrapper_passes_through_completed_run() {
    let (config, lib, pats, rules) = (config(), ingredients(), patterns(), rules());
    let validator = ScriptedValidator::new(vec![], vec![]);
    let suggester = ScriptedSuggester::new(vec![], vec![]);

    let request = RepairRequest::new(&config, &lib, &pats, &rules).with_seed(11);
    let result = plan_with_timeout(
        request,
        &validator,
        &suggester,
        None,
        Duration::from_secs(5),
    )
    .await
    .unwrap();

    assert_eq!(result.status(), FinalStatus::Success);
    assert!(result.agent_log.steps().any(|s| s == "finalize"));
}

#[tokio::test]
async fn test_validating_unchanged_plan_twice_gives_same_violations() {
    let (config, lib, pats, rules) = (config(), ingredients(), patterns(), rules());
    let mut plan = generate_plan(&lib, &pats, &config, &mut StdRng::seed_from_u64(12))
        .unwrap()
        .plan;
    // Make sure there is something to report.
    plan.day_mut(start())
        .unwrap()
        .meal_mut("Lunch")
        .unwrap()
        .set_ingredients(vec![lib[0].clone()]);

    let first = NoFishValidator.validate(&plan, &rules).await.unwrap();
    let second = NoFishValidator.validate(&plan, &rules).await.unwrap();

    assert!(!first.violations.is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_repair_with_plan_derived_validator_clears_fish() {
    let (config, lib, pats, rules) = (config(), ingredients(), patterns(), rules());
    let mut existing = generate_plan(&lib, &pats, &config, &mut StdRng::seed_from_u64(13))
        .unwrap()
        .plan;
    existing
        .day_mut(start())
        .unwrap()
        .meal_mut("Lunch")
        .unwrap()
        .set_ingredients(vec![lib[0].clone()]);

    // Replace fish wherever it appears in the three-day horizon.
    let swaps: Vec<PlanModification> = existing
        .days()
        .iter()
        .map(|day| PlanModification {
            day_date: day.date.format("%Y-%m-%d").to_string(),
            ..swap_to("beans")
        })
        .collect();
    let suggester = ScriptedSuggester::new(vec![], swaps);

    let request = RepairRequest::new(&config, &lib, &pats, &rules).with_existing_plan(existing);
    let result = run_repair_loop(request, &NoFishValidator, &suggester, None)
        .await
        .unwrap();

    assert_eq!(result.status(), FinalStatus::Success);
    assert_eq!(result.agent_log.iteration_count, 1);
    let again = NoFishValidator.validate(&result.plan, &rules).await.unwrap();
    assert!(again.violations.is_empty());
}
