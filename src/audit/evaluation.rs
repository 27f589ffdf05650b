use std::collections::{BTreeMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::models::{Ingredient, MealPattern, MealType, PlanningConfig};
use crate::planner::{available_patterns, generate_plan, normalize_distribution};
use crate::state::count_ingredients_by_type;

/// Metrics of one engine run.
#[derive(Debug, Clone)]
pub struct RunMetrics {
    pub seed: u64,
    pub total_meals: u32,
    pub warnings: usize,
    /// Highest number of times any single ingredient was picked.
    pub max_ingredient_usage: u32,
    /// Some ingredient went over the repetition cap (only when the cap is on).
    pub bound_exceeded: bool,
}

/// Target versus realized share of one pattern within its meal type.
#[derive(Debug, Clone)]
pub struct PatternShare {
    pub meal_type: MealType,
    pub pattern_id: String,
    pub target_pct: f64,
    pub realized_pct: f64,
}

impl PatternShare {
    pub fn deviation(&self) -> f64 {
        self.realized_pct - self.target_pct
    }
}

/// Aggregate over all runs.
#[derive(Debug, Clone)]
pub struct AuditReport {
    pub runs: Vec<RunMetrics>,
    pub shares: Vec<PatternShare>,
}

impl AuditReport {
    pub fn runs_over_bound(&self) -> usize {
        self.runs.iter().filter(|r| r.bound_exceeded).count()
    }

    pub fn avg_max_usage(&self) -> f64 {
        if self.runs.is_empty() {
            return 0.0;
        }
        let total: u32 = self.runs.iter().map(|r| r.max_ingredient_usage).sum();
        total as f64 / self.runs.len() as f64
    }

    /// Largest absolute gap between target and realized share.
    pub fn worst_deviation(&self) -> Option<&PatternShare> {
        self.shares.iter().max_by(|a, b| {
            a.deviation()
                .abs()
                .partial_cmp(&b.deviation().abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

/// Run the engine `runs` times with seeds drawn from `seed`.
pub fn run_audit(
    ingredients: &[Ingredient],
    patterns: &[MealPattern],
    config: &PlanningConfig,
    runs: usize,
    seed: u64,
) -> Result<AuditReport> {
    let mut master = StdRng::seed_from_u64(seed);
    let mut metrics = Vec::with_capacity(runs);
    // (meal type, pattern id) -> meals across every run
    let mut pattern_meals: BTreeMap<(MealType, String), u64> = BTreeMap::new();
    let mut meal_type_totals: BTreeMap<MealType, u64> = BTreeMap::new();

    for _ in 0..runs {
        let run_seed: u64 = master.r#gen();
        let mut rng = StdRng::seed_from_u64(run_seed);
        let result = generate_plan(ingredients, patterns, config, &mut rng)?;

        for meal in result.plan.meals() {
            *pattern_meals
                .entry((meal.meal_type.clone(), meal.pattern_id.clone()))
                .or_insert(0) += 1;
            *meal_type_totals.entry(meal.meal_type.clone()).or_insert(0) += 1;
        }

        let max_usage = result.stats.ingredients_used.values().copied().max().unwrap_or(0);
        metrics.push(RunMetrics {
            seed: run_seed,
            total_meals: result.stats.total_meals,
            warnings: result.warnings.len(),
            max_ingredient_usage: max_usage,
            bound_exceeded: config.avoid_repeating_ingredients
                && max_usage > config.max_repetitions_per_week,
        });
    }

    let counts = count_ingredients_by_type(ingredients);
    let mut shares = Vec::new();
    for meal_type in &config.meal_types {
        let available = available_patterns(meal_type, patterns, &counts);
        let ids: HashSet<&str> = available.iter().map(|p| p.id.as_str()).collect();
        let targets = normalize_distribution(config.distribution_for(meal_type), &ids);
        let total = meal_type_totals.get(meal_type).copied().unwrap_or(0);

        for pattern in &available {
            let target_pct = targets
                .iter()
                .find(|t| t.pattern_id == pattern.id)
                .map(|t| t.percentage)
                .unwrap_or(0.0);
            let used = pattern_meals
                .get(&(meal_type.clone(), pattern.id.clone()))
                .copied()
                .unwrap_or(0);
            let realized_pct = if total > 0 {
                used as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            shares.push(PatternShare {
                meal_type: meal_type.clone(),
                pattern_id: pattern.id.clone(),
                target_pct,
                realized_pct,
            });
        }
    }

    Ok(AuditReport {
        runs: metrics,
        shares,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IngredientType;
    use crate::planner::{default_config, system_patterns};
    use assert_float_eq::assert_float_absolute_eq;
    use chrono::NaiveDate;

    fn library(per_type: usize) -> Vec<Ingredient> {
        let mut lib = Vec::new();
        for pattern in system_patterns().unwrap() {
            for component in &pattern.required_components {
                for i in 0..per_type {
                    let id = format!("{}-{}", component.ingredient_type, i);
                    if lib.iter().all(|x: &Ingredient| x.id != id) {
                        lib.push(Ingredient::new(&id, &id, component.ingredient_type.clone()));
                    }
                }
            }
        }
        lib
    }

    fn config() -> PlanningConfig {
        default_config(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()).unwrap()
    }

    #[test]
    fn test_realized_shares_match_targets_over_full_week() {
        let report = run_audit(&library(5), &system_patterns().unwrap(), &config(), 10, 1).unwrap();
        assert_eq!(report.runs.len(), 10);

        let lunch = MealType::new("Lunch").unwrap();
        let lunch_shares: Vec<&PatternShare> =
            report.shares.iter().filter(|s| s.meal_type == lunch).collect();
        assert_eq!(lunch_shares.len(), 3);
        let realized: f64 = lunch_shares.iter().map(|s| s.realized_pct).sum();
        assert_float_absolute_eq!(realized, 100.0, 1e-9);

        // 4/7 of lunches follow lunch-1 in every run.
        let first = lunch_shares.iter().find(|s| s.pattern_id == "lunch-1").unwrap();
        assert_float_absolute_eq!(first.target_pct, 60.0, 1e-9);
        assert_float_absolute_eq!(first.realized_pct, 400.0 / 7.0, 1e-9);
    }

    #[test]
    fn test_bound_exceeded_counted_with_small_library() {
        let report = run_audit(&library(1), &system_patterns().unwrap(), &config(), 3, 2).unwrap();
        assert_eq!(report.runs_over_bound(), 3);
        assert!(report.avg_max_usage() > 2.0);

        let report = run_audit(&library(8), &system_patterns().unwrap(), &config(), 3, 2).unwrap();
        assert_eq!(report.runs_over_bound(), 0);
    }

    #[test]
    fn test_same_seed_same_report() {
        let lib = library(3);
        let patterns = system_patterns().unwrap();
        let a = run_audit(&lib, &patterns, &config(), 4, 99).unwrap();
        let b = run_audit(&lib, &patterns, &config(), 4, 99).unwrap();
        let seeds_a: Vec<u64> = a.runs.iter().map(|r| r.seed).collect();
        let seeds_b: Vec<u64> = b.runs.iter().map(|r| r.seed).collect();
        assert_eq!(seeds_a, seeds_b);
        assert_eq!(a.avg_max_usage(), b.avg_max_usage());
    }
}
