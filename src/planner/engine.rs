//! Pattern-based weekly plan generation.
//!
//! For every day and configured meal type the engine picks the available
//! pattern that is furthest behind its target share, then fills each of the
//! pattern's components with the least used ingredients of that type.

use std::collections::HashSet;

use chrono::NaiveDate;
use rand::Rng;

use crate::error::Result;
use crate::models::{
    DayPlan, Ingredient, Meal, MealPattern, MealType, PlanData, PlanningConfig, PlanningResult,
    PlanningStats, WeeklyPlan,
};
use crate::planner::availability::patterns_for_meal_type;
use crate::planner::calendar::{add_days, day_name_for, plan_name};
use crate::planner::distribution::{calculate_pattern_occurrences, normalize_distribution};
use crate::planner::selection::{select_least_used, RepetitionLimit};
use crate::state::{Inventory, UsageCounter};

/// Mutable state of a single run. Dropped when the run ends.
#[derive(Default)]
struct RunState {
    usage: UsageCounter,
    stats: PlanningStats,
    warnings: Vec<String>,
}

impl RunState {
    fn mark_unavailable(&mut self, pattern_id: &str) {
        if !self.stats.unavailable_patterns.iter().any(|p| p == pattern_id) {
            self.stats.unavailable_patterns.push(pattern_id.to_string());
        }
    }
}

/// Plans a horizon from a fixed inventory, catalog and configuration.
///
/// The engine only borrows its inputs; each call to [`generate`](Self::generate)
/// starts from zero usage.
pub struct WeeklyPlanningEngine<'a> {
    config: &'a PlanningConfig,
    patterns: &'a [MealPattern],
    inventory: Inventory<'a>,
}

impl<'a> WeeklyPlanningEngine<'a> {
    pub fn new(
        ingredients: &'a [Ingredient],
        patterns: &'a [MealPattern],
        config: &'a PlanningConfig,
    ) -> Self {
        Self {
            config,
            patterns,
            inventory: Inventory::new(ingredients),
        }
    }

    /// Generate a plan.
    ///
    /// Fails only when the configuration or a pattern is malformed. Slots that
    /// cannot be filled are skipped and reported in `warnings`.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<PlanningResult> {
        for pattern in self.patterns {
            pattern.validate()?;
        }
        let config_warnings = self.config.validate(self.patterns)?;
        for warning in &config_warnings {
            tracing::warn!("{}", warning);
        }

        let mut state = RunState {
            warnings: config_warnings,
            ..RunState::default()
        };

        let start = self.config.start_date;
        let mut days = Vec::with_capacity(self.config.num_days as usize);
        for offset in 0..self.config.num_days {
            let date = add_days(start, offset)?;
            days.push(self.generate_day(date, &mut state, rng));
        }
        let end = add_days(start, self.config.num_days.saturating_sub(1))?;

        tracing::info!(
            "Generated plan {}..{}: {} meals, {} warnings",
            start,
            end,
            state.stats.total_meals,
            state.warnings.len()
        );

        Ok(PlanningResult {
            plan: WeeklyPlan {
                name: plan_name(start, self.config.locale),
                start_date: start,
                end_date: end,
                plan_data: PlanData { days },
            },
            warnings: state.warnings,
            stats: state.stats,
        })
    }

    fn generate_day<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        state: &mut RunState,
        rng: &mut R,
    ) -> DayPlan {
        let day_name = day_name_for(date, self.config.locale);
        let meals = self
            .config
            .meal_types
            .iter()
            .filter_map(|meal_type| self.generate_meal(meal_type, day_name, state, rng))
            .collect();

        DayPlan {
            date,
            day_name: day_name.to_string(),
            meals,
        }
    }

    fn generate_meal<R: Rng + ?Sized>(
        &self,
        meal_type: &MealType,
        day_name: &str,
        state: &mut RunState,
        rng: &mut R,
    ) -> Option<Meal> {
        let counts = self.inventory.type_counts();
        let checked = patterns_for_meal_type(meal_type, self.patterns, &counts);

        let mut available: Vec<&MealPattern> = Vec::new();
        for entry in &checked {
            if entry.available {
                available.push(entry.pattern);
            } else {
                state.mark_unavailable(&entry.pattern.id);
            }
        }

        if available.is_empty() {
            let warning = format!("No patterns available for {} on {}", meal_type, day_name);
            tracing::debug!("{}", warning);
            state.warnings.push(warning);
            return None;
        }

        let pattern = self.choose_pattern(meal_type, &available, &state.stats);
        Some(self.build_meal(meal_type, pattern, day_name, state, rng))
    }

    /// Available pattern with the largest gap between target and actual use.
    ///
    /// Targets are computed over the full horizon on every call. The first
    /// pattern in display order wins ties.
    fn choose_pattern<'p>(
        &self,
        meal_type: &MealType,
        available: &[&'p MealPattern],
        stats: &PlanningStats,
    ) -> &'p MealPattern {
        let ids: HashSet<&str> = available.iter().map(|p| p.id.as_str()).collect();
        let normalized = normalize_distribution(self.config.distribution_for(meal_type), &ids);

        let first = available[0];
        if normalized.is_empty() {
            return first;
        }

        let targets = calculate_pattern_occurrences(&normalized, self.config.num_days);

        let mut best = first;
        let mut best_deficit = i64::MIN;
        for pattern in available {
            let target = targets.get(&pattern.id).copied().unwrap_or(0);
            let deficit = target - i64::from(stats.pattern_count(&pattern.id));
            if deficit > best_deficit {
                best_deficit = deficit;
                best = pattern;
            }
        }
        best
    }

    fn build_meal<R: Rng + ?Sized>(
        &self,
        meal_type: &MealType,
        pattern: &MealPattern,
        day_name: &str,
        state: &mut RunState,
        rng: &mut R,
    ) -> Meal {
        let limit = RepetitionLimit {
            enabled: self.config.avoid_repeating_ingredients,
            max_per_horizon: self.config.max_repetitions_per_week,
        };

        let mut selected: Vec<&Ingredient> = Vec::new();
        for component in &pattern.required_components {
            let candidates = self.inventory.of_type(&component.ingredient_type);
            if candidates.is_empty() {
                state.warnings.push(format!(
                    "No ingredients of type \"{}\" for {} on {}",
                    component.ingredient_type, meal_type, day_name
                ));
                continue;
            }
            selected.extend(select_least_used(
                candidates,
                component.quantity,
                &state.usage,
                limit,
                rng,
            ));
        }

        // Counters move only after the whole meal is chosen, so two components
        // of the same type see the same usage snapshot.
        for ingredient in &selected {
            state.usage.record(&ingredient.id);
            *state
                .stats
                .ingredients_used
                .entry(ingredient.id.clone())
                .or_insert(0) += 1;
        }
        *state
            .stats
            .patterns_used
            .entry(pattern.id.clone())
            .or_insert(0) += 1;
        state.stats.total_meals += 1;

        let ingredients: Vec<Ingredient> = selected.into_iter().cloned().collect();
        Meal {
            meal_type: meal_type.clone(),
            pattern_id: pattern.id.clone(),
            pattern_name: pattern.name.clone(),
            ingredient_ids: ingredients.iter().map(|i| i.id.clone()).collect(),
            ingredients,
        }
    }
}

/// Generate a plan in one call.
pub fn generate_plan<R: Rng + ?Sized>(
    ingredients: &[Ingredient],
    patterns: &[MealPattern],
    config: &PlanningConfig,
    rng: &mut R,
) -> Result<PlanningResult> {
    WeeklyPlanningEngine::new(ingredients, patterns, config).generate(rng)
}
