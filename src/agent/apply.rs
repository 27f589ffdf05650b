use chrono::NaiveDate;

use crate::models::{PlanModification, WeeklyPlan};
use crate::state::Inventory;

/// Apply substitutions to a copy of `plan`.
///
/// A modification is skipped when its day or meal is missing from the plan,
/// or when any of its new ingredient ids is unknown. Returns the updated copy
/// and the modifications that were actually applied.
pub fn apply_modifications(
    plan: &WeeklyPlan,
    modifications: &[PlanModification],
    inventory: &Inventory<'_>,
) -> (WeeklyPlan, Vec<PlanModification>) {
    let mut updated = plan.clone();
    let mut applied = Vec::new();

    for modification in modifications {
        if apply_one(&mut updated, modification, inventory) {
            applied.push(modification.clone());
        }
    }

    (updated, applied)
}

fn apply_one(
    plan: &mut WeeklyPlan,
    modification: &PlanModification,
    inventory: &Inventory<'_>,
) -> bool {
    let Ok(date) = NaiveDate::parse_from_str(modification.day_date.trim(), "%Y-%m-%d") else {
        tracing::warn!("Skipping modification with bad date '{}'", modification.day_date);
        return false;
    };

    let Some(day) = plan.day_mut(date) else {
        tracing::warn!("Skipping modification: day {} not in plan", date);
        return false;
    };

    let Some(meal) = day.meal_mut(&modification.meal_type) else {
        tracing::warn!(
            "Skipping modification: no {} meal on {}",
            modification.meal_type,
            date
        );
        return false;
    };

    let Some(ingredients) = inventory.resolve_all(&modification.new_ingredient_ids) else {
        tracing::warn!(
            "Skipping modification for {} {}: unknown ingredient id",
            date,
            modification.meal_type
        );
        return false;
    };

    tracing::info!(
        "Applied modification: {} {} -> {}",
        date,
        modification.meal_type,
        ingredients
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    meal.set_ingredients(ingredients);
    true
}
