//! Built-in pattern catalog.
//!
//! Pure data: the planner treats these exactly like user-defined patterns.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{
    IngredientType, MealPattern, MealType, PatternDistribution, PlanningConfig,
    RequiredComponent,
};
use crate::planner::constants::{DEFAULT_MAX_REPETITIONS, DEFAULT_NUM_DAYS};

pub const BREAKFAST: &str = "Breakfast";
pub const LUNCH: &str = "Lunch";
pub const SNACK: &str = "Snack";

/// (id, meal type, name, description, display order, components)
type PatternRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    i32,
    &'static [(&'static str, u32)],
);

const SYSTEM_PATTERNS: &[PatternRow] = &[
    (
        "breakfast-1",
        BREAKFAST,
        "Traditional with fruit",
        "Protein + Carb + Fruit",
        1,
        &[("Breakfast Protein", 1), ("Breakfast Carb", 1), ("Fruit", 1)],
    ),
    (
        "breakfast-2",
        BREAKFAST,
        "Composed",
        "Single composed dish",
        2,
        &[("Breakfast Composed", 1)],
    ),
    (
        "lunch-1",
        LUNCH,
        "Traditional",
        "Protein + Carb + Vegetable",
        1,
        &[("Lunch Protein", 1), ("Lunch Carb", 1), ("Vegetable", 1)],
    ),
    (
        "lunch-2",
        LUNCH,
        "Composed with vegetable",
        "Composed dish with a side",
        2,
        &[("Lunch Composed", 1), ("Vegetable", 1)],
    ),
    (
        "lunch-3",
        LUNCH,
        "Complete",
        "Single complete dish",
        3,
        &[("Lunch Complete", 1)],
    ),
    (
        "snack-1",
        SNACK,
        "Traditional",
        "Carb + Drink + Fruit",
        1,
        &[("Snack Carb", 1), ("Drink", 1), ("Fruit", 1)],
    ),
    (
        "snack-2",
        SNACK,
        "Composed with fruit",
        "Composed dish with fruit",
        2,
        &[("Snack Composed", 1), ("Fruit", 1)],
    ),
];

const DEFAULT_DISTRIBUTIONS: &[(&str, &[(&str, f64)])] = &[
    (BREAKFAST, &[("breakfast-1", 70.0), ("breakfast-2", 30.0)]),
    (
        LUNCH,
        &[("lunch-1", 60.0), ("lunch-2", 30.0), ("lunch-3", 10.0)],
    ),
    (SNACK, &[("snack-1", 60.0), ("snack-2", 40.0)]),
];

/// The built-in patterns.
pub fn system_patterns() -> Result<Vec<MealPattern>> {
    SYSTEM_PATTERNS
        .iter()
        .map(|(id, meal_type, name, description, order, components)| {
            let required_components = components
                .iter()
                .map(|(t, q)| Ok(RequiredComponent::new(IngredientType::new(*t)?, *q)))
                .collect::<Result<Vec<_>>>()?;
            Ok(MealPattern {
                id: id.to_string(),
                meal_type: MealType::new(*meal_type)?,
                name: name.to_string(),
                description: description.to_string(),
                required_components,
                is_system: true,
                display_order: *order,
            })
        })
        .collect()
}

/// Default target distributions for the built-in patterns.
pub fn default_distributions() -> Result<BTreeMap<MealType, Vec<PatternDistribution>>> {
    let mut out = BTreeMap::new();
    for (meal_type, entries) in DEFAULT_DISTRIBUTIONS {
        let list = entries
            .iter()
            .map(|(id, pct)| PatternDistribution::new(id, *pct))
            .collect();
        out.insert(MealType::new(*meal_type)?, list);
    }
    Ok(out)
}

/// Full default configuration starting at `start_date`.
pub fn default_config(start_date: NaiveDate) -> Result<PlanningConfig> {
    let meal_types = [BREAKFAST, LUNCH, SNACK]
        .iter()
        .map(|m| MealType::new(*m))
        .collect::<Result<Vec<_>>>()?;
    let mut config = PlanningConfig::new(start_date, DEFAULT_NUM_DAYS, meal_types);
    config.distributions = default_distributions()?;
    config.avoid_repeating_ingredients = true;
    config.max_repetitions_per_week = DEFAULT_MAX_REPETITIONS;
    Ok(config)
}
