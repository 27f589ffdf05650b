use std::collections::HashMap;

use crate::models::{Ingredient, IngredientType, MealPattern, MealType};
use crate::state::count_ingredients_by_type;

/// Whether a pattern can be built from the current library.
#[derive(Debug, Clone)]
pub struct PatternAvailability<'a> {
    pub pattern: &'a MealPattern,
    pub available: bool,
    pub missing_types: Vec<IngredientType>,
    /// Type -> ingredients of that type in the library.
    pub available_count: HashMap<IngredientType, usize>,
}

/// Check one pattern against per-type ingredient counts.
///
/// Available iff every required type has at least one ingredient. Quantities
/// are not compared; a short supply shows up later as an under-filled meal.
pub fn check_pattern_availability<'a>(
    pattern: &'a MealPattern,
    counts: &HashMap<IngredientType, usize>,
) -> PatternAvailability<'a> {
    let mut missing_types = Vec::new();
    let mut available_count = HashMap::new();

    for component in &pattern.required_components {
        let count = counts.get(&component.ingredient_type).copied().unwrap_or(0);
        available_count.insert(component.ingredient_type.clone(), count);
        if count == 0 && !missing_types.contains(&component.ingredient_type) {
            missing_types.push(component.ingredient_type.clone());
        }
    }

    PatternAvailability {
        pattern,
        available: missing_types.is_empty(),
        missing_types,
        available_count,
    }
}

/// Availability of every pattern for a meal type, sorted by display order.
pub fn patterns_for_meal_type<'a>(
    meal_type: &MealType,
    patterns: &'a [MealPattern],
    counts: &HashMap<IngredientType, usize>,
) -> Vec<PatternAvailability<'a>> {
    let mut result: Vec<PatternAvailability> = patterns
        .iter()
        .filter(|p| &p.meal_type == meal_type)
        .map(|p| check_pattern_availability(p, counts))
        .collect();
    result.sort_by_key(|a| a.pattern.display_order);
    result
}

/// Only the satisfiable patterns for a meal type, in display order.
pub fn available_patterns<'a>(
    meal_type: &MealType,
    patterns: &'a [MealPattern],
    counts: &HashMap<IngredientType, usize>,
) -> Vec<&'a MealPattern> {
    patterns_for_meal_type(meal_type, patterns, counts)
        .into_iter()
        .filter(|a| a.available)
        .map(|a| a.pattern)
        .collect()
}

/// Problems that make planning impossible or degraded, one message each.
///
/// Empty means every configured meal type has at least one satisfiable pattern.
pub fn validate_prerequisites(
    ingredients: &[Ingredient],
    patterns: &[MealPattern],
    meal_types: &[MealType],
) -> Vec<String> {
    let mut errors = Vec::new();

    if ingredients.is_empty() {
        errors.push("No ingredients available".to_string());
    }
    if patterns.is_empty() {
        errors.push("No meal patterns configured".to_string());
    }

    let counts = count_ingredients_by_type(ingredients);
    for meal_type in meal_types {
        if available_patterns(meal_type, patterns, &counts).is_empty() {
            errors.push(format!(
                "No patterns available for {}. Check that ingredients exist for every required type.",
                meal_type
            ));
        }
    }

    errors
}
