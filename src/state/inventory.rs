use std::collections::HashMap;

use crate::models::{Ingredient, IngredientType};

/// Read-only view over the ingredient library for one planning run.
///
/// Keeps the caller's order; lookups by type return ingredients in that order.
pub struct Inventory<'a> {
    ingredients: &'a [Ingredient],
    by_type: HashMap<&'a IngredientType, Vec<&'a Ingredient>>,
    by_id: HashMap<&'a str, &'a Ingredient>,
}

impl<'a> Inventory<'a> {
    pub fn new(ingredients: &'a [Ingredient]) -> Self {
        let mut by_type: HashMap<&IngredientType, Vec<&Ingredient>> = HashMap::new();
        let mut by_id = HashMap::new();
        for ingredient in ingredients {
            by_type
                .entry(&ingredient.ingredient_type)
                .or_default()
                .push(ingredient);
            by_id.insert(ingredient.id.as_str(), ingredient);
        }
        Self {
            ingredients,
            by_type,
            by_id,
        }
    }

    /// Get an ingredient by id.
    pub fn get(&self, id: &str) -> Option<&'a Ingredient> {
        self.by_id.get(id).copied()
    }

    /// Resolve every id, or `None` if any of them is unknown.
    pub fn resolve_all(&self, ids: &[String]) -> Option<Vec<Ingredient>> {
        ids.iter()
            .map(|id| self.get(id).cloned())
            .collect::<Option<Vec<_>>>()
    }

    /// Ingredients of one type, in library order.
    pub fn of_type(&self, ingredient_type: &IngredientType) -> &[&'a Ingredient] {
        self.by_type
            .get(ingredient_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Count ingredients per type over the full library.
    pub fn type_counts(&self) -> HashMap<IngredientType, usize> {
        count_ingredients_by_type(self.ingredients)
    }
}

/// Count ingredients per type.
pub fn count_ingredients_by_type(ingredients: &[Ingredient]) -> HashMap<IngredientType, usize> {
    let mut counts = HashMap::new();
    for ingredient in ingredients {
        *counts.entry(ingredient.ingredient_type.clone()).or_insert(0) += 1;
    }
    counts
}
