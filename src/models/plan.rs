use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Ingredient, MealType};

/// One filled meal slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub meal_type: MealType,

    pub pattern_id: String,

    pub pattern_name: String,

    pub ingredient_ids: Vec<String>,

    /// Resolved copies of `ingredient_ids`, in the same order.
    pub ingredients: Vec<Ingredient>,
}

impl Meal {
    /// Replace the meal's ingredients, keeping ids and objects in sync.
    pub fn set_ingredients(&mut self, ingredients: Vec<Ingredient>) {
        self.ingredient_ids = ingredients.iter().map(|i| i.id.clone()).collect();
        self.ingredients = ingredients;
    }
}

/// All meals for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: NaiveDate,

    pub day_name: String,

    pub meals: Vec<Meal>,
}

impl DayPlan {
    pub fn meal(&self, meal_type: &str) -> Option<&Meal> {
        self.meals.iter().find(|m| m.meal_type.as_str() == meal_type)
    }

    pub fn meal_mut(&mut self, meal_type: &str) -> Option<&mut Meal> {
        self.meals
            .iter_mut()
            .find(|m| m.meal_type.as_str() == meal_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanData {
    pub days: Vec<DayPlan>,
}

/// A generated weekly plan in the shape persistence expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyPlan {
    pub name: String,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    pub plan_data: PlanData,
}

impl WeeklyPlan {
    pub fn days(&self) -> &[DayPlan] {
        &self.plan_data.days
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayPlan> {
        self.plan_data.days.iter().find(|d| d.date == date)
    }

    pub fn day_mut(&mut self, date: NaiveDate) -> Option<&mut DayPlan> {
        self.plan_data.days.iter_mut().find(|d| d.date == date)
    }

    /// Number of meals across all days.
    pub fn total_meals(&self) -> usize {
        self.plan_data.days.iter().map(|d| d.meals.len()).sum()
    }

    /// Iterate over every meal in day order.
    pub fn meals(&self) -> impl Iterator<Item = &Meal> {
        self.plan_data.days.iter().flat_map(|d| d.meals.iter())
    }
}

/// Per-run counters collected by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningStats {
    pub total_meals: u32,

    /// Pattern id -> meals built from it.
    pub patterns_used: BTreeMap<String, u32>,

    /// Ingredient id -> times selected.
    pub ingredients_used: BTreeMap<String, u32>,

    /// Patterns of a configured meal type that could not be used, first-seen order.
    pub unavailable_patterns: Vec<String>,
}

impl PlanningStats {
    pub fn pattern_count(&self, pattern_id: &str) -> u32 {
        self.patterns_used.get(pattern_id).copied().unwrap_or(0)
    }
}

/// Output of a single engine run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningResult {
    pub plan: WeeklyPlan,
    pub warnings: Vec<String>,
    pub stats: PlanningStats,
}
