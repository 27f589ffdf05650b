pub mod config;
pub mod ingredient;
pub mod pattern;
pub mod plan;
pub mod rule;

pub use config::{Locale, PatternDistribution, PlanningConfig};
pub use ingredient::{Ingredient, IngredientType};
pub use pattern::{MealPattern, MealType, RequiredComponent};
pub use plan::{DayPlan, Meal, PlanData, PlanningResult, PlanningStats, WeeklyPlan};
pub use rule::{PlanModification, Rule, RuleViolation, SlotKey, ViolationType};
