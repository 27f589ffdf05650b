pub mod availability;
pub mod calendar;
pub mod catalog;
pub mod constants;
pub mod distribution;
pub mod engine;
pub mod selection;

pub use availability::{
    available_patterns, check_pattern_availability, patterns_for_meal_type,
    validate_prerequisites, PatternAvailability,
};
pub use calendar::{day_name_for, plan_name};
pub use catalog::{default_config, system_patterns};
pub use constants::*;
pub use distribution::{calculate_pattern_occurrences, normalize_distribution};
pub use engine::{generate_plan, WeeklyPlanningEngine};
pub use selection::{select_least_used, RepetitionLimit};
