pub mod agent;
pub mod audit;
pub mod cli;
pub mod error;
pub mod interface;
pub mod llm;
pub mod models;
pub mod planner;
pub mod state;

pub use error::{PlannerError, Result};
pub use models::{Ingredient, MealPattern, PlanningConfig, PlanningResult, WeeklyPlan};
pub use planner::generate_plan;
