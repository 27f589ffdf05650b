mod inventory;
mod persistence;
mod usage;

pub use inventory::{count_ingredients_by_type, Inventory};
pub use persistence::{
    load_config, load_ingredients, load_patterns, load_plan, load_rules, save_plan,
    write_plan_csv,
};
pub use usage::UsageCounter;
