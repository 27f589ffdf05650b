pub mod prompts;
pub mod render;

pub use prompts::{
    confirm_overwrite, find_rules, prompt_partial_plan_choice, prompt_rule_toggles,
    prompt_yes_no, PartialPlanChoice,
};
pub use render::{
    display_agent_summary, display_availability, display_conflicts, display_stats,
    display_warnings, display_weekly_plan,
};
