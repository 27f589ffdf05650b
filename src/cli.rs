use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::planner::DEFAULT_AGENT_TIMEOUT_SECS;

/// Weekly meal planner: pattern-based plans with optional AI rule repair.
#[derive(Parser, Debug)]
#[command(name = "weekly_meal_planner")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub inputs: InputArgs,
}

/// Inputs shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Path to the ingredient library JSON file.
    #[arg(short, long, global = true, default_value = "ingredients.json")]
    pub ingredients: PathBuf,

    /// Path to a meal pattern JSON file (built-in catalog when omitted).
    #[arg(short, long, global = true)]
    pub patterns: Option<PathBuf>,

    /// Path to a planning configuration JSON file (defaults when omitted).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Random seed for reproducible plans.
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// First day of the plan (YYYY-MM-DD); overrides the configuration.
    #[arg(long, global = true)]
    pub start: Option<String>,

    /// Number of days to plan; overrides the configuration.
    #[arg(long, global = true)]
    pub days: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a plan with the pattern engine only.
    Plan {
        /// Write the plan as JSON to this file.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write one CSV row per meal to this file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Generate a plan and repair it against household rules with an LLM.
    Agent {
        /// Path to the rules JSON file.
        #[arg(short, long, default_value = "rules.json")]
        rules: PathBuf,

        /// Repair this saved plan instead of generating a new one.
        #[arg(long)]
        existing_plan: Option<PathBuf>,

        /// Wall-clock budget in seconds before falling back to the plain plan.
        #[arg(long, default_value_t = DEFAULT_AGENT_TIMEOUT_SECS)]
        timeout: u64,

        /// Choose rules to skip interactively before running.
        #[arg(long)]
        pick_rules: bool,

        /// Write the plan as JSON to this file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report whether the inputs can produce a plan.
    Check,
}

impl Default for Command {
    fn default() -> Self {
        Command::Plan {
            output: None,
            csv: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_plan() {
        let cli = Cli::parse_from(["weekly_meal_planner"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.inputs.ingredients, PathBuf::from("ingredients.json"));
        assert!(matches!(Command::default(), Command::Plan { .. }));
    }

    #[test]
    fn test_agent_with_global_options_after_subcommand() {
        let cli = Cli::parse_from([
            "weekly_meal_planner",
            "agent",
            "--rules",
            "r.json",
            "--seed",
            "7",
            "--days",
            "5",
        ]);
        assert_eq!(cli.inputs.seed, Some(7));
        assert_eq!(cli.inputs.days, Some(5));
        match cli.command {
            Some(Command::Agent { rules, timeout, .. }) => {
                assert_eq!(rules, PathBuf::from("r.json"));
                assert_eq!(timeout, DEFAULT_AGENT_TIMEOUT_SECS);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
