use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use weekly_meal_planner::agent::{
    map_violations_to_conflicts, plan_with_timeout, FinalStatus, ProgressEvent, ProgressFn,
    RepairRequest,
};
use weekly_meal_planner::cli::{Cli, Command, InputArgs};
use weekly_meal_planner::error::Result;
use weekly_meal_planner::interface::{
    confirm_overwrite, display_agent_summary, display_availability, display_conflicts,
    display_stats, display_warnings, display_weekly_plan, prompt_partial_plan_choice,
    prompt_rule_toggles, PartialPlanChoice,
};
use weekly_meal_planner::llm::{
    create_provider_from_env, LlmModificationSuggester, LlmProvider, LlmRuleValidator,
};
use weekly_meal_planner::models::{Ingredient, MealPattern, MealType, PlanningConfig, WeeklyPlan};
use weekly_meal_planner::planner::calendar::parse_date;
use weekly_meal_planner::planner::{
    default_config, generate_plan, patterns_for_meal_type, system_patterns, validate_prerequisites,
    DEFAULT_NUM_DAYS,
};
use weekly_meal_planner::state::{
    count_ingredients_by_type, load_config, load_ingredients, load_patterns, load_plan, load_rules,
    save_plan, write_plan_csv,
};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or_default();

    match command {
        Command::Plan { output, csv } => cmd_plan(&cli.inputs, output.as_deref(), csv.as_deref()),
        Command::Agent {
            rules,
            existing_plan,
            timeout,
            pick_rules,
            output,
        } => {
            cmd_agent(
                &cli.inputs,
                &rules,
                existing_plan.as_deref(),
                Duration::from_secs(timeout),
                pick_rules,
                output.as_deref(),
            )
            .await
        }
        Command::Check => cmd_check(&cli.inputs),
    }
}

/// Everything a planning run reads from disk.
struct Inputs {
    ingredients: Vec<Ingredient>,
    patterns: Vec<MealPattern>,
    config: PlanningConfig,
}

fn load_inputs(args: &InputArgs) -> Result<Inputs> {
    let ingredients = load_ingredients(&args.ingredients)?;
    println!("Loaded {} ingredients", ingredients.len());

    let patterns = match &args.patterns {
        Some(path) => load_patterns(path)?,
        None => system_patterns()?,
    };

    let today = chrono::Local::now().date_naive();
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None if args.patterns.is_none() => default_config(today)?,
        None => config_from_patterns(today, &patterns),
    };

    if let Some(start) = &args.start {
        config.start_date = parse_date(start)?;
    }
    if let Some(days) = args.days {
        config.num_days = days;
    }

    Ok(Inputs {
        ingredients,
        patterns,
        config,
    })
}

/// Meal types in first-seen order, no distributions.
fn config_from_patterns(start: chrono::NaiveDate, patterns: &[MealPattern]) -> PlanningConfig {
    let mut meal_types: Vec<MealType> = Vec::new();
    for pattern in patterns {
        if !meal_types.contains(&pattern.meal_type) {
            meal_types.push(pattern.meal_type.clone());
        }
    }
    let mut config = PlanningConfig::new(start, DEFAULT_NUM_DAYS, meal_types);
    config.avoid_repeating_ingredients = true;
    config
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn save_outputs(plan: &WeeklyPlan, output: Option<&Path>, csv: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        if confirm_overwrite(path)? {
            save_plan(path, plan)?;
            println!("Plan saved to {}", path.display());
        }
    }
    if let Some(path) = csv {
        if confirm_overwrite(path)? {
            write_plan_csv(path, plan)?;
            println!("CSV written to {}", path.display());
        }
    }
    Ok(())
}

/// Generate a plan without rule checks.
fn cmd_plan(args: &InputArgs, output: Option<&Path>, csv: Option<&Path>) -> Result<()> {
    let inputs = load_inputs(args)?;
    let mut rng = rng_for(args.seed);

    let result = generate_plan(&inputs.ingredients, &inputs.patterns, &inputs.config, &mut rng)?;

    display_weekly_plan(&result.plan);
    display_warnings(&result.warnings);
    display_stats(&result.stats);

    save_outputs(&result.plan, output, csv)
}

/// Generate a plan and repair it against household rules.
async fn cmd_agent(
    args: &InputArgs,
    rules_path: &Path,
    existing_plan: Option<&Path>,
    budget: Duration,
    pick_rules: bool,
    output: Option<&Path>,
) -> Result<()> {
    let inputs = load_inputs(args)?;

    let mut rules = if rules_path.exists() {
        load_rules(rules_path)?
    } else {
        eprintln!("Rules file not found: {}", rules_path.display());
        Vec::new()
    };
    if pick_rules {
        prompt_rule_toggles(&mut rules)?;
    }
    println!("{} active rules", rules.iter().filter(|r| r.is_active).count());

    let provider: Arc<dyn LlmProvider> = match create_provider_from_env() {
        Ok(provider) => Arc::from(provider),
        Err(e) => {
            eprintln!("AI provider unavailable ({}). Generating plan without rule checks.", e);
            return cmd_plan(args, output, None);
        }
    };
    let validator = LlmRuleValidator::new(Arc::clone(&provider));
    let suggester = LlmModificationSuggester::new(provider);

    let progress = |event: &ProgressEvent| match event {
        ProgressEvent::Generating { message } => eprintln!("{}", message),
        ProgressEvent::Validating { active_rules_count } => {
            eprintln!("Checking {} rules...", active_rules_count)
        }
        ProgressEvent::Fixing {
            changes_count,
            iteration,
        } => eprintln!("Applying {} changes (pass {})...", changes_count, iteration),
        ProgressEvent::Success => eprintln!("All rules satisfied."),
        ProgressEvent::PartialSuccess { conflicts } => {
            eprintln!("{} rules could not be satisfied.", conflicts.len())
        }
        ProgressEvent::Error { message } => eprintln!("Planning failed: {}", message),
    };
    let on_progress: ProgressFn<'_> = &progress;

    let mut start_plan: Option<WeeklyPlan> = match existing_plan {
        Some(path) => Some(load_plan(path)?),
        None => None,
    };

    loop {
        let mut request =
            RepairRequest::new(&inputs.config, &inputs.ingredients, &inputs.patterns, &rules);
        if let Some(seed) = args.seed {
            request = request.with_seed(seed);
        }
        if let Some(plan) = start_plan.take() {
            request = request.with_existing_plan(plan);
        }

        let result =
            plan_with_timeout(request, &validator, &suggester, Some(on_progress), budget).await?;

        display_weekly_plan(&result.plan);
        display_warnings(&result.warnings);
        display_agent_summary(&result);

        if result.status() != FinalStatus::MaxIterations {
            return save_outputs(&result.plan, output, None);
        }

        display_conflicts(&map_violations_to_conflicts(
            result.remaining_violations(),
            inputs.config.locale,
        ));
        match prompt_partial_plan_choice()? {
            PartialPlanChoice::KeepAnyway => return save_outputs(&result.plan, output, None),
            PartialPlanChoice::Retry => start_plan = Some(result.plan),
            PartialPlanChoice::Discard => {
                println!("Plan discarded.");
                return Ok(());
            }
        }
    }
}

/// Report whether the inputs can produce a plan.
fn cmd_check(args: &InputArgs) -> Result<()> {
    let inputs = load_inputs(args)?;

    let warnings = inputs.config.validate(&inputs.patterns)?;
    display_warnings(&warnings);

    let counts = count_ingredients_by_type(&inputs.ingredients);
    let mut report = Vec::new();
    for meal_type in &inputs.config.meal_types {
        report.extend(patterns_for_meal_type(meal_type, &inputs.patterns, &counts));
    }
    display_availability(&report);

    let errors = validate_prerequisites(
        &inputs.ingredients,
        &inputs.patterns,
        &inputs.config.meal_types,
    );
    if errors.is_empty() {
        println!("Ready to plan {} days.", inputs.config.num_days);
    } else {
        for error in &errors {
            println!("  {}", error);
        }
    }
    Ok(())
}
