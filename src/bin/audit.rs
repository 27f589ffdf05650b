use std::path::PathBuf;

use clap::Parser;

use weekly_meal_planner::audit::{print_audit, run_audit, write_audit_csv};
use weekly_meal_planner::error::Result;
use weekly_meal_planner::planner::{default_config, system_patterns};
use weekly_meal_planner::state::{load_config, load_ingredients, load_patterns};

#[derive(Parser, Debug)]
#[command(name = "audit")]
#[command(about = "Audit realized pattern distribution and ingredient repetition")]
struct Args {
    /// Number of plans to generate
    #[arg(long, default_value = "200")]
    runs: usize,

    /// Master seed for reproducibility
    #[arg(long, default_value = "123")]
    seed: u64,

    /// Path to the ingredient library JSON
    #[arg(long, default_value = "ingredients.json")]
    ingredients: PathBuf,

    /// Path to a meal pattern JSON (built-in catalog when omitted)
    #[arg(long)]
    patterns: Option<PathBuf>,

    /// Path to a planning configuration JSON (defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output CSV file
    #[arg(long, default_value = "audit_results.csv")]
    csv: PathBuf,
}

fn main() {
    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let ingredients = load_ingredients(&args.ingredients)?;
    println!("Loaded {} ingredients from {:?}", ingredients.len(), args.ingredients);

    let patterns = match &args.patterns {
        Some(path) => load_patterns(path)?,
        None => system_patterns()?,
    };
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => default_config(chrono::Local::now().date_naive())?,
    };

    let report = run_audit(&ingredients, &patterns, &config, args.runs, args.seed)?;
    print_audit(&report);

    write_audit_csv(&report, &args.csv)?;
    println!("Wrote audit results to {:?}", args.csv);
    Ok(())
}
