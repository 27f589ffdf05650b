use crate::agent::{AgentResult, ConflictDetail, FinalStatus};
use crate::models::{PlanningStats, WeeklyPlan};
use crate::planner::PatternAvailability;

/// Display a plan day by day.
pub fn display_weekly_plan(plan: &WeeklyPlan) {
    if plan.total_meals() == 0 {
        println!("No meals planned (no pattern could be satisfied with the current ingredients).");
        return;
    }

    println!();
    println!("=== {} ===", plan.name);
    println!("{} to {}", plan.start_date, plan.end_date);

    let width = plan
        .meals()
        .map(|m| m.meal_type.as_str().len())
        .max()
        .unwrap_or(8);

    for day in plan.days() {
        println!();
        println!("{} {}", day.day_name, day.date);
        if day.meals.is_empty() {
            println!("  (no meals)");
        }
        for meal in &day.meals {
            let names: Vec<&str> = meal.ingredients.iter().map(|i| i.name.as_str()).collect();
            println!(
                "  {:<width$}  {} [{}]",
                meal.meal_type.as_str(),
                if names.is_empty() {
                    "-".to_string()
                } else {
                    names.join(", ")
                },
                meal.pattern_name,
                width = width
            );
        }
    }
    println!();
}

pub fn display_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    println!("--- Warnings ({}) ---", warnings.len());
    for warning in warnings {
        println!("  {}", warning);
    }
    println!();
}

/// Display engine counters.
pub fn display_stats(stats: &PlanningStats) {
    println!("--- Summary ---");
    println!("Total meals: {}", stats.total_meals);

    if !stats.patterns_used.is_empty() {
        println!("Patterns:");
        for (pattern_id, count) in &stats.patterns_used {
            println!("  {:<16} {:>3}", pattern_id, count);
        }
    }

    let most_used = stats
        .ingredients_used
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)));
    println!("Distinct ingredients: {}", stats.ingredients_used.len());
    if let Some((id, count)) = most_used {
        println!("Most used ingredient: {} ({}x)", id, count);
    }
    if !stats.unavailable_patterns.is_empty() {
        println!("Unavailable patterns: {}", stats.unavailable_patterns.join(", "));
    }
    println!();
}

/// Display the outcome of a repair run.
pub fn display_agent_summary(result: &AgentResult) {
    let log = &result.agent_log;
    let status = match log.final_status {
        FinalStatus::Success => "all rules satisfied",
        FinalStatus::MaxIterations => "some rules still violated",
        FinalStatus::Error => "AI checking unavailable",
    };

    println!("--- Rule check ---");
    println!("Status: {}", status);
    println!(
        "Iterations: {}  Modifications applied: {}  Time: {} ms",
        log.iteration_count,
        log.modifications_applied.len(),
        log.total_duration_ms
    );
    println!(
        "Meals: {}  Patterns: {}  Ingredients: {}",
        result.stats.total_meals, result.stats.patterns_used, result.stats.ingredients_used
    );
    if let Some(message) = &log.error_message {
        println!("Error: {}", message);
    }
    println!();
}

/// Display unresolved conflicts grouped by rule.
pub fn display_conflicts(conflicts: &[ConflictDetail]) {
    if conflicts.is_empty() {
        return;
    }

    println!("=== Conflicts to review ===");
    for (i, conflict) in conflicts.iter().enumerate() {
        println!();
        println!("{}. {}", i + 1, conflict.rule_text);
        for meal in &conflict.affected_meals {
            println!("   {} {}: {}", meal.day, meal.meal_type, meal.explanation);
        }
        println!("   Suggestion: {}", conflict.suggestion);
    }
    println!();
}

/// Display per-pattern availability.
pub fn display_availability(report: &[PatternAvailability<'_>]) {
    if report.is_empty() {
        println!("No patterns configured.");
        return;
    }

    let width = report
        .iter()
        .map(|a| a.pattern.id.len())
        .max()
        .unwrap_or(10);

    println!();
    println!("=== Pattern availability ===");
    for entry in report {
        let state = if entry.available {
            "ok".to_string()
        } else {
            let missing: Vec<&str> = entry.missing_types.iter().map(|t| t.as_str()).collect();
            format!("missing {}", missing.join(", "))
        };
        println!(
            "  {:<width$}  {:<10} {}",
            entry.pattern.id,
            entry.pattern.meal_type.as_str(),
            state,
            width = width
        );
    }
    println!();
}
