use std::path::Path;

use dialoguer::{Confirm, Input, Select};
use strsim::jaro_winkler;

use crate::error::Result;
use crate::models::Rule;

/// What to do with a plan that still breaks some rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialPlanChoice {
    KeepAnyway,
    Retry,
    Discard,
}

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Ask before replacing an existing file. Missing files need no confirmation.
pub fn confirm_overwrite(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    prompt_yes_no(&format!("{} exists. Overwrite?", path.display()), false)
}

/// Offer the three ways out of a partially repaired plan.
pub fn prompt_partial_plan_choice() -> Result<PartialPlanChoice> {
    let options = ["View and keep the plan anyway", "Retry fixing it", "Discard it"];
    let selection = Select::new()
        .with_prompt("Some rules are still violated. What now?")
        .items(&options)
        .default(0)
        .interact()?;

    Ok(match selection {
        1 => PartialPlanChoice::Retry,
        2 => PartialPlanChoice::Discard,
        _ => PartialPlanChoice::KeepAnyway,
    })
}

/// Rules whose text is close to `query`, best match first.
pub fn find_rules<'a>(rules: &'a [Rule], query: &str) -> Vec<&'a Rule> {
    let query = query.trim().to_lowercase();
    let mut scored: Vec<(&Rule, f64)> = rules
        .iter()
        .map(|r| {
            let text = r.rule_text.to_lowercase();
            let score = if text.contains(&query) {
                1.0
            } else {
                jaro_winkler(&text, &query)
            };
            (r, score)
        })
        .filter(|(_, score)| *score > 0.7)
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().map(|(r, _)| r).collect()
}

/// Let the user switch individual rules off before a repair run.
pub fn prompt_rule_toggles(rules: &mut [Rule]) -> Result<()> {
    if rules.is_empty() {
        return Ok(());
    }

    loop {
        let query: String = Input::new()
            .with_prompt("Rule to skip this run (Enter to continue)")
            .allow_empty(true)
            .interact_text()?;
        if query.trim().is_empty() {
            return Ok(());
        }

        let matches: Vec<String> = find_rules(rules, &query)
            .into_iter()
            .take(5)
            .map(|r| r.id.clone())
            .collect();
        if matches.is_empty() {
            println!("No rule matches '{}'", query.trim());
            continue;
        }

        let labels: Vec<String> = matches
            .iter()
            .filter_map(|id| rules.iter().find(|r| &r.id == id))
            .map(|r| r.rule_text.clone())
            .collect();
        let mut options = labels.clone();
        options.push("None of these".to_string());

        let selection = Select::new()
            .with_prompt("Which rule?")
            .items(&options)
            .default(0)
            .interact()?;

        if let Some(id) = matches.get(selection) {
            if let Some(rule) = rules.iter_mut().find(|r| &r.id == id) {
                rule.is_active = false;
                println!("Skipping: {}", rule.rule_text);
            }
        }
    }
}
