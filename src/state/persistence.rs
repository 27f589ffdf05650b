use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::models::{Ingredient, MealPattern, PlanningConfig, Rule, WeeklyPlan};

fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Deduplicate by key, keeping the first position and the last value.
fn dedupe_by<T, F: Fn(&T) -> String>(items: Vec<T>, key: F) -> Vec<T> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        let k = key(&item);
        match index.get(&k) {
            Some(&pos) => out[pos] = item,
            None => {
                index.insert(k, out.len());
                out.push(item);
            }
        }
    }
    out
}

/// Load the ingredient library from a JSON array.
///
/// Deduplicates by id (last occurrence wins, first position kept).
pub fn load_ingredients<P: AsRef<Path>>(path: P) -> Result<Vec<Ingredient>> {
    let ingredients: Vec<Ingredient> = read_json(path)?;
    Ok(dedupe_by(ingredients, |i| i.id.clone()))
}

/// Load a pattern catalog from a JSON array and check every pattern.
pub fn load_patterns<P: AsRef<Path>>(path: P) -> Result<Vec<MealPattern>> {
    let patterns: Vec<MealPattern> = read_json(path)?;
    let patterns = dedupe_by(patterns, |p| p.id.clone());
    for pattern in &patterns {
        pattern.validate()?;
    }
    Ok(patterns)
}

/// Load rules, keeping only active ones.
pub fn load_rules<P: AsRef<Path>>(path: P) -> Result<Vec<Rule>> {
    let rules: Vec<Rule> = read_json(path)?;
    Ok(rules.into_iter().filter(|r| r.is_active).collect())
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PlanningConfig> {
    read_json(path)
}

pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<WeeklyPlan> {
    read_json(path)
}

/// Save a plan as pretty JSON in the persisted record shape.
pub fn save_plan<P: AsRef<Path>>(path: P, plan: &WeeklyPlan) -> Result<()> {
    let json = serde_json::to_string_pretty(plan)?;
    fs::write(path, json)?;
    Ok(())
}

/// Write one CSV row per meal.
pub fn write_plan_csv<P: AsRef<Path>>(path: P, plan: &WeeklyPlan) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "date",
        "day_name",
        "meal_type",
        "pattern_id",
        "pattern_name",
        "ingredient_ids",
        "ingredients",
    ])?;

    for day in plan.days() {
        for meal in &day.meals {
            let names: Vec<&str> = meal.ingredients.iter().map(|i| i.name.as_str()).collect();
            wtr.write_record([
                day.date.format("%Y-%m-%d").to_string(),
                day.day_name.clone(),
                meal.meal_type.to_string(),
                meal.pattern_id.clone(),
                meal.pattern_name.clone(),
                meal.ingredient_ids.join(";"),
                names.join(";"),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
