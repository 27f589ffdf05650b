use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

use crate::error::{PlannerError, Result};
use crate::models::{MealPattern, MealType};

/// Similarity above which an unknown pattern id gets a "did you mean" hint.
const SIMILARITY_HINT_THRESHOLD: f64 = 0.7;

/// Target share of days for one pattern within a meal type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternDistribution {
    pub pattern_id: String,
    pub percentage: f64,
}

impl PatternDistribution {
    pub fn new(pattern_id: &str, percentage: f64) -> Self {
        Self {
            pattern_id: pattern_id.to_string(),
            percentage,
        }
    }
}

/// Language for day names, month names and the plan title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn default_num_days() -> u32 {
    7
}

fn default_max_repetitions() -> u32 {
    2
}

/// Everything a single planning run needs besides the inventory and catalog.
///
/// Built once per run and only read afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningConfig {
    #[serde(default = "today")]
    pub start_date: NaiveDate,

    #[serde(default = "default_num_days")]
    pub num_days: u32,

    #[serde(default)]
    pub meal_types: Vec<MealType>,

    /// Meal type -> target distribution over its patterns.
    #[serde(default)]
    pub distributions: BTreeMap<MealType, Vec<PatternDistribution>>,

    #[serde(default)]
    pub avoid_repeating_ingredients: bool,

    /// How many times one ingredient may appear over the horizon when
    /// `avoid_repeating_ingredients` is on.
    #[serde(default = "default_max_repetitions")]
    pub max_repetitions_per_week: u32,

    #[serde(default)]
    pub locale: Locale,
}

impl PlanningConfig {
    pub fn new(start_date: NaiveDate, num_days: u32, meal_types: Vec<MealType>) -> Self {
        Self {
            start_date,
            num_days,
            meal_types,
            distributions: BTreeMap::new(),
            avoid_repeating_ingredients: false,
            max_repetitions_per_week: default_max_repetitions(),
            locale: Locale::default(),
        }
    }

    /// Distribution configured for a meal type (empty if none).
    pub fn distribution_for(&self, meal_type: &MealType) -> &[PatternDistribution] {
        self.distributions
            .get(meal_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Reject configurations no plan can come out of.
    ///
    /// Returns advisory warnings for problems the engine can live with
    /// (e.g. distribution entries naming patterns that do not exist).
    pub fn validate(&self, patterns: &[MealPattern]) -> Result<Vec<String>> {
        if self.num_days == 0 {
            return Err(PlannerError::InvalidConfig(
                "num_days must be at least 1".to_string(),
            ));
        }
        if self.meal_types.is_empty() {
            return Err(PlannerError::InvalidConfig(
                "at least one meal type must be configured".to_string(),
            ));
        }
        if self.avoid_repeating_ingredients && self.max_repetitions_per_week == 0 {
            return Err(PlannerError::InvalidConfig(
                "max_repetitions_per_week must be at least 1 when avoiding repeats".to_string(),
            ));
        }

        let mut warnings = Vec::new();
        let known: HashSet<&str> = patterns.iter().map(|p| p.id.as_str()).collect();

        for (meal_type, entries) in &self.distributions {
            for entry in entries {
                if !entry.percentage.is_finite() || entry.percentage < 0.0 {
                    return Err(PlannerError::InvalidConfig(format!(
                        "percentage for pattern '{}' in {} must be a non-negative number",
                        entry.pattern_id, meal_type
                    )));
                }
                if !known.contains(entry.pattern_id.as_str()) {
                    let mut message = format!(
                        "Distribution for {} references unknown pattern '{}'",
                        meal_type, entry.pattern_id
                    );
                    if let Some(hint) = closest_pattern_id(&entry.pattern_id, patterns) {
                        message.push_str(&format!(" (did you mean '{}'?)", hint));
                    }
                    warnings.push(message);
                }
            }
        }

        Ok(warnings)
    }
}

/// Nearest known pattern id by Jaro-Winkler similarity, if close enough.
fn closest_pattern_id<'a>(unknown: &str, patterns: &'a [MealPattern]) -> Option<&'a str> {
    let needle = unknown.to_lowercase();
    patterns
        .iter()
        .map(|p| (p.id.as_str(), jaro_winkler(&p.id.to_lowercase(), &needle)))
        .filter(|(_, score)| *score > SIMILARITY_HINT_THRESHOLD)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(id, _)| id)
}
