use serde::{Deserialize, Serialize};

use crate::models::{Locale, RuleViolation, SlotKey};
use crate::planner::calendar::day_name_for;

/// Progress notifications for a caller UI. Informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Generating {
        message: String,
    },
    Validating {
        #[serde(rename = "activeRulesCount")]
        active_rules_count: usize,
    },
    Fixing {
        #[serde(rename = "changesCount")]
        changes_count: usize,
        iteration: u32,
    },
    Success,
    PartialSuccess {
        conflicts: Vec<ConflictDetail>,
    },
    Error {
        message: String,
    },
}

/// A remaining violation, phrased for a person to fix by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictDetail {
    pub rule_text: String,
    pub affected_meals: Vec<AffectedMeal>,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedMeal {
    pub day: String,
    pub meal_type: String,
    pub explanation: String,
}

fn manual_fix_text(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Change these ingredients manually",
        Locale::Es => "Cambia estos ingredientes manualmente",
    }
}

fn affected_meal(key: &str, explanation: &str, locale: Locale) -> AffectedMeal {
    match SlotKey::parse(key) {
        Some(slot) => AffectedMeal {
            day: day_name_for(slot.date, locale).to_string(),
            meal_type: slot.meal_type,
            explanation: explanation.to_string(),
        },
        None => AffectedMeal {
            day: key.to_string(),
            meal_type: String::new(),
            explanation: explanation.to_string(),
        },
    }
}

/// Group violations by rule id, keeping first-seen order.
///
/// Each group takes its rule text and suggestion from its first violation.
pub fn map_violations_to_conflicts(
    violations: &[RuleViolation],
    locale: Locale,
) -> Vec<ConflictDetail> {
    let mut groups: Vec<(&str, Vec<&RuleViolation>)> = Vec::new();
    for violation in violations {
        match groups.iter_mut().find(|(id, _)| *id == violation.rule_id) {
            Some((_, members)) => members.push(violation),
            None => groups.push((violation.rule_id.as_str(), vec![violation])),
        }
    }

    groups
        .into_iter()
        .map(|(_, members)| {
            let first = members[0];
            ConflictDetail {
                rule_text: first.rule_text.clone(),
                affected_meals: members
                    .iter()
                    .flat_map(|v| {
                        v.affected_meals
                            .iter()
                            .map(move |key| affected_meal(key, &v.explanation, locale))
                    })
                    .collect(),
                suggestion: first
                    .suggested_fix
                    .clone()
                    .unwrap_or_else(|| manual_fix_text(locale).to_string()),
            }
        })
        .collect()
}
