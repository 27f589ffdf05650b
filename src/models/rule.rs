use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A user-defined natural-language planning rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,

    pub rule_text: String,

    /// `None` means the rule applies to every meal type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<String>,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationType {
    Repetition,
    Combination,
    Restriction,
    Frequency,
    #[default]
    #[serde(other)]
    Other,
}

/// A mismatch between a plan and a rule, as reported by the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub rule_id: String,

    #[serde(default)]
    pub rule_text: String,

    #[serde(default)]
    pub violation_type: ViolationType,

    /// Slot keys in `YYYY-MM-DD-<meal type>` form.
    #[serde(default)]
    pub affected_meals: Vec<String>,

    #[serde(default)]
    pub explanation: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
}

/// An ingredient substitution for one meal slot, as proposed by the suggester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanModification {
    pub day_date: String,

    pub meal_type: String,

    #[serde(default)]
    pub old_ingredient_ids: Vec<String>,

    pub new_ingredient_ids: Vec<String>,

    #[serde(default)]
    pub reason: String,
}

/// Date and meal type addressed by a slot key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub meal_type: String,
}

impl SlotKey {
    /// Build the `YYYY-MM-DD-<meal type>` key for a slot.
    pub fn format(date: NaiveDate, meal_type: &str) -> String {
        format!("{}-{}", date.format("%Y-%m-%d"), meal_type)
    }

    /// Parse a slot key. The first ten characters are the date; everything
    /// after the following dash is the meal type (which may itself contain dashes).
    pub fn parse(key: &str) -> Option<Self> {
        let date_part = key.get(..10)?;
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
        let meal_type = key.get(10..)?.strip_prefix('-')?;
        if meal_type.is_empty() {
            return None;
        }
        Some(Self {
            date,
            meal_type: meal_type.to_string(),
        })
    }
}
