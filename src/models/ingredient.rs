use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// Free-form ingredient category tag (e.g. "Breakfast Protein").
///
/// Types are emergent from data, so this is an open string. The only
/// guarantee is that it is trimmed and non-empty; comparison is exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IngredientType(String);

impl IngredientType {
    pub fn new(raw: impl Into<String>) -> Result<Self, PlannerError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PlannerError::InvalidInput(
                "ingredient type must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for IngredientType {
    type Error = PlannerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IngredientType> for String {
    fn from(value: IngredientType) -> Self {
        value.0
    }
}

impl fmt::Display for IngredientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A food ingredient from the household library. Read-only during planning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: String,

    pub name: String,

    #[serde(rename = "type")]
    pub ingredient_type: IngredientType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Owner scope. Access control happens upstream; the planner only carries it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Ingredient {
    pub fn new(id: &str, name: &str, ingredient_type: IngredientType) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ingredient_type,
            description: None,
            tags: Vec::new(),
            user_id: None,
        }
    }
}

impl PartialEq for Ingredient {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Ingredient {}

impl std::hash::Hash for Ingredient {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
