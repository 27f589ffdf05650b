use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PlannerError;
use crate::models::IngredientType;

/// Meal category within a day (e.g. "Breakfast"). Open string, exact equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MealType(String);

impl MealType {
    pub fn new(raw: impl Into<String>) -> Result<Self, PlannerError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PlannerError::InvalidInput(
                "meal type must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MealType {
    type Error = PlannerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MealType> for String {
    fn from(value: MealType) -> Self {
        value.0
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One required slot of a pattern: `quantity` ingredients of `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredComponent {
    #[serde(rename = "type")]
    pub ingredient_type: IngredientType,
    pub quantity: u32,
}

impl RequiredComponent {
    pub fn new(ingredient_type: IngredientType, quantity: u32) -> Self {
        Self {
            ingredient_type,
            quantity,
        }
    }
}

/// A named template of required ingredient-type slots for one meal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPattern {
    pub id: String,
    pub meal_type: MealType,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub required_components: Vec<RequiredComponent>,
    /// Built-in vs user-defined. Not used by the planner.
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub display_order: i32,
}

impl MealPattern {
    /// Check the structural invariants: at least one component, every quantity >= 1.
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.required_components.is_empty() {
            return Err(PlannerError::InvalidPattern(format!(
                "pattern '{}' has no required components",
                self.id
            )));
        }
        if let Some(component) = self.required_components.iter().find(|c| c.quantity == 0) {
            return Err(PlannerError::InvalidPattern(format!(
                "pattern '{}' requires zero of type '{}'",
                self.id, component.ingredient_type
            )));
        }
        Ok(())
    }

    /// Total number of ingredients the pattern asks for.
    pub fn total_quantity(&self) -> u32 {
        self.required_components.iter().map(|c| c.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(components: Vec<RequiredComponent>) -> MealPattern {
        MealPattern {
            id: "p1".to_string(),
            meal_type: MealType::new("Lunch").unwrap(),
            name: "Traditional".to_string(),
            description: String::new(),
            required_components: components,
            is_system: true,
            display_order: 1,
        }
    }

    #[test]
    fn test_validate_ok() {
        let p = pattern(vec![RequiredComponent::new(
            IngredientType::new("Protein").unwrap(),
            2,
        )]);
        assert!(p.validate().is_ok());
        assert_eq!(p.total_quantity(), 2);
    }

    #[test]
    fn test_validate_rejects_empty_components() {
        assert!(pattern(vec![]).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        let p = pattern(vec![RequiredComponent::new(
            IngredientType::new("Protein").unwrap(),
            0,
        )]);
        assert!(matches!(p.validate(), Err(PlannerError::InvalidPattern(_))));
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{
            "id": "snack-1",
            "meal_type": "Snack",
            "name": "Fruit",
            "required_components": [{"type": "Fruit", "quantity": 1}]
        }"#;
        let p: MealPattern = serde_json::from_str(json).unwrap();
        assert!(!p.is_system);
        assert_eq!(p.display_order, 0);
        assert_eq!(p.required_components[0].ingredient_type.as_str(), "Fruit");
    }
}
