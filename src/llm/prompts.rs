use serde::Serialize;

use crate::models::{Ingredient, MealPattern, Rule, RuleViolation, WeeklyPlan};

fn pretty<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

fn rule_lines(rules: &[Rule]) -> String {
    rules
        .iter()
        .enumerate()
        .map(|(i, rule)| {
            let scope = match &rule.meal_type {
                Some(meal_type) => format!("(applies to: {})", meal_type),
                None => "(applies to all meals)".to_string(),
            };
            format!("{}. [{}] {} {}", i + 1, rule.id, rule.rule_text, scope)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn validation_prompt(plan: &WeeklyPlan, rules: &[Rule]) -> Result<String, serde_json::Error> {
    Ok(format!(
        r#"You are a meal planning validator. Analyze this weekly plan against user rules and identify ALL violations.

WEEKLY PLAN:
{plan}

USER RULES:
{rules}

Task: Identify ALL rule violations. For each violation, specify:
1. Which rule was broken (use the rule ID)
2. Which meals are affected (format: "YYYY-MM-DD-MealType")
3. Why it's a violation (be specific about the ingredient or pattern involved)
4. Suggested fix

IMPORTANT:
- Check each rule against the entire plan
- A rule like "do not repeat X until Y days later" means Y full days between occurrences
- Only report actual violations

Output JSON with this exact structure:
{{
  "violations": [
    {{
      "rule_id": "id-of-rule",
      "rule_text": "the rule text",
      "violation_type": "repetition|combination|restriction|frequency|other",
      "affected_meals": ["2024-03-15-Lunch", "2024-03-16-Lunch"],
      "explanation": "why this violates the rule",
      "suggested_fix": "what should be changed"
    }}
  ],
  "isValid": false
}}

If there are no violations, return {{"violations": [], "isValid": true}}
"#,
        plan = pretty(plan)?,
        rules = rule_lines(rules),
    ))
}

pub fn suggestion_prompt(
    violations: &[RuleViolation],
    plan: &WeeklyPlan,
    ingredients: &[Ingredient],
    patterns: &[MealPattern],
) -> Result<String, serde_json::Error> {
    Ok(format!(
        r#"You are a meal planning assistant. Fix these rule violations by suggesting specific ingredient replacements.

VIOLATIONS TO FIX:
{violations}

CURRENT PLAN:
{plan}

AVAILABLE INGREDIENTS:
{ingredients}

AVAILABLE PATTERNS:
{patterns}

Task: For each violation, suggest ingredient replacements that:
1. Fix the rule violation
2. Use ONLY ingredients from the list above (match by exact ID)
3. Match the meal pattern requirements for that meal type
4. Keep variety (do not reuse one replacement everywhere)

Output JSON with this exact structure:
{{
  "modifications": [
    {{
      "day_date": "YYYY-MM-DD",
      "meal_type": "meal type exactly as in the plan",
      "old_ingredient_ids": ["id1", "id2"],
      "new_ingredient_ids": ["id3", "id4"],
      "reason": "why this change fixes the violation"
    }}
  ]
}}

If no suitable replacement exists for a violation, leave it out.
"#,
        violations = pretty(violations)?,
        plan = pretty(plan)?,
        ingredients = pretty(ingredients)?,
        patterns = pretty(patterns)?,
    ))
}
