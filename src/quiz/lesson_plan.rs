use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaViolation;

pub const CHOICES_PER_QUESTION: usize = 5;

/// Quiz content as produced by the generation agent. Every level rejects
/// fields it does not declare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LessonPlan {
    pub lesson: LessonInfo,
    pub questions: Vec<PlanQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LessonInfo {
    pub title: String,
    pub source: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanQuestion {
    pub question: String,
    pub choices: [PlanChoice; CHOICES_PER_QUESTION],
    /// must name one of `choices[..].id`
    pub correct_choice_id: String,
    pub hint: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanChoice {
    pub id: String,
    pub label: String,
}

const PLAN_FIELDS: [&str; 2] = ["lesson", "questions"];

/// Strictly validates an untyped lesson plan.
///
/// Walks the top level by hand so a failure can name the question it came
/// from; everything below that is checked by the `deny_unknown_fields`
/// derives and the fixed-size `choices` array.
pub fn validate_lesson_plan(raw: Value) -> Result<LessonPlan, SchemaViolation> {
    let mut plan = match raw {
        Value::Object(plan) => plan,
        other => {
            return Err(SchemaViolation::new(
                "",
                format!("expected an object, found {}", kind_of(&other)),
            ))
        }
    };

    if let Some(unknown) = plan.keys().find(|k| !PLAN_FIELDS.contains(&k.as_str())) {
        return Err(SchemaViolation::new(
            format!("/{}", unknown),
            "unrecognized field",
        ));
    }

    let lesson: LessonInfo = field_at(plan.remove("lesson"), "/lesson")?;

    let questions = match plan.remove("questions") {
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| field_at(Some(item), &format!("/questions/{}", i)))
            .collect::<Result<Vec<PlanQuestion>, SchemaViolation>>()?,
        Some(other) => {
            return Err(SchemaViolation::new(
                "/questions",
                format!("expected an array, found {}", kind_of(&other)),
            ))
        }
        None => return Err(SchemaViolation::new("/questions", "missing field")),
    };

    Ok(LessonPlan { lesson, questions })
}

pub(crate) fn field_at<T: DeserializeOwned>(
    value: Option<Value>,
    path: &str,
) -> Result<T, SchemaViolation> {
    let value = value.ok_or_else(|| SchemaViolation::new(path, "missing field"))?;
    serde_json::from_value(value).map_err(|e| SchemaViolation {
        path: path.to_string(),
        ..SchemaViolation::from(e)
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
