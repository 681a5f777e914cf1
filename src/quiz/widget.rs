//! Projection of a lesson plan into the quiz widget's initial state.
//!
//! Questions and choices get 1-based positional ids; the plan's string ids
//! are only consulted to find which position holds the correct answer. The
//! assembled state goes back through the strict schema before it is
//! returned, so a projection bug surfaces here instead of in the UI.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::lesson_plan::{field_at, LessonPlan, PlanChoice, PlanQuestion, CHOICES_PER_QUESTION};
use crate::error::SchemaViolation;

pub const WIDGET_ID: &str = "step_by_step_quiz";

const HEADER_LABEL: &str = "Quiz";
const BADGE_LABEL: &str = "PDF Generated";
const START_LABEL: &str = "Start";

/// Used when the plan's correct id names none of the choices.
const FALLBACK_CHOICE_ID: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WidgetChoice {
    pub id: u32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WidgetQuestion {
    pub id: u32,
    pub question: String,
    pub choices: [WidgetChoice; CHOICES_PER_QUESTION],
    pub hint: String,
    pub explanation: String,
    pub correct_choice_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WidgetLesson {
    pub title: String,
    pub source: String,
    pub description: String,
    pub questions: Vec<WidgetQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RadioOption {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnswerState {
    pub question_id: u32,
    pub selected_choice_id: Option<u32>,
    pub is_correct: bool,
    pub attempted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetMode {
    Intro,
    Question,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Progress {
    pub index: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Controls {
    pub can_back: bool,
    pub can_next: bool,
    pub next_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WidgetState {
    pub lesson: WidgetLesson,
    pub mode: WidgetMode,
    pub current_page: usize,
    pub progress: Progress,
    pub header_label: String,
    pub badge_label: String,
    pub current_question: Option<WidgetQuestion>,
    pub option_list: Vec<RadioOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_answer_value: Option<String>,
    pub answers: Vec<AnswerState>,
    pub view_locked: bool,
    pub show_hint: bool,
    pub show_explanation: bool,
    pub controls: Controls,
    pub score: Score,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Widget {
    pub id: String,
    pub data: WidgetState,
}

impl Widget {
    pub fn new(data: WidgetState) -> Self {
        Self {
            id: WIDGET_ID.to_string(),
            data,
        }
    }
}

/// Plan choice id -> 1-based position, first occurrence wins.
struct ChoicePositions<'a>(HashMap<&'a str, u32>);

impl<'a> ChoicePositions<'a> {
    fn new(choices: &'a [PlanChoice]) -> Self {
        let mut positions = HashMap::with_capacity(choices.len());
        for (index, choice) in choices.iter().enumerate() {
            positions.entry(choice.id.as_str()).or_insert(index as u32 + 1);
        }
        Self(positions)
    }

    fn position_of(&self, id: &str) -> Option<u32> {
        self.0.get(id).copied()
    }
}

fn resolve_correct_choice_id(question: &PlanQuestion, question_id: u32) -> u32 {
    let positions = ChoicePositions::new(&question.choices);
    match positions.position_of(&question.correct_choice_id) {
        Some(position) => position,
        None => {
            log::warn!(
                "question {}: correct_choice_id '{}' matches no choice, defaulting to choice {}",
                question_id,
                question.correct_choice_id,
                FALLBACK_CHOICE_ID
            );
            FALLBACK_CHOICE_ID
        }
    }
}

fn project_question(question: &PlanQuestion, index: usize) -> WidgetQuestion {
    let id = index as u32 + 1;
    let choices = std::array::from_fn(|i| WidgetChoice {
        id: i as u32 + 1,
        label: question.choices[i].label.clone(),
    });

    WidgetQuestion {
        id,
        question: question.question.clone(),
        choices,
        hint: question.hint.clone(),
        explanation: question.explanation.clone(),
        correct_choice_id: resolve_correct_choice_id(question, id),
    }
}

/// Builds the initial widget state for a validated plan. Pure: the same plan
/// always yields the same state. An error here means the projection itself
/// is broken, never that the plan was.
pub fn project_lesson_plan(plan: &LessonPlan) -> Result<WidgetState, SchemaViolation> {
    let questions: Vec<WidgetQuestion> = plan
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| project_question(question, index))
        .collect();

    let total = questions.len();
    let answers = questions
        .iter()
        .map(|question| AnswerState {
            question_id: question.id,
            selected_choice_id: None,
            is_correct: false,
            attempted: false,
        })
        .collect();

    let state = WidgetState {
        lesson: WidgetLesson {
            title: plan.lesson.title.clone(),
            source: plan.lesson.source.clone(),
            description: plan.lesson.description.clone(),
            questions,
        },
        mode: WidgetMode::Intro,
        current_page: 0,
        progress: Progress { index: 0, total },
        header_label: HEADER_LABEL.to_string(),
        badge_label: BADGE_LABEL.to_string(),
        current_question: None,
        option_list: Vec::new(),
        current_answer_value: Some(String::new()),
        answers,
        view_locked: false,
        show_hint: false,
        show_explanation: false,
        controls: Controls {
            can_back: false,
            can_next: true,
            next_label: START_LABEL.to_string(),
        },
        score: Score { correct: 0, total },
    };

    let value = serde_json::to_value(&state).map_err(SchemaViolation::from)?;
    validate_widget_state(value)
}

/// Strict schema check for a widget state, including the cross-field rules
/// the types alone cannot express.
pub fn validate_widget_state(raw: Value) -> Result<WidgetState, SchemaViolation> {
    let state: WidgetState = field_at(Some(raw), "")?;

    for (index, question) in state.lesson.questions.iter().enumerate() {
        let path = format!("/lesson/questions/{}", index);
        if question.id as usize != index + 1 {
            return Err(SchemaViolation::new(
                format!("{}/id", path),
                format!("expected {}, found {}", index + 1, question.id),
            ));
        }
        for (position, choice) in question.choices.iter().enumerate() {
            if choice.id as usize != position + 1 {
                return Err(SchemaViolation::new(
                    format!("{}/choices/{}/id", path, position),
                    format!("expected {}, found {}", position + 1, choice.id),
                ));
            }
        }
        if !(1..=CHOICES_PER_QUESTION as u32).contains(&question.correct_choice_id) {
            return Err(SchemaViolation::new(
                format!("{}/correct_choice_id", path),
                format!("{} is not a choice position", question.correct_choice_id),
            ));
        }
    }

    let total = state.lesson.questions.len();
    if state.answers.len() != total {
        return Err(SchemaViolation::new(
            "/answers",
            format!("expected {} entries, found {}", total, state.answers.len()),
        ));
    }
    if let Some((index, answer)) = state
        .answers
        .iter()
        .enumerate()
        .find(|(index, answer)| answer.question_id as usize != index + 1)
    {
        return Err(SchemaViolation::new(
            format!("/answers/{}/question_id", index),
            format!("expected {}, found {}", index + 1, answer.question_id),
        ));
    }
    if state.progress.total != total || state.progress.index > total {
        return Err(SchemaViolation::new("/progress", "does not match question count"));
    }
    if state.score.total != total || state.score.correct > total {
        return Err(SchemaViolation::new("/score", "does not match question count"));
    }

    Ok(state)
}
