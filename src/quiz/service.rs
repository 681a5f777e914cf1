use serde::Serialize;
use serde_json::Value;

use super::agent::LessonAgent;
use super::lesson_plan::{validate_lesson_plan, LessonPlan};
use super::widget::{project_lesson_plan, Widget};
use crate::error::QuizError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub lesson_plan: LessonPlan,
    pub widget: Widget,
}

/// Generate -> validate -> project. Failures are logged in full here; callers
/// should only show [`QuizError::public_message`].
pub fn generate_quiz_from_text(
    agent: &dyn LessonAgent,
    text: &str,
) -> Result<QuizResult, QuizError> {
    let result = run_pipeline(agent, text);
    if let Err(e) = &result {
        log::error!("quiz generation failed: {}", e);
    }
    result
}

fn run_pipeline(agent: &dyn LessonAgent, text: &str) -> Result<QuizResult, QuizError> {
    if text.trim().is_empty() {
        return Err(QuizError::EmptyInput);
    }

    log::info!("generating quiz from {} characters of text", text.len());

    let raw = match agent.generate(text).map_err(QuizError::Agent)? {
        None | Some(Value::Null) => return Err(QuizError::EmptyGenerationResult),
        Some(raw) => raw,
    };

    build_quiz_response(raw)
}

/// Validates an already generated plan and projects it for the widget.
pub fn build_quiz_response(raw: Value) -> Result<QuizResult, QuizError> {
    let lesson_plan = validate_lesson_plan(raw)?;
    let data = project_lesson_plan(&lesson_plan)?;

    log::debug!(
        "projected '{}' with {} questions",
        lesson_plan.lesson.title,
        data.lesson.questions.len()
    );

    Ok(QuizResult {
        lesson_plan,
        widget: Widget::new(data),
    })
}
