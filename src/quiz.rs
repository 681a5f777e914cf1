mod agent;
mod lesson_plan;
mod service;
mod widget;

pub use agent::{lesson_plan_json_schema, LessonAgent, OpenAiQuizAgent};
pub use lesson_plan::{
    validate_lesson_plan, LessonInfo, LessonPlan, PlanChoice, PlanQuestion, CHOICES_PER_QUESTION,
};
pub use service::{build_quiz_response, generate_quiz_from_text, QuizResult};
pub use widget::{
    project_lesson_plan, validate_widget_state, AnswerState, Controls, Progress, RadioOption,
    Score, Widget, WidgetChoice, WidgetLesson, WidgetMode, WidgetQuestion, WidgetState,
    WIDGET_ID,
};
