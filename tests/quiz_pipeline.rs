use serde_json::{json, Value};

use pdfquiz::error::{QuizError, QUIZ_FAILURE_MESSAGE};
use pdfquiz::quiz::{build_quiz_response, generate_quiz_from_text, LessonAgent, WidgetMode, WIDGET_ID};

struct StubAgent {
    output: Option<Value>,
    fail: bool,
}

impl StubAgent {
    fn returning(output: Value) -> Self {
        Self {
            output: Some(output),
            fail: false,
        }
    }
}

impl LessonAgent for StubAgent {
    fn generate(&self, _text: &str) -> anyhow::Result<Option<Value>> {
        if self.fail {
            return Err(anyhow::anyhow!("rate limited"));
        }
        Ok(self.output.clone())
    }
}

fn question(correct: &str) -> Value {
    json!({
        "question": "What do chloroplasts produce?",
        "choices": [
            { "id": "c1", "label": "Protein" },
            { "id": "c2", "label": "Lipids" },
            { "id": "c3", "label": "Sugar" },
            { "id": "c4", "label": "DNA" },
            { "id": "c5", "label": "Water" }
        ],
        "correct_choice_id": correct,
        "hint": "Think about photosynthesis.",
        "explanation": "The text says chloroplasts make sugar."
    })
}

fn lesson_plan(questions: Vec<Value>) -> Value {
    json!({
        "lesson": {
            "title": "Photosynthesis",
            "source": "lecture.pdf",
            "description": "How plants make food"
        },
        "questions": questions
    })
}

#[test]
fn test_generates_widget_from_agent_output() {
    let agent = StubAgent::returning(lesson_plan(vec![question("c3"), question("c1")]));
    let result = generate_quiz_from_text(&agent, "Plants turn light into sugar.").unwrap();

    assert_eq!(result.widget.id, WIDGET_ID);
    let data = &result.widget.data;
    assert_eq!(data.mode, WidgetMode::Intro);
    assert_eq!(data.lesson.questions.len(), 2);
    assert_eq!(data.answers.len(), 2);
    assert_eq!(data.progress.total, 2);
    assert_eq!(data.score.total, 2);
    assert_eq!(data.lesson.questions[0].correct_choice_id, 3);
    assert_eq!(data.lesson.questions[1].correct_choice_id, 1);

    // the validated plan keeps its original string ids
    assert_eq!(result.lesson_plan.questions[0].correct_choice_id, "c3");
}

#[test]
fn test_result_json_shape() {
    let result = build_quiz_response(lesson_plan(vec![question("c2")])).unwrap();
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["lessonPlan"]["questions"][0]["choices"][1]["id"], json!("c2"));
    assert_eq!(value["widget"]["id"], json!("step_by_step_quiz"));
    assert_eq!(value["widget"]["data"]["lesson"]["questions"][0]["correct_choice_id"], json!(2));
    assert_eq!(
        value["widget"]["data"]["controls"],
        json!({ "can_back": false, "can_next": true, "next_label": "Start" })
    );
}

#[test]
fn test_no_output_is_recognized() {
    let agent = StubAgent {
        output: None,
        fail: false,
    };
    let err = generate_quiz_from_text(&agent, "some text").unwrap_err();
    assert!(matches!(err, QuizError::EmptyGenerationResult));
    assert_eq!(err.public_message(), QUIZ_FAILURE_MESSAGE);

    let agent = StubAgent::returning(Value::Null);
    let err = generate_quiz_from_text(&agent, "some text").unwrap_err();
    assert!(matches!(err, QuizError::EmptyGenerationResult));
}

#[test]
fn test_schema_violation_is_generic_to_callers() {
    let mut bad = question("c1");
    bad["choices"].as_array_mut().unwrap().truncate(4);
    let agent = StubAgent::returning(lesson_plan(vec![bad]));

    let err = generate_quiz_from_text(&agent, "some text").unwrap_err();
    assert!(matches!(err, QuizError::Schema(_)));
    assert_eq!(err.public_message(), QUIZ_FAILURE_MESSAGE);
}

#[test]
fn test_extra_field_is_rejected() {
    let mut plan = lesson_plan(vec![question("c1")]);
    plan["questions"][0]["difficulty"] = json!("easy");

    assert!(matches!(build_quiz_response(plan), Err(QuizError::Schema(_))));
}

#[test]
fn test_agent_error_propagates() {
    let agent = StubAgent {
        output: None,
        fail: true,
    };
    let err = generate_quiz_from_text(&agent, "some text").unwrap_err();
    assert!(matches!(err, QuizError::Agent(_)));
    assert_eq!(err.public_message(), QUIZ_FAILURE_MESSAGE);
}

#[test]
fn test_blank_text_never_reaches_agent() {
    let agent = StubAgent {
        output: None,
        fail: true,
    };
    let err = generate_quiz_from_text(&agent, "  \n\t").unwrap_err();
    assert!(matches!(err, QuizError::EmptyInput));
}
