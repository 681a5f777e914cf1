use std::cell::Cell;

use serde_json::{json, Value};

use pdfquiz::error::QUIZ_FAILURE_MESSAGE;
use pdfquiz::ingest::ingest_upload;
use pdfquiz::pdf::{normalize_text, PdfMetadata, ProcessedUpload, MSG_OCR_FAILED};
use pdfquiz::quiz::LessonAgent;

const TEXT: &str = "Photosynthesis\n\nPlants turn light into sugar inside their chloroplasts.";

struct CountingAgent {
    output: Option<Value>,
    calls: Cell<usize>,
}

impl CountingAgent {
    fn new(output: Option<Value>) -> Self {
        Self {
            output,
            calls: Cell::new(0),
        }
    }
}

impl LessonAgent for CountingAgent {
    fn generate(&self, _text: &str) -> anyhow::Result<Option<Value>> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.output.clone())
    }
}

fn upload(text: &str, needs_ocr: bool) -> ProcessedUpload {
    ProcessedUpload {
        metadata: PdfMetadata {
            page_count: 1,
            ..Default::default()
        },
        sections: normalize_text(text),
        text: text.to_string(),
        needs_ocr,
        message: needs_ocr.then(|| MSG_OCR_FAILED.to_string()),
        ocr: None,
    }
}

fn plan() -> Value {
    let choices: Vec<Value> = (1..=5)
        .map(|i| json!({ "id": format!("c{}", i), "label": format!("Choice {}", i) }))
        .collect();
    json!({
        "lesson": { "title": "Plants", "source": "lecture.pdf", "description": "Light to sugar" },
        "questions": [{
            "question": "Where is sugar made?",
            "choices": choices,
            "correct_choice_id": "c4",
            "hint": "Green organelles.",
            "explanation": "Chloroplasts make sugar."
        }]
    })
}

#[test]
fn test_missing_agent_keeps_upload() {
    let output = ingest_upload(upload(TEXT, false), None);

    assert!(output.quiz.is_none());
    assert_eq!(output.quiz_error, Some(QUIZ_FAILURE_MESSAGE));
    assert_eq!(output.upload.text, TEXT);
    assert_eq!(output.upload.sections.len(), 1);

    let value = serde_json::to_value(&output).unwrap();
    assert_eq!(value["quizError"], json!(QUIZ_FAILURE_MESSAGE));
    assert_eq!(value["upload"]["sections"][0]["slug"], json!("photosynthesis"));
}

#[test]
fn test_upload_needing_ocr_is_not_quizzed() {
    let agent = CountingAgent::new(Some(plan()));
    let output = ingest_upload(upload("", true), Some(&agent));

    assert_eq!(agent.calls.get(), 0);
    assert!(output.quiz.is_none());
    assert!(output.quiz_error.is_none());
    assert!(output.upload.needs_ocr);

    // no agent is needed either
    let output = ingest_upload(upload("", true), None);
    assert!(output.quiz_error.is_none());
    assert_eq!(output.upload.message.as_deref(), Some(MSG_OCR_FAILED));
}

#[test]
fn test_failed_generation_keeps_upload() {
    let agent = CountingAgent::new(None);
    let output = ingest_upload(upload(TEXT, false), Some(&agent));

    assert_eq!(agent.calls.get(), 1);
    assert!(output.quiz.is_none());
    assert_eq!(output.quiz_error, Some(QUIZ_FAILURE_MESSAGE));
    assert_eq!(output.upload.sections, normalize_text(TEXT));
}

#[test]
fn test_successful_ingest_carries_both() {
    let agent = CountingAgent::new(Some(plan()));
    let output = ingest_upload(upload(TEXT, false), Some(&agent));

    let quiz = output.quiz.unwrap();
    assert!(output.quiz_error.is_none());
    assert_eq!(quiz.widget.data.lesson.questions[0].correct_choice_id, 4);
    assert_eq!(output.upload.text, TEXT);
}
