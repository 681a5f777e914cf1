//! Upload followed by quiz generation, keeping the upload when the quiz
//! step fails or cannot start.

use serde::Serialize;

use crate::error::QUIZ_FAILURE_MESSAGE;
use crate::pdf::ProcessedUpload;
use crate::quiz::{generate_quiz_from_text, LessonAgent, QuizResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestOutput {
    pub upload: ProcessedUpload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<QuizResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_error: Option<&'static str>,
}

/// Runs the quiz step on a finished upload. Text that still needs OCR is
/// not quizzed; a missing agent counts as a quiz failure.
pub fn ingest_upload(upload: ProcessedUpload, agent: Option<&dyn LessonAgent>) -> IngestOutput {
    if upload.needs_ocr {
        return IngestOutput {
            upload,
            quiz: None,
            quiz_error: None,
        };
    }

    let (quiz, quiz_error) = match agent {
        None => {
            log::error!("quiz generation skipped: no lesson agent configured");
            (None, Some(QUIZ_FAILURE_MESSAGE))
        }
        Some(agent) => match generate_quiz_from_text(agent, &upload.text) {
            Ok(quiz) => (Some(quiz), None),
            Err(e) => (None, Some(e.public_message())),
        },
    };

    IngestOutput {
        upload,
        quiz,
        quiz_error,
    }
}
