use thiserror::Error;

/// Failures that stop an upload before any text is extracted.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Only PDF uploads are supported (got '{name}')")]
    InputRejected { name: String },
}

impl UploadError {
    /// Short explanation safe to hand back to the uploader.
    pub fn public_message(&self) -> &'static str {
        match self {
            UploadError::InputRejected { .. } => "Only PDF uploads are supported.",
        }
    }
}

/// A value did not match one of the strict schemas (lesson plan or widget state).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("schema violation at '{path}': {reason}")]
pub struct SchemaViolation {
    /// location of the offending value, `/questions/2/choices` style
    pub path: String,
    pub reason: String,
}

impl SchemaViolation {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for SchemaViolation {
    fn from(e: serde_json::Error) -> Self {
        // serde reports the innermost problem; line/column refer to the
        // re-serialized value and carry no meaning for the caller
        let reason = e.to_string();
        let reason = match reason.rfind(" at line ") {
            Some(idx) => reason[..idx].to_string(),
            None => reason,
        };
        SchemaViolation::new("", reason)
    }
}

pub const QUIZ_FAILURE_MESSAGE: &str = "Quiz generation failed. Please try again.";

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("Quiz generation requires non-empty text")]
    EmptyInput,

    #[error("Quiz agent failed: {0:#}")]
    Agent(#[source] anyhow::Error),

    #[error("Quiz agent returned no output")]
    EmptyGenerationResult,

    #[error("Generated lesson plan is invalid: {0}")]
    Schema(#[from] SchemaViolation),
}

impl QuizError {
    /// Every quiz failure collapses to the same message for end users; the
    /// detailed cause only goes to the log.
    pub fn public_message(&self) -> &'static str {
        match self {
            QuizError::EmptyInput => "Quiz generation requires non-empty text.",
            _ => QUIZ_FAILURE_MESSAGE,
        }
    }
}
