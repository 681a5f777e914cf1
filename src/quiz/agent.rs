use anyhow::Context;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use super::lesson_plan::CHOICES_PER_QUESTION;
use crate::config::OpenAiConfig;

const QUIZ_INSTRUCTIONS: &str = "\
You are an AI quiz designer with a strong pedagogical background who transforms the provided input into exactly 9 multiple-choice questions.
Requirements:
- Output MUST follow the provided JSON schema exactly (lesson metadata + 9 MCQs, each with 5 answer choices).
- Every fact must trace back to the input, never fabricate unseen data.
- Keep tone concise and instructional.
- Hints should help the learner reason toward the correct answer without revealing it outright.
- Explanations must cite the relevant section or fact from the input and confirm the correct choice.";

/// Produces a raw, unvalidated lesson plan from document text.
///
/// `Ok(None)` means the agent ran but produced nothing usable.
pub trait LessonAgent {
    fn generate(&self, text: &str) -> anyhow::Result<Option<Value>>;
}

#[derive(Error, Debug)]
enum RequestError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("Failed to read response body: {0}")]
    Io(#[from] std::io::Error),

    #[error("OpenAI returned an error: {status}")]
    Server { status: u16 },
}

/// Quiz writer backed by the OpenAI chat completions API with a strict
/// structured-output schema.
pub struct OpenAiQuizAgent {
    config: OpenAiConfig,
}

impl OpenAiQuizAgent {
    pub fn new(config: OpenAiConfig) -> Self {
        Self { config }
    }

    fn request_body(&self, text: &str) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": QUIZ_INSTRUCTIONS },
                { "role": "user", "content": text }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "lesson_plan",
                    "strict": true,
                    "schema": lesson_plan_json_schema()
                }
            }
        });

        // reasoning models only accept the default temperature
        if supports_temperature(&self.config.model) {
            body["temperature"] = json!(self.config.temperature);
        }
        body
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
    refusal: Option<String>,
}

impl LessonAgent for OpenAiQuizAgent {
    fn generate(&self, text: &str) -> anyhow::Result<Option<Value>> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let response = ureq::post(&url)
            .set("Authorization", &format!("Bearer {}", self.config.api_key))
            .set("Content-Type", "application/json")
            .send_json(self.request_body(text))
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => RequestError::Server { status: code },
                other => RequestError::Http(other),
            })
            .context("Failed to send request")?;

        let completion: ChatCompletion = response
            .into_json()
            .map_err(RequestError::Io)
            .context("Failed to read response body")?;

        let Some(message) = completion.choices.into_iter().next().map(|c| c.message) else {
            return Ok(None);
        };

        if let Some(refusal) = message.refusal {
            log::warn!("quiz agent refused: {}", refusal);
            return Ok(None);
        }

        match message.content.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(content) => serde_json::from_str(content)
                .map(Some)
                .context("quiz agent output is not JSON"),
        }
    }
}

fn supports_temperature(model: &str) -> bool {
    !(model.starts_with("gpt-5") || model.starts_with('o'))
}

/// JSON schema handed to the model; mirrors [`super::LessonPlan`].
pub fn lesson_plan_json_schema() -> Value {
    let string = json!({ "type": "string" });

    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["lesson", "questions"],
        "properties": {
            "lesson": {
                "type": "object",
                "additionalProperties": false,
                "required": ["title", "source", "description"],
                "properties": {
                    "title": string,
                    "source": string,
                    "description": string
                }
            },
            "questions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["question", "choices", "correct_choice_id", "hint", "explanation"],
                    "properties": {
                        "question": string,
                        "choices": {
                            "type": "array",
                            "minItems": CHOICES_PER_QUESTION,
                            "maxItems": CHOICES_PER_QUESTION,
                            "items": {
                                "type": "object",
                                "additionalProperties": false,
                                "required": ["id", "label"],
                                "properties": {
                                    "id": string,
                                    "label": string
                                }
                            }
                        },
                        "correct_choice_id": string,
                        "hint": string,
                        "explanation": string
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(model: &str) -> OpenAiQuizAgent {
        OpenAiQuizAgent::new(OpenAiConfig {
            api_key: "sk-test".to_string(),
            base_url: "http://localhost".to_string(),
            model: model.to_string(),
            temperature: 0.3,
        })
    }

    #[test]
    fn test_request_body() {
        let body = agent("gpt-4o-mini").request_body("some text");
        assert_eq!(body["messages"][1]["content"], json!("some text"));
        assert_eq!(body["response_format"]["json_schema"]["strict"], json!(true));
        assert!(body.get("temperature").is_some());

        let body = agent("gpt-5-nano").request_body("some text");
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_schema_pins_choice_count() {
        let schema = lesson_plan_json_schema();
        let choices = &schema["properties"]["questions"]["items"]["properties"]["choices"];
        assert_eq!(choices["minItems"], json!(5));
        assert_eq!(choices["maxItems"], json!(5));
    }
}
