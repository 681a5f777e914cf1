use anyhow::Context;
use std::env;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_QUIZ_MODEL: &str = "gpt-5-nano";
const DEFAULT_QUIZ_TEMPERATURE: f32 = 0.3;
const DEFAULT_DOCUMENT_AI_LOCATION: &str = "us";

#[derive(Debug, Clone)]
pub struct Config {
    pub openai: Option<OpenAiConfig>,
    pub document_ai: Option<DocumentAiConfig>,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct DocumentAiConfig {
    pub project_id: String,
    pub location: String,
    pub processor_id: String,
    pub access_token: String,
}

impl DocumentAiConfig {
    pub fn endpoint(&self) -> String {
        format!(
            "https://{loc}-documentai.googleapis.com/v1/projects/{}/locations/{loc}/processors/{}:process",
            self.project_id,
            self.processor_id,
            loc = self.location,
        )
    }
}

impl Config {
    /// Reads `.env` (if present) and the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        // a missing .env file is fine, the variables may come from the shell
        let _ = dotenv::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openai = match get("OPENAI_API_KEY") {
            Some(api_key) => Some(OpenAiConfig {
                api_key,
                base_url: get("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                model: get("QUIZ_MODEL").unwrap_or_else(|| DEFAULT_QUIZ_MODEL.to_string()),
                temperature: match get("QUIZ_TEMPERATURE") {
                    Some(t) => t
                        .parse::<f32>()
                        .context(format!("QUIZ_TEMPERATURE '{}' is not a number", t))?,
                    None => DEFAULT_QUIZ_TEMPERATURE,
                },
            }),
            None => None,
        };

        let document_ai = match (
            get("DOCUMENT_AI_PROJECT_ID"),
            get("DOCUMENT_AI_PROCESSOR_ID"),
            get("GOOGLE_ACCESS_TOKEN"),
        ) {
            (Some(project_id), Some(processor_id), Some(access_token)) => Some(DocumentAiConfig {
                project_id,
                location: get("DOCUMENT_AI_LOCATION")
                    .unwrap_or_else(|| DEFAULT_DOCUMENT_AI_LOCATION.to_string()),
                processor_id,
                access_token,
            }),
            _ => None,
        };

        Ok(Self {
            openai,
            document_ai,
        })
    }
}
