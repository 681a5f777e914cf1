use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::config::DocumentAiConfig;

/// Fewer non-whitespace characters than this means the embedded text is
/// not worth keeping.
pub const MIN_EMBEDDED_TEXT_CHARACTERS: usize = 25;

/// Byte order mark; extractors leave it at page starts and it is not
/// `char::is_whitespace`.
const BYTE_ORDER_MARK: char = '\u{FEFF}';

fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == BYTE_ORDER_MARK
}

pub fn needs_ocr(text: &str) -> bool {
    let compact = text.chars().filter(|&c| !is_blank(c)).count();
    compact < MIN_EMBEDDED_TEXT_CHARACTERS
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrText {
    pub text: String,
    pub page_count: usize,
}

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR provider is not configured")]
    NotConfigured,

    #[error("OCR request failed: {0}")]
    Request(#[from] ureq::Error),

    #[error("OCR provider returned an error: {status}")]
    Status { status: u16 },

    #[error("OCR response could not be read: {0}")]
    Response(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrProviderKind {
    DocumentAi,
}

pub trait OcrProvider {
    fn kind(&self) -> OcrProviderKind;

    fn recognize(&self, pdf: &[u8]) -> Result<OcrText, OcrError>;
}

/// Google Document AI `:process` endpoint, whole document in one request.
pub struct DocumentAiOcr {
    config: Option<DocumentAiConfig>,
}

impl DocumentAiOcr {
    pub fn new(config: Option<DocumentAiConfig>) -> Self {
        Self { config }
    }
}

#[derive(Debug, Deserialize)]
struct ProcessResponse {
    document: Option<ProcessedDocument>,
}

#[derive(Debug, Deserialize)]
struct ProcessedDocument {
    #[serde(default)]
    text: String,
    #[serde(default)]
    pages: Vec<serde_json::Value>,
}

impl OcrProvider for DocumentAiOcr {
    fn kind(&self) -> OcrProviderKind {
        OcrProviderKind::DocumentAi
    }

    fn recognize(&self, pdf: &[u8]) -> Result<OcrText, OcrError> {
        let config = self.config.as_ref().ok_or(OcrError::NotConfigured)?;

        let payload = json!({
            "rawDocument": {
                "content": base64::engine::general_purpose::STANDARD.encode(pdf),
                "mimeType": "application/pdf",
            }
        });

        log::debug!("sending {} bytes to Document AI", pdf.len());

        let response = ureq::post(&config.endpoint())
            .set("Authorization", &format!("Bearer {}", config.access_token))
            .set("Content-Type", "application/json")
            .send_json(&payload)
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => OcrError::Status { status: code },
                other => OcrError::Request(other),
            })?;

        let body: ProcessResponse = response.into_json()?;

        Ok(match body.document {
            Some(document) => OcrText {
                text: document.text.trim().to_string(),
                page_count: document.pages.len(),
            },
            None => OcrText {
                text: String::new(),
                page_count: 0,
            },
        })
    }
}
