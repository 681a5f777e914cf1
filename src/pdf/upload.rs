use serde::Serialize;

use super::extract::{PdfExtractor, PdfMetadata};
use super::normalize::{normalize_text, NormalizedSection};
use super::ocr::{needs_ocr, OcrProvider, OcrProviderKind};
use crate::error::UploadError;

pub const MSG_OCR_REQUIRED: &str = "Embedded text insufficient. OCR fallback required.";
pub const MSG_OCR_SUCCEEDED: &str = "Text extracted via Document AI OCR.";
pub const MSG_OCR_NO_TEXT: &str = "Document AI OCR did not detect readable text.";
pub const MSG_OCR_FAILED: &str = "OCR fallback failed. Please try again later.";

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// An uploaded file as received from the caller.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn is_pdf(&self) -> bool {
        self.content_type.as_deref() == Some(PDF_CONTENT_TYPE)
            || self.name.to_lowercase().ends_with(".pdf")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrSummary {
    pub provider: OcrProviderKind,
    pub success: bool,
    pub page_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedUpload {
    pub metadata: PdfMetadata,
    pub sections: Vec<NormalizedSection>,
    pub text: String,
    pub needs_ocr: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr: Option<OcrSummary>,
}

/// Extract, fall back to OCR when the embedded text is too thin, normalize.
///
/// OCR failures never escape: they leave `needs_ocr` set and explain
/// themselves in `message`. The only error is a non-PDF upload.
pub fn process_pdf_upload(
    file: &UploadedFile,
    extractor: &dyn PdfExtractor,
    ocr: &dyn OcrProvider,
) -> Result<ProcessedUpload, UploadError> {
    if !file.is_pdf() {
        return Err(UploadError::InputRejected {
            name: file.name.clone(),
        });
    }

    let parsed = extractor.extract(&file.bytes);

    let mut text = parsed.text;
    let mut needs_ocr = needs_ocr(&text);
    let mut message = needs_ocr.then(|| MSG_OCR_REQUIRED.to_string());
    let mut ocr_summary = None;

    if needs_ocr {
        log::info!(
            "'{}': embedded text insufficient, trying {:?} OCR",
            file.name,
            ocr.kind()
        );

        match ocr.recognize(&file.bytes) {
            Ok(result) => {
                let success = !result.text.is_empty();
                ocr_summary = Some(OcrSummary {
                    provider: ocr.kind(),
                    success,
                    page_count: result.page_count,
                });

                if success {
                    log::info!(
                        "'{}': OCR recovered {} characters from {} pages",
                        file.name,
                        result.text.len(),
                        result.page_count
                    );
                    text = result.text;
                    needs_ocr = false;
                    message = Some(MSG_OCR_SUCCEEDED.to_string());
                } else {
                    log::warn!("'{}': OCR found no readable text", file.name);
                    message = Some(MSG_OCR_NO_TEXT.to_string());
                }
            }
            Err(e) => {
                log::error!("'{}': OCR fallback failed: {}", file.name, e);
                ocr_summary = Some(OcrSummary {
                    provider: ocr.kind(),
                    success: false,
                    page_count: 0,
                });
                message = Some(MSG_OCR_FAILED.to_string());
            }
        }
    }

    let sections = normalize_text(&text);

    Ok(ProcessedUpload {
        metadata: parsed.metadata,
        sections,
        text,
        needs_ocr,
        message,
        ocr: ocr_summary,
    })
}
