mod export;
mod extract;
mod frontmatter;
mod normalize;
mod ocr;
mod upload;

pub use export::serialize_upload;
pub use extract::{
    is_likely_image_only, parse_pdf_date, EmbeddedTextExtractor, ParsedDocument, PdfExtractor,
    PdfMetadata,
};
pub use normalize::{normalize_text, NormalizedSection, MAX_SECTION_CHARS};
pub use ocr::{
    needs_ocr, DocumentAiOcr, OcrError, OcrProvider, OcrProviderKind, OcrText,
    MIN_EMBEDDED_TEXT_CHARACTERS,
};
pub use upload::{
    process_pdf_upload, OcrSummary, ProcessedUpload, UploadedFile, MSG_OCR_FAILED,
    MSG_OCR_NO_TEXT, MSG_OCR_REQUIRED, MSG_OCR_SUCCEEDED,
};
