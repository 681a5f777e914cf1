//! Embedded text extraction.
//!
//! Text comes from `pdf-extract`, document info from `lopdf`. Extraction is
//! fail-soft: a broken file yields empty text and a zero page count, which
//! the upload pipeline then treats as a candidate for OCR.

use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use lopdf::{Dictionary, Document, Object};
use regex::Regex;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};

/// Only the head of the file is inspected by the image-only pre-check.
const SAMPLE_BYTES: usize = 32 * 1024;
const MIN_TEXTUAL_RATIO: f64 = 0.015;
const TEXT_MARKERS: [&str; 4] = ["/Font", "/ToUnicode", "BT", "Tf"];

lazy_static! {
    static ref ASCII_RUNS: Regex = Regex::new(r"[A-Za-z0-9]{3,}").unwrap();
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modification_date: Option<NaiveDateTime>,
    pub page_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedDocument {
    pub text: String,
    pub metadata: PdfMetadata,
}

impl ParsedDocument {
    /// The fail-soft result: no text, no pages.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Turns PDF bytes into text and metadata. Implementations must not fail;
/// internal errors are reported as an empty document.
pub trait PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> ParsedDocument;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedTextExtractor;

impl PdfExtractor for EmbeddedTextExtractor {
    fn extract(&self, bytes: &[u8]) -> ParsedDocument {
        if is_likely_image_only(bytes) {
            log::debug!("skipping text extraction, document looks image-only");
            return ParsedDocument::empty();
        }

        match extract_embedded(bytes) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("embedded text extraction degraded: {:#}", e);
                ParsedDocument::empty()
            }
        }
    }
}

fn extract_embedded(bytes: &[u8]) -> anyhow::Result<ParsedDocument> {
    let document = Document::load_mem(bytes)
        .map_err(|e| anyhow::anyhow!("failed to load PDF structure: {}", e))?;

    let mut metadata = read_metadata(&document);
    metadata.page_count = document.get_pages().len();

    // pdf-extract panics on some malformed content streams
    let text = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)))
        .map_err(|_| anyhow::anyhow!("pdf-extract panicked while reading text"))?
        .map_err(|e| anyhow::anyhow!("failed to extract text: {}", e))?;

    Ok(ParsedDocument {
        text: text.trim().to_string(),
        metadata,
    })
}

fn read_metadata(document: &Document) -> PdfMetadata {
    let info = document
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|info| resolve_dict(document, info));

    let Some(info) = info else {
        return PdfMetadata::default();
    };

    PdfMetadata {
        title: info_string(info, b"Title"),
        author: info_string(info, b"Author"),
        creator: info_string(info, b"Creator"),
        producer: info_string(info, b"Producer"),
        subject: info_string(info, b"Subject"),
        keywords: info_string(info, b"Keywords"),
        creation_date: info_string(info, b"CreationDate").and_then(|d| parse_pdf_date(&d)),
        modification_date: info_string(info, b"ModDate").and_then(|d| parse_pdf_date(&d)),
        page_count: 0,
    }
}

fn resolve_dict<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    match object.as_reference() {
        Ok(id) => document.get_object(id).ok()?.as_dict().ok(),
        Err(_) => object.as_dict().ok(),
    }
}

fn info_string(info: &Dictionary, key: &[u8]) -> Option<String> {
    let bytes = info.get(key).ok()?.as_str().ok()?;
    let value = decode_pdf_string(bytes);
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Text strings are either UTF-16BE with a byte order mark or single-byte.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Parses `D:YYYYMMDDHHmmSS` (offset suffix ignored). Missing trailing
/// components default to the start of the period.
pub fn parse_pdf_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    let raw = raw.strip_prefix("D:").unwrap_or(raw);
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() < 4 {
        return None;
    }

    // pad month/day with 01 and time with 0
    const FILL: &str = "00000101000000";
    let mut padded = digits.chars().take(14).collect::<String>();
    padded.push_str(&FILL[padded.len()..]);

    NaiveDateTime::parse_from_str(&padded, "%Y%m%d%H%M%S").ok()
}

/// Cheap scan of the file head: image-only scans tend to have almost no
/// alphanumeric runs and none of the text operators.
pub fn is_likely_image_only(bytes: &[u8]) -> bool {
    let sample_len = bytes.len().min(SAMPLE_BYTES);
    if sample_len == 0 {
        return true;
    }

    // latin1 keeps one char per byte
    let sample: String = bytes[..sample_len].iter().map(|&b| b as char).collect();

    let ascii_chars: usize = ASCII_RUNS.find_iter(&sample).map(|m| m.len()).sum();

    let ratio = ascii_chars as f64 / sample_len as f64;
    let has_text_markers = TEXT_MARKERS.iter().any(|marker| sample.contains(marker));

    ratio < MIN_TEXTUAL_RATIO && !has_text_markers
}
