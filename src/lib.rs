//! PDF ingestion for quiz lessons: embedded text extraction with an OCR
//! fallback, normalization into sections, and projection of generated lesson
//! plans into the quiz widget's state.

pub mod config;
pub mod error;
pub mod ingest;
pub mod pdf;
pub mod quiz;
