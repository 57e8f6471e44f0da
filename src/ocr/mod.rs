//! OCR Module
//!
//! Text extraction for uploaded images and PDFs.
//!
//! Backends:
//! - Tesseract CLI for recognition (plain text and per-word TSV)
//! - pdftoppm (poppler) for rasterizing PDF pages
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ocr_server::config::OcrConfig;
//! use ocr_server::ocr::OcrService;
//!
//! let service = OcrService::new(&config.ocr);
//!
//! let text = service.extract_image(&png_bytes).await?;
//! let confidence = service.image_confidence(&png_bytes).await?;
//! let pdf_text = service.extract_pdf(&pdf_bytes).await?;
//! ```

mod provider;
mod rasterizer;
mod service;
mod types;

pub use provider::{parse_tsv_words, OcrEngine, TesseractEngine};
pub use rasterizer::{PdfRasterizer, PdftoppmRasterizer};
pub use service::{normalize_image, OcrService};
pub use types::{Confidence, OcrError, OcrWord};

#[cfg(test)]
pub use provider::MockEngine;
#[cfg(test)]
pub use rasterizer::MockRasterizer;
