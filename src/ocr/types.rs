//! OCR Types
//!
//! Defines recognition results and errors shared by engines and the service.

use serde::Serialize;

/// Single word reported by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct OcrWord {
    /// Word text
    pub text: String,
    /// Confidence for this word (0-100, -1 when the engine has none)
    pub confidence: f64,
}

/// Aggregate confidence over the recognized words of an image
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Confidence {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl Confidence {
    /// Summarize scores, ignoring the engine's "no confidence" values (<= 0).
    ///
    /// Returns `None` when no positive score remains.
    pub fn from_scores<I>(scores: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for score in scores.into_iter().filter(|s| *s > 0.0) {
            count += 1;
            sum += score;
            min = min.min(score);
            max = max.max(score);
        }

        if count == 0 {
            return None;
        }

        Some(Self {
            mean: sum / count as f64,
            min,
            max,
        })
    }

    pub fn from_words(words: &[OcrWord]) -> Option<Self> {
        Self::from_scores(words.iter().map(|w| w.confidence))
    }
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR engine not available: {0}")]
    EngineNotAvailable(String),

    #[error("Failed to decode image: {0}")]
    ImageDecodeError(String),

    #[error("Failed to rasterize PDF: {0}")]
    RasterizeError(String),

    #[error("OCR processing failed: {0}")]
    ProcessingError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
