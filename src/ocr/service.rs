//! OCR Service
//!
//! Dispatches uploads to the image or PDF path and drives the engine.

use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat};

use super::{
    provider::{OcrEngine, TesseractEngine},
    rasterizer::{PdfRasterizer, PdftoppmRasterizer},
    types::{Confidence, OcrError},
};
use crate::config::OcrConfig;

/// OCR service for uploaded images and PDFs
#[derive(Clone)]
pub struct OcrService {
    engine: Arc<dyn OcrEngine>,
    rasterizer: Arc<dyn PdfRasterizer>,
}

impl OcrService {
    /// Create a service backed by tesseract and pdftoppm
    pub fn new(config: &OcrConfig) -> Self {
        Self::with_backends(
            Arc::new(TesseractEngine::new(&config.tesseract_cmd, &config.language)),
            Arc::new(PdftoppmRasterizer::new(&config.pdftoppm_cmd, config.pdf_dpi)),
        )
    }

    pub fn with_backends(engine: Arc<dyn OcrEngine>, rasterizer: Arc<dyn PdfRasterizer>) -> Self {
        Self { engine, rasterizer }
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub async fn engine_available(&self) -> bool {
        self.engine.is_available().await
    }

    /// Recognize a single image of any supported format
    pub async fn extract_image(&self, data: &[u8]) -> Result<String, OcrError> {
        let png = normalize_image(data).await?;
        let text = self.engine.recognize(&png).await?;
        Ok(text.trim().to_string())
    }

    /// Rasterize a PDF and recognize it page by page.
    ///
    /// Pages with no text are left out; the markers keep the original page
    /// numbers.
    pub async fn extract_pdf(&self, data: &[u8]) -> Result<String, OcrError> {
        let pages = self.rasterizer.rasterize(data).await?;
        let total = pages.len();

        let mut sections = Vec::with_capacity(total);
        for (index, page) in pages.iter().enumerate() {
            tracing::info!("Processing page {}/{}", index + 1, total);
            let text = self.engine.recognize(page).await?;
            let text = text.trim();
            if !text.is_empty() {
                sections.push(format!("--- Page {} ---\n{}", index + 1, text));
            }
        }

        Ok(sections.join("\n\n"))
    }

    /// Per-word confidence statistics for a single image
    pub async fn image_confidence(&self, data: &[u8]) -> Result<Option<Confidence>, OcrError> {
        let png = normalize_image(data).await?;
        let words = self.engine.recognize_words(&png).await?;
        Ok(Confidence::from_words(&words))
    }
}

/// Decode an image, convert it to 8-bit RGB and re-encode it as PNG.
pub async fn normalize_image(data: &[u8]) -> Result<Vec<u8>, OcrError> {
    let data = data.to_vec();
    tokio::task::spawn_blocking(move || to_rgb_png(&data))
        .await
        .map_err(|e| OcrError::ProcessingError(format!("Image task failed: {}", e)))?
}

fn to_rgb_png(data: &[u8]) -> Result<Vec<u8>, OcrError> {
    let img = image::load_from_memory(data)
        .map_err(|e| OcrError::ImageDecodeError(e.to_string()))?;

    let rgb = if matches!(img, DynamicImage::ImageRgb8(_)) {
        img
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };

    let mut buffer = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| OcrError::ProcessingError(format!("Failed to encode image: {}", e)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{MockEngine, MockRasterizer};
    use crate::test_support::{sample_image, sample_png};

    fn service(engine: MockEngine, pages: usize) -> (OcrService, Arc<MockEngine>) {
        let engine = Arc::new(engine);
        let service = OcrService::with_backends(
            engine.clone(),
            Arc::new(MockRasterizer::with_pages(pages)),
        );
        (service, engine)
    }

    #[tokio::test]
    async fn test_normalize_converts_to_rgb() {
        for format in [ImageFormat::Png, ImageFormat::Gif, ImageFormat::Bmp, ImageFormat::Tiff] {
            let png = normalize_image(&sample_image(format)).await.unwrap();
            let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
            assert_eq!(decoded.color(), image::ColorType::Rgb8, "{:?}", format);
        }
    }

    #[tokio::test]
    async fn test_normalize_rejects_garbage() {
        let result = normalize_image(b"definitely not an image").await;
        assert!(matches!(result, Err(OcrError::ImageDecodeError(_))));
    }

    #[tokio::test]
    async fn test_extract_image_trims() {
        let (service, engine) = service(MockEngine::with_text("\n  Hello OCR  \n\n"), 0);
        let text = service.extract_image(&sample_png()).await.unwrap();
        assert_eq!(text, "Hello OCR");
        assert_eq!(engine.call_count(), 1);
    }

    #[tokio::test]
    async fn test_extract_pdf_marks_pages() {
        let (service, engine) = service(MockEngine::with_pages(&["first", " \n", "third\n"]), 3);
        let text = service.extract_pdf(b"%PDF").await.unwrap();
        assert_eq!(text, "--- Page 1 ---\nfirst\n\n--- Page 3 ---\nthird");
        assert_eq!(engine.call_count(), 3);
    }

    #[tokio::test]
    async fn test_extract_pdf_no_pages() {
        let (service, _) = service(MockEngine::with_text("unused"), 0);
        assert_eq!(service.extract_pdf(b"%PDF").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_extract_pdf_page_failure_aborts() {
        let (service, _) = service(MockEngine::failing("engine crashed"), 2);
        let result = service.extract_pdf(b"%PDF").await;
        assert!(matches!(result, Err(OcrError::ProcessingError(msg)) if msg == "engine crashed"));
    }

    #[tokio::test]
    async fn test_extract_pdf_rasterize_failure() {
        let service = OcrService::with_backends(
            Arc::new(MockEngine::with_text("unused")),
            Arc::new(MockRasterizer::failing("not a pdf")),
        );
        let result = service.extract_pdf(b"junk").await;
        assert!(matches!(result, Err(OcrError::RasterizeError(_))));
    }

    #[tokio::test]
    async fn test_image_confidence() {
        let engine = MockEngine::with_text("Hello world").words(&[("", -1.0), ("Hello", 90.0), ("world", 70.0)]);
        let (service, _) = service(engine, 0);
        let conf = service.image_confidence(&sample_png()).await.unwrap().unwrap();
        assert_eq!(conf.min, 70.0);
        assert_eq!(conf.max, 90.0);
        assert_eq!(conf.mean, 80.0);
    }
}
