//! Shared fixtures for unit tests

use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

use crate::config::Config;
use crate::ocr::{MockEngine, MockRasterizer, OcrService};
use crate::state::AppState;

/// Small image encoded in `format`; alpha is included where the encoder supports it.
pub fn sample_image(format: ImageFormat) -> Vec<u8> {
    let img = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([240, 240, 240]))),
        _ => DynamicImage::ImageRgba8(RgbaImage::from_fn(8, 8, |x, _| {
            if x < 4 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 128])
            }
        })),
    };

    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
    buffer
}

pub fn sample_png() -> Vec<u8> {
    sample_image(ImageFormat::Png)
}

/// Application state wired to mock backends
pub fn mock_state(engine: MockEngine, pdf_pages: usize) -> AppState {
    let ocr = OcrService::with_backends(
        Arc::new(engine),
        Arc::new(MockRasterizer::with_pages(pdf_pages)),
    );
    AppState::new(Config::default(), ocr).unwrap()
}
