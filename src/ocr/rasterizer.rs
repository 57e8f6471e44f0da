//! PDF Rasterizer
//!
//! Converts PDF bytes into one PNG image per page using poppler's `pdftoppm`.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use super::types::OcrError;

/// File stem given to rendered pages (`page-1.png`, `page-01.png`, ...)
const PAGE_PREFIX: &str = "page";

/// PDF rasterizer trait
#[async_trait]
pub trait PdfRasterizer: Send + Sync {
    /// Render every page of `pdf` to a PNG, in page order
    async fn rasterize(&self, pdf: &[u8]) -> Result<Vec<Vec<u8>>, OcrError>;
}

/// Rasterizer backed by the `pdftoppm` CLI
pub struct PdftoppmRasterizer {
    command: String,
    dpi: u32,
}

impl PdftoppmRasterizer {
    pub fn new(command: &str, dpi: u32) -> Self {
        Self {
            command: command.to_string(),
            dpi,
        }
    }
}

#[async_trait]
impl PdfRasterizer for PdftoppmRasterizer {
    async fn rasterize(&self, pdf: &[u8]) -> Result<Vec<Vec<u8>>, OcrError> {
        let scratch = tempfile::Builder::new().prefix("ocr-pdftoppm").tempdir()?;
        let input_path = scratch.path().join("input.pdf");
        tokio::fs::write(&input_path, pdf).await?;

        let output = Command::new(&self.command)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(&input_path)
            .arg(scratch.path().join(PAGE_PREFIX))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                OcrError::EngineNotAvailable(format!("Failed to run {}: {}", self.command, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::RasterizeError(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        let pages = collect_pages(scratch.path()).await?;
        tracing::debug!("Rasterized PDF into {} page(s) at {} dpi", pages.len(), self.dpi);
        Ok(pages)
    }
}

/// Read rendered page images from `dir`, ordered by page number.
async fn collect_pages(dir: &Path) -> Result<Vec<Vec<u8>>, OcrError> {
    let mut numbered = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if let Some(number) = name.to_str().and_then(page_number) {
            numbered.push((number, entry.path()));
        }
    }
    numbered.sort_by_key(|(number, _)| *number);

    let mut pages = Vec::with_capacity(numbered.len());
    for (_, path) in numbered {
        pages.push(tokio::fs::read(&path).await?);
    }
    Ok(pages)
}

/// Page number encoded in a pdftoppm output name such as `page-007.png`.
fn page_number(file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix(PAGE_PREFIX)?
        .strip_prefix('-')?
        .strip_suffix(".png")?
        .parse()
        .ok()
}

/// Mock rasterizer for testing
#[cfg(test)]
pub struct MockRasterizer {
    pub page_count: usize,
    pub fail_with: Option<String>,
}

#[cfg(test)]
impl MockRasterizer {
    pub fn with_pages(page_count: usize) -> Self {
        Self {
            page_count,
            fail_with: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            page_count: 0,
            fail_with: Some(message.to_string()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl PdfRasterizer for MockRasterizer {
    async fn rasterize(&self, _pdf: &[u8]) -> Result<Vec<Vec<u8>>, OcrError> {
        if let Some(message) = &self.fail_with {
            return Err(OcrError::RasterizeError(message.clone()));
        }
        Ok((0..self.page_count).map(|i| vec![i as u8]).collect())
    }
}
