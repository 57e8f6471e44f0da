//! OCR Engines
//!
//! Defines the engine trait and the Tesseract CLI implementation.

use std::path::Path;
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;

use super::types::{OcrError, OcrWord};

/// Tesseract OCR engine mode (default: LSTM with legacy fallback)
pub const ENGINE_MODE: &str = "3";

/// Tesseract page segmentation mode (assume a single uniform block of text)
pub const PAGE_SEGMENTATION_MODE: &str = "6";

/// OCR engine trait
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Engine name for logging
    fn name(&self) -> &'static str;

    /// Check if the engine can be invoked
    async fn is_available(&self) -> bool;

    /// Recognize the text in a PNG-encoded image
    async fn recognize(&self, image_png: &[u8]) -> Result<String, OcrError>;

    /// Recognize a PNG-encoded image word by word, with per-word confidence
    async fn recognize_words(&self, image_png: &[u8]) -> Result<Vec<OcrWord>, OcrError>;
}

/// Tesseract OCR engine driven through its CLI
pub struct TesseractEngine {
    /// Binary to invoke
    command: String,
    /// Language pack passed with `-l`
    language: String,
}

impl TesseractEngine {
    pub fn new(command: &str, language: &str) -> Self {
        Self {
            command: command.to_string(),
            language: language.to_string(),
        }
    }

    /// Run tesseract on `image_png`, writing results to stdout.
    ///
    /// `output_config` selects an alternate output format such as `tsv`.
    async fn run(&self, image_png: &[u8], output_config: Option<&str>) -> Result<String, OcrError> {
        let scratch = tempfile::Builder::new().prefix("ocr-tesseract").tempdir()?;
        let input_path = scratch.path().join("input.png");
        tokio::fs::write(&input_path, image_png).await?;

        let output = self.command_for(&input_path, output_config)
            .output()
            .await
            .map_err(|e| {
                OcrError::EngineNotAvailable(format!("Failed to run {}: {}", self.command, e))
            })?;

        check_status(&self.command, &output)?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn command_for(&self, input_path: &Path, output_config: Option<&str>) -> Command {
        let mut command = Command::new(&self.command);
        command
            .arg(input_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--oem")
            .arg(ENGINE_MODE)
            .arg("--psm")
            .arg(PAGE_SEGMENTATION_MODE);
        if let Some(config) = output_config {
            command.arg(config);
        }
        command.kill_on_drop(true);
        command
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    async fn recognize(&self, image_png: &[u8]) -> Result<String, OcrError> {
        self.run(image_png, None).await
    }

    async fn recognize_words(&self, image_png: &[u8]) -> Result<Vec<OcrWord>, OcrError> {
        let tsv = self.run(image_png, Some("tsv")).await?;
        parse_tsv_words(&tsv)
    }
}

fn check_status(command: &str, output: &Output) -> Result<(), OcrError> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(OcrError::ProcessingError(format!(
        "{} exited with {}: {}",
        command,
        output.status,
        stderr.trim()
    )))
}

/// Tesseract TSV level for word rows
const WORD_LEVEL: &str = "5";

/// Parse tesseract's TSV report into words.
///
/// Only word-level rows are kept; rows without a text column are treated
/// as empty words so their confidence still reaches the caller.
pub fn parse_tsv_words(tsv: &str) -> Result<Vec<OcrWord>, OcrError> {
    let mut lines = tsv.lines();
    let header = lines
        .next()
        .ok_or_else(|| OcrError::ProcessingError("Empty TSV output".to_string()))?;

    let columns: Vec<&str> = header.split('\t').collect();
    let column = |name: &str| {
        columns
            .iter()
            .position(|c| c.trim() == name)
            .ok_or_else(|| OcrError::ProcessingError(format!("TSV output missing '{}' column", name)))
    };
    let level_col = column("level")?;
    let conf_col = column("conf")?;
    let text_col = column("text")?;

    let mut words = Vec::new();
    for line in lines.filter(|l| !l.trim().is_empty()) {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.get(level_col).map(|l| l.trim()) != Some(WORD_LEVEL) {
            continue;
        }

        let confidence = fields
            .get(conf_col)
            .and_then(|c| c.trim().parse::<f64>().ok())
            .unwrap_or(-1.0);
        let text = fields.get(text_col).map(|t| t.trim()).unwrap_or_default();

        words.push(OcrWord {
            text: text.to_string(),
            confidence,
        });
    }

    Ok(words)
}

/// Mock engine for testing
#[cfg(test)]
pub struct MockEngine {
    /// Texts returned by successive `recognize` calls, cycling
    pub texts: Vec<String>,
    pub words: Vec<OcrWord>,
    pub available: bool,
    pub fail_with: Option<String>,
    /// Fail only the per-word call
    pub fail_words: bool,
    pub calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockEngine {
    pub fn with_text(text: &str) -> Self {
        Self::with_pages(&[text])
    }

    pub fn with_pages(texts: &[&str]) -> Self {
        Self {
            texts: texts.iter().map(|t| t.to_string()).collect(),
            words: Vec::new(),
            available: true,
            fail_with: None,
            fail_words: false,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::with_text("")
        }
    }

    pub fn words(mut self, words: &[(&str, f64)]) -> Self {
        self.words = words
            .iter()
            .map(|(text, confidence)| OcrWord {
                text: text.to_string(),
                confidence: *confidence,
            })
            .collect();
        self
    }

    pub fn failing_words(mut self) -> Self {
        self.fail_words = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl OcrEngine for MockEngine {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn recognize(&self, _image_png: &[u8]) -> Result<String, OcrError> {
        let call = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if let Some(message) = &self.fail_with {
            return Err(OcrError::ProcessingError(message.clone()));
        }
        Ok(self.texts.get(call % self.texts.len().max(1)).cloned().unwrap_or_default())
    }

    async fn recognize_words(&self, _image_png: &[u8]) -> Result<Vec<OcrWord>, OcrError> {
        if let Some(message) = &self.fail_with {
            return Err(OcrError::ProcessingError(message.clone()));
        }
        if self.fail_words {
            return Err(OcrError::ProcessingError("TSV output unavailable".to_string()));
        }
        Ok(self.words.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t
2\t1\t1\t0\t0\t0\t36\t92\t582\t269\t-1\t
4\t1\t1\t1\t1\t0\t36\t92\t283\t24\t-1\t
5\t1\t1\t1\t1\t1\t36\t92\t90\t24\t96.063751\tHello
5\t1\t1\t1\t1\t2\t136\t92\t120\t24\t88.5\tworld
5\t1\t1\t1\t1\t3\t266\t92\t10\t24\t-1\t
";

    #[test]
    fn test_parse_tsv_words() {
        let words = parse_tsv_words(SAMPLE_TSV).unwrap();
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].text, "Hello");
        assert!((words[0].confidence - 96.063751).abs() < 1e-6);
        assert_eq!(words[1].text, "world");
        assert_eq!(words[2].confidence, -1.0);
    }

    #[test]
    fn test_parse_tsv_header_only() {
        let header = SAMPLE_TSV.lines().next().unwrap();
        assert!(parse_tsv_words(header).unwrap().is_empty());
    }

    #[test]
    fn test_parse_tsv_rejects_garbage() {
        assert!(matches!(parse_tsv_words(""), Err(OcrError::ProcessingError(_))));
        assert!(matches!(
            parse_tsv_words("not\ta\ttsv\n"),
            Err(OcrError::ProcessingError(_))
        ));
    }

    #[test]
    fn test_command_line() {
        let engine = TesseractEngine::new("tesseract", "eng");
        let command = engine.command_for(Path::new("/tmp/in.png"), Some("tsv"));
        let args: Vec<String> = command
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            ["/tmp/in.png", "stdout", "-l", "eng", "--oem", "3", "--psm", "6", "tsv"]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let engine = TesseractEngine::new("definitely-not-a-real-tesseract-binary", "eng");
        assert!(!engine.is_available().await);

        let result = engine.recognize(&[0u8; 4]).await;
        assert!(matches!(result, Err(OcrError::EngineNotAvailable(_))));
    }
}
