//! Application state management

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::ocr::OcrService;

/// Error type for state initialization
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pub config: Config,
    pub ocr: OcrService,
    pub http_client: reqwest::Client,
}

impl AppState {
    /// Create a new application state
    ///
    /// The HTTP client used for remote images carries the configured fetch
    /// timeout.
    pub fn new(config: Config, ocr: OcrService) -> Result<Self, StateError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch.timeout_secs))
            .build()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                ocr,
                http_client,
            }),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the OCR service
    pub fn ocr(&self) -> &OcrService {
        &self.inner.ocr
    }

    /// Get the client used to download remote images
    pub fn http_client(&self) -> &reqwest::Client {
        &self.inner.http_client
    }
}
