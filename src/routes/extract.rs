//! Text extraction endpoints
//!
//! - POST /extract-text - multipart upload (`file`, optional `include_confidence`)
//! - POST /extract-text-url - JSON `{ "url": ... }` pointing at an image

use axum::{
    body::Bytes,
    extract::{
        multipart::MultipartRejection,
        rejection::BytesRejection,
        DefaultBodyLimit, Multipart, State,
    },
    http::{header, HeaderMap},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::ocr::Confidence;
use crate::state::AppState;
use crate::upload::{allowed_file, file_extension, sanitized_upload_name, FileKind, MAX_FILE_SIZE};

// ============================================================================
// Types
// ============================================================================

/// Response for an uploaded file
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub filename: String,
    pub text: String,
    pub character_count: usize,
    pub word_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

/// Response for a remote image
#[derive(Debug, Serialize)]
pub struct UrlExtractResponse {
    pub url: String,
    pub text: String,
    pub character_count: usize,
    pub word_count: usize,
}

#[derive(Debug, Deserialize)]
struct UrlRequest {
    url: String,
}

/// File part of the upload form
struct UploadedFile {
    filename: String,
    data: Bytes,
}

/// Fields collected from the multipart form
#[derive(Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    include_confidence: bool,
}

/// Number of characters (not bytes) in `text`
pub fn character_count(text: &str) -> usize {
    text.chars().count()
}

/// Number of whitespace-delimited words in `text`
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

// ============================================================================
// Router
// ============================================================================

/// Create the extraction router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/extract-text", post(extract_text))
        .route("/extract-text-url", post(extract_text_url))
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /extract-text
async fn extract_text(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractResponse>> {
    if declared_length(&headers).is_some_and(|len| len > MAX_FILE_SIZE) {
        return Err(AppError::PayloadTooLarge);
    }

    // Anything that is not a multipart form carries no file.
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Upload is not a multipart form: {}", e.body_text());
        AppError::NoFile
    })?;

    let form = read_form(&mut multipart).await?;
    let upload = form.file.ok_or(AppError::NoFile)?;

    if upload.filename.is_empty() {
        return Err(AppError::NoFileSelected);
    }
    if !allowed_file(&upload.filename) {
        return Err(AppError::UnsupportedFileType);
    }

    let extension = file_extension(&upload.filename)
        .ok_or_else(|| AppError::Internal("Missing file extension".to_string()))?;
    let filename = sanitized_upload_name(&upload.filename, &extension);
    let kind = FileKind::from_extension(&extension);

    tracing::info!("Processing file: {}", filename);

    let ocr = state.ocr();
    let text = match kind {
        FileKind::Pdf => ocr.extract_pdf(&upload.data).await?,
        FileKind::Image => ocr.extract_image(&upload.data).await?,
    };

    let confidence = if form.include_confidence && kind == FileKind::Image {
        match ocr.image_confidence(&upload.data).await {
            Ok(confidence) => confidence,
            Err(e) => {
                tracing::warn!("Could not calculate confidence: {}", e);
                None
            }
        }
    } else {
        None
    };

    tracing::info!("Successfully processed {}", filename);

    Ok(Json(ExtractResponse {
        filename,
        character_count: character_count(&text),
        word_count: word_count(&text),
        text,
        confidence,
    }))
}

/// POST /extract-text-url
async fn extract_text_url(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<UrlExtractResponse>> {
    let body = body?;
    let request: UrlRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("Invalid URL request body: {}", e);
        AppError::UrlRequired
    })?;
    let url = request.url;

    tracing::info!(
        "Downloading image from {} (timeout {}s)",
        url,
        state.config().fetch.timeout_secs
    );

    let data = state
        .http_client()
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    tracing::debug!("Downloaded {} bytes from {}", data.len(), url);

    let text = state.ocr().extract_image(&data).await?;

    tracing::info!("Successfully processed {}", url);

    Ok(Json(UrlExtractResponse {
        url,
        character_count: character_count(&text),
        word_count: word_count(&text),
        text,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// Read the whole form; `include_confidence` may arrive before or after the file.
async fn read_form(multipart: &mut Multipart) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        let filename = field.file_name().map(|s| s.to_string());

        tracing::debug!("Received field: name='{}', filename={:?}", name, filename);

        match (name.as_str(), filename) {
            ("file", Some(filename)) if form.file.is_none() => {
                let data = field.bytes().await?;
                tracing::debug!("Read {} bytes of file data", data.len());
                form.file = Some(UploadedFile { filename, data });
            }
            ("include_confidence", _) => {
                form.include_confidence = field.text().await?.eq_ignore_ascii_case("true");
            }
            _ => {}
        }
    }

    Ok(form)
}
