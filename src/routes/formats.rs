//! Supported formats endpoint

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;
use crate::upload::{ALLOWED_EXTENSIONS, MAX_FILE_SIZE_LABEL};

#[derive(Serialize)]
pub struct SupportedFormatsResponse {
    pub supported_formats: &'static [&'static str],
    pub max_file_size: &'static str,
}

pub async fn supported_formats() -> Json<SupportedFormatsResponse> {
    Json(SupportedFormatsResponse {
        supported_formats: ALLOWED_EXTENSIONS.as_slice(),
        max_file_size: MAX_FILE_SIZE_LABEL,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/supported-formats", get(supported_formats))
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;

    use crate::ocr::MockEngine;
    use crate::test_support::mock_state;

    #[tokio::test]
    async fn test_supported_formats() {
        let server = TestServer::new(crate::routes::app(mock_state(MockEngine::with_text(""), 0))).unwrap();

        let response = server.get("/supported-formats").await;
        response.assert_status_ok();
        response.assert_json(&serde_json::json!({
            "supported_formats": ["png", "jpg", "jpeg", "gif", "bmp", "tiff", "pdf"],
            "max_file_size": "16MB",
        }));
    }
}
