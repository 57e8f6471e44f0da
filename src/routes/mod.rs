//! Route modules for the OCR server

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod extract;
pub mod formats;
pub mod health;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(health::router())
        .merge(formats::router())
        .merge(extract::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
