pub mod health;
pub mod parser;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Headroom over the upload limit for multipart boundaries and part headers,
/// so that oversized files get the JSON size error instead of a bare 413.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/parser", post(parser::handle_parse_pdf))
        .route("/api/parser/text", post(parser::handle_parse_text))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
