pub mod analyze;
pub mod health;
pub mod report;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::AppState;
use crate::error::AppError;

/// Request bodies carry pasted text or a full result set.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

pub fn create_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    let router = Router::new()
        .route(
            "/api/analyze/{dimension}",
            post(analyze::analyze).fallback(method_not_allowed),
        )
        .route(
            "/api/generate-pdf",
            post(report::generate_pdf).fallback(method_not_allowed),
        )
        .route("/api/health", get(health::health).post(health::health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    let router = match static_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Serving static frontend");
            router.fallback_service(ServeDir::new(dir))
        }
        None => router,
    };

    router.with_state(state)
}
