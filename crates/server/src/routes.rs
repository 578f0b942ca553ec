pub mod students;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use common::types::Health;
use configs::StorageConfig;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

/// Headroom over the photo ceiling for the text fields and multipart framing.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// Build the full application router: pages, form endpoints, and file servers.
pub fn build_router(state: AppState, storage: &StorageConfig, cors: CorsLayer) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES);

    let pages = Router::new()
        .route("/", get(students::index))
        .route("/all_students", get(students::all_students))
        .route("/display", post(students::display_student))
        .route("/delete", post(students::delete_student))
        .route(
            "/add",
            post(students::add_student).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/health", get(health));

    let files = Router::new()
        .nest_service("/static", ServeDir::new(&storage.static_dir))
        .nest_service("/uploads", ServeDir::new(&storage.uploads_dir));

    pages
        .with_state(state)
        .merge(files)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
