//! Route table of the service

use axum::extract::DefaultBodyLimit;
use axum::http::Uri;
use axum::routing::{get, post};
use axum::Router;

use crate::errors::ApiError;
use crate::web::response::ApiResponse;
use crate::web::state::AppState;
use crate::web::{scan_api, search_api};

async fn root() -> ApiResponse {
    ApiResponse::success()
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::RouteNotFound(uri.path().to_owned())
}

/// Builds the router.
/// * `body_limit` - Largest accepted request body, in bytes
pub fn create_router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/probe/list", get(scan_api::probe_list))
        .route("/search/files", get(search_api::search_files))
        .route("/file/{sha256}", get(search_api::download_file))
        .route("/scan/new", get(scan_api::new_scan).post(scan_api::new_scan))
        .route("/scan/add/{scan_id}", post(scan_api::add_files))
        .route(
            "/scan/launch/{scan_id}",
            get(scan_api::launch).post(scan_api::launch),
        )
        .route("/scan/progress/{scan_id}", get(scan_api::progress))
        .route(
            "/scan/cancel/{scan_id}",
            get(scan_api::cancel).post(scan_api::cancel),
        )
        .route("/scan/finished/{scan_id}", get(scan_api::finished))
        .route("/scan/info/{scan_id}", get(scan_api::info))
        .route("/scan/{scan_id}/results", get(scan_api::results))
        .route(
            "/scan/{scan_id}/results/{file_index}",
            get(scan_api::result),
        )
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
