//! Handlers of the `/search` and `/file` routes

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::controllers::search_controller::{self, SearchPage, SearchQuery, DEFAULT_LIMIT};
use crate::errors::ApiResult;
use crate::helpers::validation::parse_unsigned;
use crate::web::state::AppState;

pub async fn search_files(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<SearchPage>> {
    let query = SearchQuery {
        name: params.get("name").cloned(),
        hash: params.get("hash").cloned(),
        offset: parse_unsigned("offset", params.get("offset").map(String::as_str), 0)?,
        limit: parse_unsigned(
            "limit",
            params.get("limit").map(String::as_str),
            DEFAULT_LIMIT,
        )?,
    };
    let unit = state.db.begin().await?;
    let outcome = search_controller::search_files(&unit, query).await;
    Ok(Json(unit.finish(outcome).await?))
}

/// Sends the stored file as an attachment named after its sha256.
pub async fn download_file(
    State(state): State<AppState>,
    Path(sha256): Path<String>,
) -> ApiResult<Response> {
    let unit = state.db.begin().await?;
    let outcome = search_controller::get_file(&unit, state.scans.storage(), &sha256).await;
    let content = unit.finish(outcome).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", sha256.to_ascii_lowercase()),
            ),
        ],
        content,
    )
        .into_response())
}
