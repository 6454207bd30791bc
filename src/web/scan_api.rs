//! Handlers of the `/scan` and `/probe` routes.
//!
//! Each handler opens one unit of work, runs the controller on it and finishes it with the
//! controller's outcome.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{ConnectInfo, Multipart, Path, Query, State};
use log::{debug, warn};

use crate::controllers::scan_controller::Progress;
use crate::errors::{ApiError, ApiResult};
use crate::database::unit_of_work::UnitOfWork;
use crate::helpers::validation::{parse_force, parse_formatted, parse_probe_list};
use crate::web::response::ApiResponse;
use crate::web::state::AppState;

type Params = Query<HashMap<String, String>>;

fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params.get(name).map(String::as_str)
}

pub async fn probe_list(State(state): State<AppState>) -> ApiResult<ApiResponse> {
    let probes = state.scans.probe_list().await?;
    Ok(ApiResponse::success().with("probe_list", probes))
}

pub async fn new_scan(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> ApiResult<ApiResponse> {
    let unit = state
        .db
        .begin()
        .await
        .map_err(|err| ApiError::BackendUnavailable(err.to_string()))?;
    let outcome = state.scans.new_scan(&unit, Some(addr.ip().to_string())).await;
    let scan_id = unit.finish(outcome).await?;
    Ok(ApiResponse::success().with("scan_id", scan_id))
}

/// Reads the file parts of the form. Plain form fields are skipped.
async fn read_files(mut multipart: Multipart) -> ApiResult<Vec<(String, Vec<u8>)>> {
    let invalid = |err: axum::extract::multipart::MultipartError| {
        ApiError::InvalidParameter(format!("malformed upload: {}", err.body_text()))
    };
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let Some(name) = field.file_name().map(str::to_owned) else {
            debug!(
                "Skipped form field {} without file name.",
                field.name().unwrap_or_default()
            );
            continue;
        };
        let content = field.bytes().await.map_err(invalid)?;
        debug!("Received upload {} ({} bytes).", name, content.len());
        files.push((name, content.to_vec()));
    }
    Ok(files)
}

pub async fn add_files(
    State(state): State<AppState>,
    Path(scan_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ApiResponse> {
    let multipart = multipart.map_err(|err| ApiError::InvalidParameter(err.body_text()))?;
    let files = read_files(multipart).await?;
    let unit = state.db.begin().await?;
    let outcome = state.scans.add_files(&unit, &scan_id, files).await;
    let nb_files = unit.finish(outcome).await?;
    Ok(ApiResponse::success().with("nb_files", nb_files))
}

/// Commits a launch. The brain already runs the scan at this point, so a failing commit leaves
/// it running while the scan stays unlaunched here.
async fn finish_launch(
    unit: UnitOfWork,
    scan_id: &str,
    outcome: ApiResult<Vec<String>>,
) -> ApiResult<Vec<String>> {
    let launched = outcome.is_ok();
    unit.finish(outcome).await.inspect_err(|err| {
        if launched {
            warn!(
                "Scan {} runs on the brain but its launch could not be recorded! Error: {}",
                scan_id, err
            );
        }
    })
}

pub async fn launch(
    State(state): State<AppState>,
    Path(scan_id): Path<String>,
    Query(params): Params,
) -> ApiResult<ApiResponse> {
    let force = parse_force(param(&params, "force"));
    let probes = parse_probe_list(param(&params, "probe"));
    let unit = state.db.begin().await?;
    let outcome = state.scans.launch(&unit, &scan_id, force, probes).await;
    let probe_list = finish_launch(unit, &scan_id, outcome).await?;
    state.scans.notify_launch(&scan_id);
    Ok(ApiResponse::success().with("probe_list", probe_list))
}

pub async fn progress(
    State(state): State<AppState>,
    Path(scan_id): Path<String>,
) -> ApiResult<ApiResponse> {
    let unit = state.db.begin().await?;
    let outcome = state.scans.progress(&unit, &scan_id).await;
    Ok(match unit.finish(outcome).await? {
        Progress::Status(status) => ApiResponse::warning(status.to_string()),
        Progress::Details(details) => ApiResponse::success().with("progress_details", details),
    })
}

pub async fn cancel(
    State(state): State<AppState>,
    Path(scan_id): Path<String>,
) -> ApiResult<ApiResponse> {
    let unit = state.db.begin().await?;
    let outcome = state.scans.cancel(&unit, &scan_id).await;
    let details = unit.finish(outcome).await?;
    Ok(ApiResponse::success().with("cancel_details", details))
}

pub async fn finished(
    State(state): State<AppState>,
    Path(scan_id): Path<String>,
) -> ApiResult<ApiResponse> {
    let unit = state.db.begin().await?;
    let outcome = state.scans.finished(&unit, &scan_id).await;
    Ok(if unit.finish(outcome).await? {
        ApiResponse::success_msg("finished")
    } else {
        ApiResponse::warning("not finished")
    })
}

pub async fn info(
    State(state): State<AppState>,
    Path(scan_id): Path<String>,
) -> ApiResult<ApiResponse> {
    let unit = state.db.begin().await?;
    let outcome = state.scans.info(&unit, &scan_id).await;
    let scan_info = unit.finish(outcome).await?;
    Ok(ApiResponse::success().with("scan_info", scan_info))
}

pub async fn results(
    State(state): State<AppState>,
    Path(scan_id): Path<String>,
    Query(params): Params,
) -> ApiResult<ApiResponse> {
    let formatted = parse_formatted(param(&params, "formatted"));
    let unit = state.db.begin().await?;
    let outcome = state.scans.results(&unit, &scan_id, formatted).await;
    let scan_results = unit.finish(outcome).await?;
    Ok(ApiResponse::success().with("scan_results", scan_results))
}

pub async fn result(
    State(state): State<AppState>,
    Path((scan_id, file_index)): Path<(String, String)>,
    Query(params): Params,
) -> ApiResult<ApiResponse> {
    let formatted = parse_formatted(param(&params, "formatted"));
    let unit = state.db.begin().await?;
    let outcome = state
        .scans
        .result(&unit, &scan_id, &file_index, formatted)
        .await;
    let results = unit.finish(outcome).await?;
    Ok(ApiResponse::success().with("results", results))
}
