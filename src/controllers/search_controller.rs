//! Lookup of already scanned files and download of their content

use std::io;

use log::{debug, info, warn};
use serde::Serialize;

use crate::controllers::formatter::{format_file_web, FileWebView};
use crate::database::service_trait::{DatabaseTrait, FileWebFilter};
use crate::errors::{ApiError, ApiResult};
use crate::filesystem::file_storage::FileStorage;
use crate::helpers::hash::guess_hash_type;
use crate::helpers::validation::{validate_hash, validate_sha256};

pub const DEFAULT_LIMIT: u64 = 25;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    pub name: Option<String>,
    pub hash: Option<String>,
    pub offset: u64,
    pub limit: u64,
}

impl Default for SearchQuery {
    fn default() -> Self {
        SearchQuery {
            name: None,
            hash: None,
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchPage {
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
    pub items: Vec<FileWebView>,
}

/// Empty parameters count as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn build_filter(query: &SearchQuery) -> ApiResult<FileWebFilter> {
    match (non_empty(query.name.clone()), non_empty(query.hash.clone())) {
        (Some(_), Some(_)) => Err(ApiError::AmbiguousQuery),
        (Some(name), None) => Ok(FileWebFilter::Name(name)),
        (None, Some(hash)) => {
            let hash_type = guess_hash_type(&hash).ok_or(ApiError::UnsupportedHash)?;
            validate_hash(&hash)?;
            Ok(FileWebFilter::Hash(hash_type, hash.to_ascii_lowercase()))
        }
        // no filter lists every file
        (None, None) => Ok(FileWebFilter::Name(String::new())),
    }
}

/// Searches files by name or by hash, one page at a time.
///
/// The total is only counted separately when the page does not already tell it, i.e. unless
/// the first page came back incomplete.
pub async fn search_files<D: DatabaseTrait>(db: &D, query: SearchQuery) -> ApiResult<SearchPage> {
    let filter = build_filter(&query)?;
    debug!(
        "Searching files with {:?}, offset {}, limit {}.",
        filter, query.offset, query.limit
    );
    let records = db.find_file_webs(&filter, query.offset, query.limit).await?;
    let total = if query.offset == 0 && (records.len() as u64) < query.limit {
        records.len() as u64
    } else {
        db.count_file_webs(&filter).await?
    };
    Ok(SearchPage {
        total,
        offset: query.offset,
        limit: query.limit,
        items: records
            .iter()
            .map(|record| format_file_web(record, true))
            .collect(),
    })
}

/// Content of the stored file with the given sha256
pub async fn get_file<D: DatabaseTrait>(
    db: &D,
    storage: &FileStorage,
    sha256: &str,
) -> ApiResult<Vec<u8>> {
    validate_sha256(sha256)?;
    let sha256 = sha256.to_ascii_lowercase();
    let file = db
        .get_file_by_sha256(&sha256)
        .await?
        .ok_or_else(|| ApiError::UnknownFile(sha256.clone()))?;
    let location = file
        .path
        .ok_or_else(|| ApiError::UnknownFile(sha256.clone()))?;
    let content = match storage.read(&location).await {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!("Stored bytes of file {} are missing at {}.", sha256, location);
            return Err(ApiError::UnknownFile(sha256));
        }
        Err(err) => return Err(err.into()),
    };
    info!("Serving file {} ({} bytes).", sha256, content.len());
    Ok(content)
}
