//! Interface of the database operations

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use sea_orm::DbErr;

use crate::database::models::{file, file_web, probe_result, scan};
use crate::helpers::hash::HashType;

/// Filter of a file search. An empty name matches every file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileWebFilter {
    /// Substring match on the display name
    Name(String),
    /// Equality on one of the content hashes, value in lower case
    Hash(HashType, String),
}

/// A [FileWeb][file_web::Model] with everything needed to render it.
#[derive(Clone, Debug, PartialEq)]
pub struct FileWebRecord {
    pub file_web: file_web::Model,
    pub file: file::Model,
    /// External id of the owning scan
    pub scan_id: String,
    pub probe_results: Vec<probe_result::Model>,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait DatabaseTrait: Send + Sync {
    async fn insert_scan(&self, scan: scan::ActiveModel) -> Result<scan::Model, DbErr>;
    async fn get_scan_by_external_id(&self, external_id: &str)
        -> Result<Option<scan::Model>, DbErr>;
    async fn update_scan(&self, scan: scan::ActiveModel) -> Result<scan::Model, DbErr>;
    async fn get_file_by_sha256(&self, sha256: &str) -> Result<Option<file::Model>, DbErr>;
    async fn insert_file(&self, file: file::ActiveModel) -> Result<file::Model, DbErr>;
    async fn update_file(&self, file: file::ActiveModel) -> Result<file::Model, DbErr>;
    async fn insert_file_web(
        &self,
        file_web: file_web::ActiveModel,
    ) -> Result<file_web::Model, DbErr>;
    async fn count_file_webs_of_scan(&self, scan_id: i32) -> Result<u64, DbErr>;
    async fn get_file_webs_of_scan(&self, scan: &scan::Model)
        -> Result<Vec<FileWebRecord>, DbErr>;
    async fn get_file_web_of_scan(
        &self,
        scan: &scan::Model,
        scan_file_idx: i32,
    ) -> Result<Option<FileWebRecord>, DbErr>;
    async fn insert_pending_probe_result(
        &self,
        file_web: &file_web::Model,
        probe_name: &str,
    ) -> Result<probe_result::Model, DbErr>;
    async fn find_file_webs(
        &self,
        filter: &FileWebFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<FileWebRecord>, DbErr>;
    async fn count_file_webs(&self, filter: &FileWebFilter) -> Result<u64, DbErr>;
}
