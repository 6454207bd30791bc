//! Fixtures shared by the unit tests

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ConnectOptions, Database};

use crate::controllers::scan_controller::ScanController;
use crate::database::models::scan::ScanStatus;
use crate::database::models::{file, file_web, scan};
use crate::database::service::DatabaseImplementation;
use crate::database::service_trait::{DatabaseTrait, FileWebRecord};
use crate::external_api::scan_control::MockScanControl;
use crate::external_api::task_service::MockTaskSubmitter;
use crate::filesystem::file_storage::FileStorage;
use crate::helpers::hash::hash_bytes;

pub const SCAN_ID: &str = "8c5e3a9a-0d4f-4b8e-9f1a-2b3c4d5e6f70";

/// Fresh in-memory SQLite database with all tables. One pooled connection keeps the
/// database alive for the whole test.
pub async fn memory_db() -> DatabaseImplementation {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = DatabaseImplementation {
        db: Database::connect(options).await.expect("in-memory sqlite"),
    };
    db.create_tables().await.expect("tables");
    db
}

pub fn controller(
    control: MockScanControl,
    tasks: MockTaskSubmitter,
    storage: FileStorage,
) -> ScanController {
    ScanController::new(
        Arc::new(control),
        Arc::new(tasks),
        storage,
        Duration::from_secs(1),
        1024 * 1024,
    )
}

pub fn file_model(id: i32, content: &[u8]) -> file::Model {
    let hashes = hash_bytes(content);
    let now = Utc::now().naive_utc();
    file::Model {
        id,
        sha256: hashes.sha256,
        sha1: hashes.sha1,
        md5: hashes.md5,
        size: content.len() as i64,
        path: None,
        timestamp_first_scan: now,
        timestamp_last_scan: now,
    }
}

pub fn file_web_record(idx: i32, name: &str) -> FileWebRecord {
    FileWebRecord {
        file_web: file_web::Model {
            id: idx + 1,
            scan_file_idx: idx,
            name: name.to_owned(),
            file_id: 1,
            scan_id: 1,
        },
        file: file_model(1, name.as_bytes()),
        scan_id: SCAN_ID.to_owned(),
        probe_results: vec![],
    }
}

/// Inserts a scan with the given external id and status and commits it.
pub async fn insert_scan(
    db: &DatabaseImplementation,
    external_id: &str,
    status: ScanStatus,
) -> scan::Model {
    let unit = db.begin().await.expect("unit");
    let scan = unit
        .insert_scan(scan::ActiveModel {
            id: NotSet,
            external_id: Set(external_id.to_owned()),
            status: Set(status),
            date: Set(Utc::now().naive_utc()),
            ip: Set(Some("127.0.0.1".to_owned())),
            probes_total: Set(0),
            probes_finished: Set(0),
        })
        .await
        .expect("scan");
    unit.finish::<_, sea_orm::DbErr>(Ok(scan))
        .await
        .expect("commit")
}

/// Attaches one file per name to a scan, directly in the database, and commits.
pub async fn insert_files(db: &DatabaseImplementation, scan: &scan::Model, names: &[&str]) {
    let unit = db.begin().await.expect("unit");
    for (idx, name) in names.iter().enumerate() {
        let model = file_model(0, name.as_bytes());
        let file = unit
            .insert_file(file::ActiveModel {
                id: NotSet,
                sha256: Set(model.sha256),
                sha1: Set(model.sha1),
                md5: Set(model.md5),
                size: Set(model.size),
                path: Set(None),
                timestamp_first_scan: Set(model.timestamp_first_scan),
                timestamp_last_scan: Set(model.timestamp_last_scan),
            })
            .await
            .expect("file");
        unit.insert_file_web(file_web::ActiveModel {
            id: NotSet,
            scan_file_idx: Set(idx as i32),
            name: Set((*name).to_owned()),
            file_id: Set(file.id),
            scan_id: Set(scan.id),
        })
        .await
        .expect("file web");
    }
    unit.finish::<_, sea_orm::DbErr>(Ok(()))
        .await
        .expect("commit");
}
