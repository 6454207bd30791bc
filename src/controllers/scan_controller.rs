//! Scan lifecycle: new, add files, launch, progress, cancel, finished and the result views.
//!
//! Every operation works on the [DatabaseTrait] it is given, normally the request's
//! [UnitOfWork][crate::database::unit_of_work::UnitOfWork], and validates the scan id before
//! anything is looked up. Calls to the brain are bounded by the configured timeout.

use std::collections::BTreeSet;
use std::future::Future;
use std::num::IntErrorKind;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{info, warn};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::IntoActiveModel;
use serde::Serialize;
use uuid::Uuid;

use crate::controllers::formatter::{
    format_file_result, format_file_web, FileResultView, FileWebView,
};
use crate::database::models::scan::ScanStatus;
use crate::database::models::{file, file_web, scan};
use crate::database::service_trait::DatabaseTrait;
use crate::errors::{ApiError, ApiResult};
use crate::external_api::scan_control::{
    CancelDetails, ControlError, LaunchRequest, ProgressDetails, ScanControl,
};
use crate::external_api::task_service::TaskSubmitter;
use crate::filesystem::file_storage::FileStorage;
use crate::helpers::hash::hash_bytes;
use crate::helpers::validation::{sanitize_filename, validate_scan_id};

/// Answer of [ScanController::progress]
#[derive(Clone, Debug, PartialEq)]
pub enum Progress {
    /// Scan is not running, only its status is known
    Status(ScanStatus),
    Details(ProgressDetails),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileHash {
    pub name: String,
    pub sha256: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScanInfo {
    pub probe_list: Vec<String>,
    pub finished: bool,
    pub file_hashes: Vec<FileHash>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScanResults {
    pub status: ScanStatus,
    pub finished: bool,
    pub total: usize,
    pub files: Vec<FileWebView>,
}

pub struct ScanController {
    control: Arc<dyn ScanControl>,
    tasks: Arc<dyn TaskSubmitter>,
    storage: FileStorage,
    timeout: Duration,
    file_size_limit: usize,
}

impl ScanController {
    /// * `timeout` - Upper bound of every call to `control`
    /// * `file_size_limit` - Largest accepted file, in bytes
    pub fn new(
        control: Arc<dyn ScanControl>,
        tasks: Arc<dyn TaskSubmitter>,
        storage: FileStorage,
        timeout: Duration,
        file_size_limit: usize,
    ) -> Self {
        ScanController {
            control,
            tasks,
            storage,
            timeout,
            file_size_limit,
        }
    }

    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, ControlError>>,
    ) -> ApiResult<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ApiError::BackendTimeout(self.timeout.as_secs())),
        }
    }

    /// Scan ids are stored in lower case; any casing of a valid id finds the scan.
    async fn load_scan<D: DatabaseTrait>(&self, db: &D, scan_id: &str) -> ApiResult<scan::Model> {
        validate_scan_id(scan_id)?;
        let scan_id = scan_id.to_ascii_lowercase();
        db.get_scan_by_external_id(&scan_id)
            .await?
            .ok_or_else(|| ApiError::UnknownScan(scan_id.clone()))
    }

    async fn set_status<D: DatabaseTrait>(
        &self,
        db: &D,
        scan: scan::Model,
        status: ScanStatus,
    ) -> ApiResult<scan::Model> {
        info!(
            "Scan {} moves from {} to {}.",
            scan.external_id, scan.status, status
        );
        let mut active = scan.into_active_model();
        active.status = Set(status);
        Ok(db.update_scan(active).await?)
    }

    /// Creates an empty scan and returns its new id.
    /// * `ip` - Address of the client that asked for it
    pub async fn new_scan<D: DatabaseTrait>(&self, db: &D, ip: Option<String>) -> ApiResult<String> {
        let external_id = Uuid::new_v4().to_string();
        db.insert_scan(scan::ActiveModel {
            id: NotSet,
            external_id: Set(external_id.clone()),
            status: Set(ScanStatus::Empty),
            date: Set(Utc::now().naive_utc()),
            ip: Set(ip),
            probes_total: Set(0),
            probes_finished: Set(0),
        })
        .await
        .map_err(|err| ApiError::BackendUnavailable(err.to_string()))?;
        info!("Created scan {}.", external_id);
        Ok(external_id)
    }

    /// Reuses the stored file with the same content or stores a new one.
    async fn ingest<D: DatabaseTrait>(&self, db: &D, content: &[u8]) -> ApiResult<file::Model> {
        let hashes = hash_bytes(content);
        let now = Utc::now().naive_utc();
        match db.get_file_by_sha256(&hashes.sha256).await? {
            Some(existing) => {
                let missing_bytes = existing.path.is_none();
                let mut active = existing.into_active_model();
                active.timestamp_last_scan = Set(now);
                if missing_bytes {
                    active.path = Set(Some(self.storage.store(&hashes.sha256, content).await?));
                }
                Ok(db.update_file(active).await?)
            }
            None => {
                let path = self.storage.store(&hashes.sha256, content).await?;
                Ok(db
                    .insert_file(file::ActiveModel {
                        id: NotSet,
                        sha256: Set(hashes.sha256),
                        sha1: Set(hashes.sha1),
                        md5: Set(hashes.md5),
                        size: Set(content.len() as i64),
                        path: Set(Some(path)),
                        timestamp_first_scan: Set(now),
                        timestamp_last_scan: Set(now),
                    })
                    .await?)
            }
        }
    }

    /// Attaches files to a scan that was not launched yet and returns how many files it has now.
    /// * `files` - Pairs of client file name and content
    pub async fn add_files<D: DatabaseTrait>(
        &self,
        db: &D,
        scan_id: &str,
        files: Vec<(String, Vec<u8>)>,
    ) -> ApiResult<u64> {
        let scan = self.load_scan(db, scan_id).await?;
        if !scan.status.accepts_files() {
            return Err(ApiError::InvalidState(format!(
                "can not add files to a {} scan",
                scan.status
            )));
        }
        if let Some((name, content)) = files
            .iter()
            .find(|(_, content)| content.len() > self.file_size_limit)
        {
            return Err(ApiError::InvalidParameter(format!(
                "file {} exceeds the size limit ({} > {} bytes)",
                name,
                content.len(),
                self.file_size_limit
            )));
        }

        let mut count = db.count_file_webs_of_scan(scan.id).await?;
        for (name, content) in files.iter() {
            let file = self.ingest(db, content).await?;
            let file_web = db
                .insert_file_web(file_web::ActiveModel {
                    id: NotSet,
                    scan_file_idx: Set(count as i32),
                    name: Set(sanitize_filename(name)),
                    file_id: Set(file.id),
                    scan_id: Set(scan.id),
                })
                .await?;
            info!(
                "Added file {} ({}) to scan {} at index {}.",
                file_web.name, file.sha256, scan.external_id, file_web.scan_file_idx
            );
            count += 1;
        }

        if !files.is_empty() && scan.status == ScanStatus::Empty {
            self.set_status(db, scan, ScanStatus::Ready).await?;
        }
        Ok(count)
    }

    /// Launches the probes on every file of the scan and returns the probes the brain used.
    ///
    /// The launch notification is not sent here; call [ScanController::notify_launch] once the
    /// unit of work is committed.
    /// * `probes` - Requested probe names, `None` for every registered probe
    pub async fn launch<D: DatabaseTrait>(
        &self,
        db: &D,
        scan_id: &str,
        force: bool,
        probes: Option<Vec<String>>,
    ) -> ApiResult<Vec<String>> {
        let scan = self.load_scan(db, scan_id).await?;
        if !scan.status.accepts_files() {
            return Err(ApiError::InvalidState(format!(
                "can not launch a {} scan",
                scan.status
            )));
        }
        let records = db.get_file_webs_of_scan(&scan).await?;
        if records.is_empty() {
            return Err(ApiError::EmptyScan(scan.external_id));
        }

        let available = self.bounded(self.control.probe_list()).await?;
        let probes = match probes {
            None => available,
            Some(requested) => {
                let unknown: Vec<&str> = requested
                    .iter()
                    .filter(|probe| !available.contains(probe))
                    .map(String::as_str)
                    .collect();
                if !unknown.is_empty() {
                    return Err(ApiError::UnknownProbe(unknown.join(", ")));
                }
                let mut seen = BTreeSet::new();
                requested
                    .into_iter()
                    .filter(|probe| seen.insert(probe.clone()))
                    .collect()
            }
        };

        let request = LaunchRequest {
            scan_id: scan.external_id.clone(),
            force,
            probes,
            files: records.iter().map(|record| record.file.sha256.clone()).collect(),
        };
        let used = self.bounded(self.control.launch(request)).await?;

        for record in records.iter() {
            for probe in used.iter() {
                db.insert_pending_probe_result(&record.file_web, probe).await?;
            }
        }

        let external_id = scan.external_id.clone();
        let mut active = scan.into_active_model();
        active.status = Set(ScanStatus::Launched);
        active.probes_total = Set((records.len() * used.len()) as i32);
        active.probes_finished = Set(0);
        db.update_scan(active).await?;
        info!(
            "Launched scan {} on {} file(s) with probes {:?}.",
            external_id,
            records.len(),
            used
        );
        Ok(used)
    }

    /// Queues the launch notification. A failure is logged and never undoes the launch.
    pub fn notify_launch(&self, scan_id: &str) {
        let scan_id = scan_id.to_ascii_lowercase();
        if let Err(err) = self.tasks.scan_launch(&scan_id) {
            warn!(
                "Launch notification for scan {} could not be queued! Error: {}",
                scan_id, err
            );
        }
    }

    pub async fn progress<D: DatabaseTrait>(&self, db: &D, scan_id: &str) -> ApiResult<Progress> {
        let scan = self.load_scan(db, scan_id).await?;
        if !scan.status.is_running() {
            return Ok(Progress::Status(scan.status));
        }
        let details = self.bounded(self.control.progress(&scan.external_id)).await?;
        Ok(Progress::Details(details))
    }

    pub async fn cancel<D: DatabaseTrait>(&self, db: &D, scan_id: &str) -> ApiResult<CancelDetails> {
        let scan = self.load_scan(db, scan_id).await?;
        let details = match scan.status {
            status if status.accepts_files() => CancelDetails::default(),
            status if status.is_running() => {
                self.bounded(self.control.cancel(&scan.external_id)).await?
            }
            ScanStatus::Processed | ScanStatus::Finished => {
                return Err(ApiError::InvalidState(
                    "can not cancel a finished scan".to_owned(),
                ))
            }
            ScanStatus::Cancelling | ScanStatus::Cancelled => {
                return Err(ApiError::InvalidState("scan already cancelled".to_owned()))
            }
            status => {
                return Err(ApiError::InvalidState(format!(
                    "can not cancel a scan in status {}",
                    status
                )))
            }
        };
        self.set_status(db, scan, ScanStatus::Cancelled).await?;
        Ok(details)
    }

    pub async fn finished<D: DatabaseTrait>(&self, db: &D, scan_id: &str) -> ApiResult<bool> {
        let scan = self.load_scan(db, scan_id).await?;
        Ok(scan.status == ScanStatus::Finished)
    }

    pub async fn info<D: DatabaseTrait>(&self, db: &D, scan_id: &str) -> ApiResult<ScanInfo> {
        let scan = self.load_scan(db, scan_id).await?;
        let records = db.get_file_webs_of_scan(&scan).await?;
        let probe_list: BTreeSet<String> = records
            .iter()
            .flat_map(|record| record.probe_results.iter().map(|result| result.name.clone()))
            .collect();
        Ok(ScanInfo {
            probe_list: probe_list.into_iter().collect(),
            finished: scan.status == ScanStatus::Finished,
            file_hashes: records
                .into_iter()
                .map(|record| FileHash {
                    name: record.file_web.name,
                    sha256: record.file.sha256,
                })
                .collect(),
        })
    }

    pub async fn results<D: DatabaseTrait>(
        &self,
        db: &D,
        scan_id: &str,
        formatted: bool,
    ) -> ApiResult<ScanResults> {
        let scan = self.load_scan(db, scan_id).await?;
        let records = db.get_file_webs_of_scan(&scan).await?;
        Ok(ScanResults {
            status: scan.status,
            finished: scan.status == ScanStatus::Finished,
            total: records.len(),
            files: records
                .iter()
                .map(|record| format_file_web(record, formatted))
                .collect(),
        })
    }

    /// Result of the file at `file_index` in scan order.
    /// * `file_index` - Raw path segment, must be an integer
    pub async fn result<D: DatabaseTrait>(
        &self,
        db: &D,
        scan_id: &str,
        file_index: &str,
        formatted: bool,
    ) -> ApiResult<FileResultView> {
        let scan = self.load_scan(db, scan_id).await?;
        let raw = file_index.trim();
        // integers too large for i64 are still indexes, just out of range
        let index = match raw.parse::<i64>() {
            Ok(index) => Some(index),
            Err(err) if matches!(err.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
                None
            }
            Err(_) => {
                return Err(ApiError::InvalidParameter(format!(
                    "file index '{}' is not an integer",
                    file_index
                )))
            }
        };
        let count = db.count_file_webs_of_scan(scan.id).await?;
        let out_of_range = || ApiError::IndexOutOfRange {
            index: raw.to_owned(),
            count,
        };
        let index = match index {
            Some(index) if index >= 0 && (index as u64) < count => index,
            _ => return Err(out_of_range()),
        };
        let record = db
            .get_file_web_of_scan(&scan, index as i32)
            .await?
            .ok_or_else(out_of_range)?;
        Ok(format_file_result(&record, formatted))
    }

    /// Probes registered on the brain
    pub async fn probe_list(&self) -> ApiResult<Vec<String>> {
        self.bounded(self.control.probe_list()).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use mockall::predicate::eq;

    use crate::controllers::scan_controller::{Progress, ScanController};
    use crate::database::models::scan::ScanStatus;
    use crate::database::service_trait::{DatabaseTrait, MockDatabaseTrait};
    use crate::errors::ApiError;
    use crate::external_api::scan_control::{
        CancelDetails, ControlError, LaunchRequest, MockScanControl, ProgressDetails,
        ScanControl,
    };
    use crate::external_api::task_service::MockTaskSubmitter;
    use crate::filesystem::file_storage::FileStorage;
    use crate::test_support::{controller, insert_files, insert_scan, memory_db, SCAN_ID};

    fn probes() -> Vec<String> {
        vec!["ClamAV".to_owned(), "Comodo".to_owned(), "VirusTotal".to_owned()]
    }

    fn brain_with_probes() -> MockScanControl {
        let mut control = MockScanControl::new();
        control.expect_probe_list().returning(|| Ok(probes()));
        control
            .expect_launch()
            .returning(|request| Ok(request.probes));
        control
    }

    fn storage() -> (tempfile::TempDir, FileStorage) {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = FileStorage::new(dir.path());
        (dir, storage)
    }

    #[actix_rt::test]
    async fn malformed_id_is_rejected_before_lookup() {
        let (_dir, storage) = storage();
        let scans = controller(MockScanControl::new(), MockTaskSubmitter::new(), storage);
        let mut db = MockDatabaseTrait::new();
        db.expect_get_scan_by_external_id().times(0);
        let result = scans.finished(&db, "not-a-uuid").await;
        assert!(matches!(result, Err(ApiError::InvalidIdentifier(_))));
    }

    #[actix_rt::test]
    async fn unknown_scan() {
        let (_dir, storage) = storage();
        let scans = controller(MockScanControl::new(), MockTaskSubmitter::new(), storage);
        let mut db = MockDatabaseTrait::new();
        db.expect_get_scan_by_external_id()
            .with(eq(SCAN_ID))
            .returning(|_| Ok(None));
        let result = scans.info(&db, SCAN_ID).await;
        assert!(matches!(result, Err(ApiError::UnknownScan(_))));
    }

    #[actix_rt::test]
    async fn new_scan_then_add_files() {
        let db = memory_db().await;
        let (_dir, storage) = storage();
        let scans = controller(MockScanControl::new(), MockTaskSubmitter::new(), storage);

        let unit = db.begin().await.expect("unit");
        let outcome = scans.new_scan(&unit, Some("10.0.0.1".to_owned())).await;
        let scan_id = unit.finish(outcome).await.expect("scan id");
        assert!(crate::helpers::validation::validate_scan_id(&scan_id).is_ok());

        let unit = db.begin().await.expect("unit");
        let files = vec![
            ("../../etc/passwd".to_owned(), b"root:x:0:0".to_vec()),
            ("eicar.com".to_owned(), b"X5O!P%@AP".to_vec()),
        ];
        let outcome = scans.add_files(&unit, &scan_id, files).await;
        assert_eq!(unit.finish(outcome).await.expect("count"), 2);

        // same content again is deduplicated but still gets its own index
        let unit = db.begin().await.expect("unit");
        let outcome = scans
            .add_files(&unit, &scan_id, vec![("copy.com".to_owned(), b"X5O!P%@AP".to_vec())])
            .await;
        assert_eq!(unit.finish(outcome).await.expect("count"), 3);

        let unit = db.begin().await.expect("unit");
        let info = scans.info(&unit, &scan_id).await.expect("info");
        let names: Vec<&str> = info.file_hashes.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["passwd", "eicar.com", "copy.com"]);
        assert_eq!(info.file_hashes[1].sha256, info.file_hashes[2].sha256);
        let scan = unit
            .get_scan_by_external_id(&scan_id)
            .await
            .expect("query")
            .expect("scan");
        assert_eq!(scan.status, ScanStatus::Ready);
    }

    #[actix_rt::test]
    async fn oversized_file_is_rejected() {
        let db = memory_db().await;
        insert_scan(&db, SCAN_ID, ScanStatus::Empty).await;
        let (_dir, storage) = storage();
        let scans = controller(MockScanControl::new(), MockTaskSubmitter::new(), storage);
        let unit = db.begin().await.expect("unit");
        let result = scans
            .add_files(&unit, SCAN_ID, vec![("big".to_owned(), vec![0; 2 * 1024 * 1024])])
            .await;
        assert!(matches!(result, Err(ApiError::InvalidParameter(_))));
    }

    #[actix_rt::test]
    async fn add_after_launch_is_rejected() {
        let db = memory_db().await;
        insert_scan(&db, SCAN_ID, ScanStatus::Launched).await;
        let (_dir, storage) = storage();
        let scans = controller(MockScanControl::new(), MockTaskSubmitter::new(), storage);
        let unit = db.begin().await.expect("unit");
        let result = scans
            .add_files(&unit, SCAN_ID, vec![("a".to_owned(), b"a".to_vec())])
            .await;
        assert!(matches!(result, Err(ApiError::InvalidState(_))));
    }

    #[actix_rt::test]
    async fn launch_uses_every_probe_by_default() {
        let db = memory_db().await;
        let scan = insert_scan(&db, SCAN_ID, ScanStatus::Ready).await;
        insert_files(&db, &scan, &["a.exe", "b.exe"]).await;
        let (_dir, storage) = storage();
        let scans = controller(brain_with_probes(), MockTaskSubmitter::new(), storage);

        let unit = db.begin().await.expect("unit");
        let outcome = scans.launch(&unit, SCAN_ID, false, None).await;
        let used = unit.finish(outcome).await.expect("launched");
        assert_eq!(used, probes());

        let unit = db.begin().await.expect("unit");
        let scan = unit
            .get_scan_by_external_id(SCAN_ID)
            .await
            .expect("query")
            .expect("scan");
        assert_eq!(scan.status, ScanStatus::Launched);
        assert_eq!(scan.probes_total, 6);
        let info = scans.info(&unit, SCAN_ID).await.expect("info");
        assert_eq!(info.probe_list, probes());
        assert!(!info.finished);
    }

    #[actix_rt::test]
    async fn launch_with_selected_probes() {
        let db = memory_db().await;
        let scan = insert_scan(&db, SCAN_ID, ScanStatus::Ready).await;
        insert_files(&db, &scan, &["a.exe"]).await;
        let (_dir, storage) = storage();
        let scans = controller(brain_with_probes(), MockTaskSubmitter::new(), storage);

        let unit = db.begin().await.expect("unit");
        let requested = vec!["ClamAV".to_owned(), "Comodo".to_owned()];
        let used = scans
            .launch(&unit, SCAN_ID, true, Some(requested.clone()))
            .await
            .expect("launched");
        assert_eq!(used, requested);

        let results = scans.results(&unit, SCAN_ID, true).await.expect("results");
        assert_eq!(results.total, 1);
        assert_eq!(results.files[0].probes_total, 2);
        assert_eq!(results.files[0].probes_finished, 0);
    }

    #[actix_rt::test]
    async fn launch_with_unknown_probe() {
        let db = memory_db().await;
        let scan = insert_scan(&db, SCAN_ID, ScanStatus::Ready).await;
        insert_files(&db, &scan, &["a.exe"]).await;
        let (_dir, storage) = storage();
        let mut control = MockScanControl::new();
        control.expect_probe_list().returning(|| Ok(probes()));
        control.expect_launch().times(0);
        let scans = controller(control, MockTaskSubmitter::new(), storage);

        let unit = db.begin().await.expect("unit");
        let result = scans
            .launch(&unit, SCAN_ID, false, Some(vec!["Nope".to_owned()]))
            .await;
        assert!(matches!(result, Err(ApiError::UnknownProbe(ref names)) if names == "Nope"));
    }

    #[actix_rt::test]
    async fn launch_of_empty_scan() {
        let db = memory_db().await;
        insert_scan(&db, SCAN_ID, ScanStatus::Empty).await;
        let (_dir, storage) = storage();
        let scans = controller(MockScanControl::new(), MockTaskSubmitter::new(), storage);
        let unit = db.begin().await.expect("unit");
        let result = scans.launch(&unit, SCAN_ID, false, None).await;
        assert!(matches!(result, Err(ApiError::EmptyScan(_))));
    }

    struct SlowBrain;

    #[async_trait]
    impl ScanControl for SlowBrain {
        async fn probe_list(&self) -> Result<Vec<String>, ControlError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(probes())
        }
        async fn launch(&self, request: LaunchRequest) -> Result<Vec<String>, ControlError> {
            Ok(request.probes)
        }
        async fn progress(&self, _scan_id: &str) -> Result<ProgressDetails, ControlError> {
            Ok(ProgressDetails::default())
        }
        async fn cancel(&self, _scan_id: &str) -> Result<CancelDetails, ControlError> {
            Ok(CancelDetails::default())
        }
    }

    #[actix_rt::test]
    async fn slow_brain_times_out() {
        let (_dir, storage) = storage();
        let scans = ScanController::new(
            Arc::new(SlowBrain),
            Arc::new(MockTaskSubmitter::new()),
            storage,
            Duration::from_millis(50),
            1024,
        );
        assert!(matches!(
            scans.probe_list().await,
            Err(ApiError::BackendTimeout(0))
        ));
    }

    #[actix_rt::test]
    async fn brain_timeout_during_launch() {
        let db = memory_db().await;
        let scan = insert_scan(&db, SCAN_ID, ScanStatus::Ready).await;
        insert_files(&db, &scan, &["a.exe"]).await;
        let (_dir, storage) = storage();
        let mut control = MockScanControl::new();
        control
            .expect_probe_list()
            .returning(|| Err(ControlError::Timeout(1)));
        let scans = controller(control, MockTaskSubmitter::new(), storage);
        let unit = db.begin().await.expect("unit");
        let result = scans.launch(&unit, SCAN_ID, false, None).await;
        assert!(matches!(result, Err(ApiError::BackendTimeout(1))));
    }

    #[actix_rt::test]
    async fn scan_id_casing_is_ignored() {
        let db = memory_db().await;
        insert_scan(&db, SCAN_ID, ScanStatus::Finished).await;
        let (_dir, storage) = storage();
        let mut tasks = MockTaskSubmitter::new();
        tasks
            .expect_scan_launch()
            .with(eq(SCAN_ID))
            .times(1)
            .returning(|_| Ok(()));
        let scans = controller(MockScanControl::new(), tasks, storage);
        let unit = db.begin().await.expect("unit");

        let upper = SCAN_ID.to_ascii_uppercase();
        assert!(scans.finished(&unit, &upper).await.expect("finished"));
        let info = scans.info(&unit, &upper).await.expect("info");
        assert!(info.finished);
        scans.notify_launch(&upper);
    }

    #[actix_rt::test]
    async fn notification_failure_is_swallowed() {
        let (_dir, storage) = storage();
        let mut tasks = MockTaskSubmitter::new();
        tasks
            .expect_scan_launch()
            .with(eq(SCAN_ID))
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("queue closed")));
        let scans = controller(MockScanControl::new(), tasks, storage);
        scans.notify_launch(SCAN_ID);
    }

    #[actix_rt::test]
    async fn progress_per_status() {
        let db = memory_db().await;
        insert_scan(&db, SCAN_ID, ScanStatus::Finished).await;
        let processing = "0b7c3d1e-1111-4222-8333-944455556666";
        insert_scan(&db, processing, ScanStatus::Processing).await;
        let (_dir, storage) = storage();
        let mut control = MockScanControl::new();
        control
            .expect_progress()
            .with(eq(processing))
            .times(1)
            .returning(|_| {
                Ok(ProgressDetails {
                    total: 6,
                    finished: 4,
                    successful: 3,
                })
            });
        let scans = controller(control, MockTaskSubmitter::new(), storage);

        let unit = db.begin().await.expect("unit");
        assert_eq!(
            scans.progress(&unit, SCAN_ID).await.expect("progress"),
            Progress::Status(ScanStatus::Finished)
        );
        assert_eq!(
            scans.progress(&unit, processing).await.expect("progress"),
            Progress::Details(ProgressDetails {
                total: 6,
                finished: 4,
                successful: 3
            })
        );
    }

    #[actix_rt::test]
    async fn cancel_per_status() {
        let db = memory_db().await;
        let ready = "00000000-0000-4000-8000-000000000001";
        let running = "00000000-0000-4000-8000-000000000002";
        let finished = "00000000-0000-4000-8000-000000000003";
        let cancelled = "00000000-0000-4000-8000-000000000004";
        insert_scan(&db, ready, ScanStatus::Ready).await;
        insert_scan(&db, running, ScanStatus::Launched).await;
        insert_scan(&db, finished, ScanStatus::Finished).await;
        insert_scan(&db, cancelled, ScanStatus::Cancelled).await;
        let (_dir, storage) = storage();
        let mut control = MockScanControl::new();
        control
            .expect_cancel()
            .with(eq(running))
            .times(1)
            .returning(|_| {
                Ok(CancelDetails {
                    total: 3,
                    finished: 1,
                    cancelled: 2,
                })
            });
        let scans = controller(control, MockTaskSubmitter::new(), storage);

        let unit = db.begin().await.expect("unit");
        assert_eq!(
            scans.cancel(&unit, ready).await.expect("cancelled"),
            CancelDetails::default()
        );
        assert_eq!(
            scans.cancel(&unit, running).await.expect("cancelled").cancelled,
            2
        );
        assert!(matches!(
            scans.cancel(&unit, finished).await,
            Err(ApiError::InvalidState(ref msg)) if msg == "can not cancel a finished scan"
        ));
        assert!(matches!(
            scans.cancel(&unit, cancelled).await,
            Err(ApiError::InvalidState(_))
        ));
        let scan = unit
            .get_scan_by_external_id(running)
            .await
            .expect("query")
            .expect("scan");
        assert_eq!(scan.status, ScanStatus::Cancelled);
    }

    #[actix_rt::test]
    async fn finished_flag() {
        let db = memory_db().await;
        insert_scan(&db, SCAN_ID, ScanStatus::Finished).await;
        let (_dir, storage) = storage();
        let scans = controller(MockScanControl::new(), MockTaskSubmitter::new(), storage);
        let unit = db.begin().await.expect("unit");
        assert!(scans.finished(&unit, SCAN_ID).await.expect("finished"));
    }

    #[actix_rt::test]
    async fn file_index_bounds() {
        let db = memory_db().await;
        let scan = insert_scan(&db, SCAN_ID, ScanStatus::Ready).await;
        insert_files(&db, &scan, &["a.exe", "b.exe"]).await;
        let (_dir, storage) = storage();
        let scans = controller(MockScanControl::new(), MockTaskSubmitter::new(), storage);
        let unit = db.begin().await.expect("unit");

        let second = scans.result(&unit, SCAN_ID, "1", true).await.expect("result");
        assert_eq!(second.tools_total, 0);
        assert!(matches!(
            scans.result(&unit, SCAN_ID, "2", true).await,
            Err(ApiError::IndexOutOfRange { ref index, count: 2 }) if index == "2"
        ));
        assert!(matches!(
            scans.result(&unit, SCAN_ID, "-1", true).await,
            Err(ApiError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            scans.result(&unit, SCAN_ID, "99999999999999999999", true).await,
            Err(ApiError::IndexOutOfRange { ref index, count: 2 }) if index == "99999999999999999999"
        ));
        assert!(matches!(
            scans.result(&unit, SCAN_ID, "-99999999999999999999", true).await,
            Err(ApiError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            scans.result(&unit, SCAN_ID, "first", true).await,
            Err(ApiError::InvalidParameter(_))
        ));
    }
}
