use std::sync::Arc;

use crate::controllers::scan_controller::ScanController;
use crate::database::service::DatabaseImplementation;

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseImplementation,
    pub scans: Arc<ScanController>,
}
