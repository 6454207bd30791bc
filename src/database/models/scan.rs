//! Model of the 'Scans' table

use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Lifecycle stage of a scan, stored with the label the brain reports.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, strum_macros::Display,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScanStatus {
    #[sea_orm(string_value = "empty")]
    Empty,
    #[sea_orm(string_value = "ready")]
    Ready,
    #[sea_orm(string_value = "uploaded")]
    Uploaded,
    #[sea_orm(string_value = "launched")]
    Launched,
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "processed")]
    Processed,
    #[sea_orm(string_value = "finished")]
    Finished,
    #[sea_orm(string_value = "cancelling")]
    Cancelling,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "error")]
    Error,
}

impl ScanStatus {
    /// Files may still be attached and the scan may still be launched.
    pub fn accepts_files(self) -> bool {
        matches!(self, ScanStatus::Empty | ScanStatus::Ready | ScanStatus::Uploaded)
    }

    /// Probe jobs are running on the brain side.
    pub fn is_running(self) -> bool {
        matches!(self, ScanStatus::Launched | ScanStatus::Processing)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "Scans")]
/// Main model that is used
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i32,
    #[sea_orm(column_name = "externalId", unique)]
    pub external_id: String,
    pub status: ScanStatus,
    pub date: DateTime,
    pub ip: Option<String>,
    #[sea_orm(column_name = "probesTotal")]
    pub probes_total: i32,
    #[sea_orm(column_name = "probesFinished")]
    pub probes_finished: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
/// Represents the relation to other tables
pub enum Relation {
    #[sea_orm(has_many = "super::file_web::Entity")]
    FileWeb,
}

impl Related<super::file_web::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FileWeb.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
