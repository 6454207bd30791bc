//! Model of the 'Files' table
//!
//! One row per distinct content. The sha256 column is unique so that a sample
//! uploaded in several scans is stored once.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "Files")]
/// Main model that is used
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i32,
    #[sea_orm(unique)]
    pub sha256: String,
    pub sha1: String,
    pub md5: String,
    pub size: i64,
    pub path: Option<String>,
    #[sea_orm(column_name = "timestampFirstScan")]
    pub timestamp_first_scan: DateTime,
    #[sea_orm(column_name = "timestampLastScan")]
    pub timestamp_last_scan: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
/// Represents the relation to other tables
pub enum Relation {
    #[sea_orm(has_many = "super::file_web::Entity")]
    FileWeb,
    #[sea_orm(has_many = "super::probe_result::Entity")]
    ProbeResult,
}

impl Related<super::file_web::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FileWeb.def()
    }
}

impl Related<super::probe_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProbeResult.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
