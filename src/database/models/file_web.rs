//! Model of the 'FileWebs' table, the scan scoped view of a [File][super::file::Model]

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "FileWebs")]
/// Main model that is used
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i32,
    #[sea_orm(column_name = "scanFileIdx")]
    pub scan_file_idx: i32,
    pub name: String,
    #[sea_orm(column_name = "fileId")]
    pub file_id: i32,
    #[sea_orm(column_name = "scanId")]
    pub scan_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
/// Represents the relation to other tables
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::file::Entity",
        from = "Column::FileId",
        to = "super::file::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    File,
    #[sea_orm(
        belongs_to = "super::scan::Entity",
        from = "Column::ScanId",
        to = "super::scan::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Scan,
    #[sea_orm(has_many = "super::probe_result_file_web::Entity")]
    ProbeResultFileWeb,
}

impl Related<super::file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::File.def()
    }
}

impl Related<super::scan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scan.def()
    }
}

impl Related<super::probe_result::Entity> for Entity {
    fn to() -> RelationDef {
        super::probe_result_file_web::Relation::ProbeResult.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::probe_result_file_web::Relation::FileWeb.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
