//! Model of the 'ProbeResults' table

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "ProbeResults")]
/// Main model that is used
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_name = "type")]
    pub probe_type: Option<String>,
    /// `None` while the probe job is pending
    pub status: Option<i32>,
    /// Raw probe output, a JSON document
    #[sea_orm(column_type = "Text", nullable)]
    pub results: Option<String>,
    #[sea_orm(column_name = "fileId")]
    pub file_id: i32,
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
    #[sea_orm(has_many = "super::probe_result_file_web::Entity")]
    ProbeResultFileWeb,
}

impl Related<super::file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::File.def()
    }
}

impl Related<super::file_web::Entity> for Entity {
    fn to() -> RelationDef {
        super::probe_result_file_web::Relation::FileWeb.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::probe_result_file_web::Relation::ProbeResult.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
