//! Model of the 'ProbeResultsFileWebs' table

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "ProbeResultsFileWebs")]
/// Main model that is used
pub struct Model {
    #[sea_orm(column_name = "fileWebId", primary_key, auto_increment = false)]
    pub file_web_id: i32,
    #[sea_orm(column_name = "probeResultId", primary_key, auto_increment = false)]
    pub probe_result_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
/// Represents the relation to other tables
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::file_web::Entity",
        from = "Column::FileWebId",
        to = "super::file_web::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    FileWeb,
    #[sea_orm(
        belongs_to = "super::probe_result::Entity",
        from = "Column::ProbeResultId",
        to = "super::probe_result::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
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
