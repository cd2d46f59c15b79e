//! SeaORM Entity for the approval_histories table.
//! Counters keyed by (concept_hash, data_table_id) feeding the historical
//! signal of the scoring engine. Counts only ever grow.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::approval_histories::Model)]
#[sea_orm(schema_name = "datacase_platform", table_name = "approval_histories")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = String)]
    pub id: Id,

    /// First 32 hex chars of SHA-256 over `lowercase(name):lowercase(type)`.
    pub concept_hash: String,

    #[schema(value_type = String)]
    pub data_table_id: Id,

    pub approved_count: i32,

    pub rejected_count: i32,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub last_used_at: Option<DateTimeWithTimeZone>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::data_tables::Entity",
        from = "Column::DataTableId",
        to = "super::data_tables::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    DataTables,
}

impl Related<super::data_tables::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DataTables.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
