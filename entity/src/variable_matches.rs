//! SeaORM Entity for the variable_matches table.
//! At most one match record exists per (case_variable, data_table) pair;
//! the unique constraint is the last line of defense against racing searches.

use crate::match_status::MatchStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::variable_matches::Model)]
#[sea_orm(schema_name = "datacase_platform", table_name = "variable_matches")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = String)]
    pub id: Id,

    #[schema(value_type = String)]
    pub case_variable_id: Id,

    #[schema(value_type = String)]
    pub data_table_id: Id,

    /// Weighted match score in [0, 1].
    pub score: f64,

    /// Human-readable justification assembled from the scoring signals.
    pub reasons: String,

    #[schema(value_type = String)]
    pub status: MatchStatus,

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
        belongs_to = "super::case_variables::Entity",
        from = "Column::CaseVariableId",
        to = "super::case_variables::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    CaseVariables,

    #[sea_orm(
        belongs_to = "super::data_tables::Entity",
        from = "Column::DataTableId",
        to = "super::data_tables::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    DataTables,
}

impl Related<super::case_variables::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CaseVariables.def()
    }
}

impl Related<super::data_tables::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DataTables.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
