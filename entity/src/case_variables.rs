//! SeaORM Entity for the case_variables table.

use crate::search_status::SearchStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::case_variables::Model)]
#[sea_orm(schema_name = "datacase_platform", table_name = "case_variables")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = String)]
    pub id: Id,

    #[schema(value_type = String)]
    pub case_id: Id,

    pub name: String,

    /// Declared data type of the variable, e.g. "currency" or "date".
    pub variable_type: String,

    /// Free-text description of the business concept behind the variable.
    pub concept: Option<String>,

    #[schema(value_type = String)]
    pub search_status: SearchStatus,

    pub is_cancelled: bool,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub cancelled_at: Option<DateTimeWithTimeZone>,

    #[schema(value_type = Option<String>)]
    pub cancelled_by: Option<Id>,

    pub cancel_reason: Option<String>,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub search_started_at: Option<DateTimeWithTimeZone>,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub search_completed_at: Option<DateTimeWithTimeZone>,

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
        belongs_to = "super::cases::Entity",
        from = "Column::CaseId",
        to = "super::cases::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Cases,

    #[sea_orm(has_many = "super::variable_matches::Entity")]
    VariableMatches,

    #[sea_orm(has_many = "super::involvements::Entity")]
    Involvements,
}

impl Related<super::cases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cases.def()
    }
}

impl Related<super::variable_matches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VariableMatches.def()
    }
}

impl Related<super::involvements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Involvements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
