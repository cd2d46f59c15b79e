//! SeaORM Entity for the involvements table.
//! Tracks a table owner's commitment to create data that a case requested
//! but that does not exist yet.

use crate::involvement_status::InvolvementStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::involvements::Model)]
#[sea_orm(schema_name = "datacase_platform", table_name = "involvements")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = String)]
    pub id: Id,

    #[schema(value_type = String)]
    pub case_variable_id: Id,

    #[schema(value_type = String)]
    pub requester_id: Id,

    #[schema(value_type = String)]
    pub owner_id: Id,

    #[schema(value_type = String)]
    pub status: InvolvementStatus,

    #[schema(value_type = Option<String>, format = Date)]
    pub expected_completion_date: Option<Date>,

    #[schema(value_type = Option<String>, format = Date)]
    pub actual_completion_date: Option<Date>,

    /// Name of the table the owner created to fulfil the request.
    pub created_table_name: Option<String>,

    pub created_concept: Option<String>,

    pub reminder_count: i32,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub last_reminder_at: Option<DateTimeWithTimeZone>,

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
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::case_variables::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CaseVariables.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
