//! SeaORM Entity for the cases table.
//! A case is a business request that owns the variables to be resolved
//! against the data table catalog.

use crate::case_status::CaseStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::cases::Model)]
#[sea_orm(schema_name = "datacase_platform", table_name = "cases")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = String)]
    pub id: Id,

    pub title: String,

    #[schema(value_type = String)]
    pub status: CaseStatus,

    #[schema(value_type = String)]
    pub requester_id: Id,

    /// Macro-case hint used by the scoring engine's domain signal.
    pub macro_case: Option<String>,

    pub budget: Option<f64>,

    #[schema(value_type = Option<String>, format = Date)]
    pub starts_on: Option<Date>,

    #[schema(value_type = Option<String>, format = Date)]
    pub ends_on: Option<Date>,

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
        belongs_to = "super::users::Entity",
        from = "Column::RequesterId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,

    #[sea_orm(has_many = "super::case_variables::Entity")]
    CaseVariables,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::case_variables::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CaseVariables.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
