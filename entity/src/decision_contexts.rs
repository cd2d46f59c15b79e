//! SeaORM Entity for the decision_contexts table.
//! Content-addressed contexts let high-confidence approved decisions be
//! reused when the same situation comes back.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::decision_contexts::Model)]
#[sea_orm(schema_name = "datacase_platform", table_name = "decision_contexts")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = String)]
    pub id: Id,

    pub context_type: String,

    /// First 32 hex chars of SHA-256 over the normalized context data.
    #[sea_orm(unique)]
    pub context_hash: String,

    /// Normalized context payload, serialized JSON.
    #[sea_orm(column_type = "Text")]
    pub context_data: String,

    pub approved_count: i32,

    pub rejected_count: i32,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::agent_decisions::Entity")]
    AgentDecisions,
}

impl Related<super::agent_decisions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AgentDecisions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
