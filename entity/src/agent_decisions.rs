//! SeaORM Entity for the agent_decisions table.

use crate::decision_status::{AgentDecisionStatus, AgentDecisionType};
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::agent_decisions::Model)]
#[sea_orm(schema_name = "datacase_platform", table_name = "agent_decisions")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = String)]
    pub id: Id,

    /// Identifier of the automated agent that produced the decision.
    pub agent_id: String,

    #[schema(value_type = String)]
    pub decision_type: AgentDecisionType,

    #[schema(value_type = Option<String>)]
    pub context_id: Option<Id>,

    /// Decision payload, serialized JSON.
    #[sea_orm(column_type = "Text")]
    pub value: String,

    /// Agent self-reported confidence in [0, 1].
    pub confidence: f64,

    #[schema(value_type = String)]
    pub status: AgentDecisionStatus,

    pub is_reused: bool,

    /// Back-reference to the decision this one was reused from. Ownership
    /// stays with the original decision; this is an id lookup, not a link
    /// the original knows about.
    #[schema(value_type = Option<String>)]
    pub source_decision_id: Option<Id>,

    /// Times this decision was reused as the source of another one.
    pub reuse_count: i32,

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
        belongs_to = "super::decision_contexts::Entity",
        from = "Column::ContextId",
        to = "super::decision_contexts::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    DecisionContexts,

    #[sea_orm(has_one = "super::decision_consensuses::Entity")]
    DecisionConsensuses,
}

impl Related<super::decision_contexts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DecisionContexts.def()
    }
}

impl Related<super::decision_consensuses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DecisionConsensuses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
