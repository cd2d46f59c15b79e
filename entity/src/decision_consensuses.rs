//! SeaORM Entity for the decision_consensuses table.
//! One per agent decision that requires quorum voting. Expiry is derived
//! from `deadline` at read time and never stored.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::decision_consensuses::Model)]
#[sea_orm(schema_name = "datacase_platform", table_name = "decision_consensuses")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = String)]
    pub id: Id,

    #[sea_orm(unique)]
    #[schema(value_type = String)]
    pub agent_decision_id: Id,

    /// Votes (approvals + rejections) needed before the decision resolves.
    pub required_approvals: i32,

    #[schema(value_type = String, format = DateTime)]
    pub deadline: DateTimeWithTimeZone,

    pub approval_votes: i32,

    pub rejection_votes: i32,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub resolved_at: Option<DateTimeWithTimeZone>,

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
        belongs_to = "super::agent_decisions::Entity",
        from = "Column::AgentDecisionId",
        to = "super::agent_decisions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    AgentDecisions,

    #[sea_orm(has_many = "super::consensus_votes::Entity")]
    ConsensusVotes,
}

impl Related<super::agent_decisions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AgentDecisions.def()
    }
}

impl Related<super::consensus_votes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ConsensusVotes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
