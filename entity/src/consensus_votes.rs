//! SeaORM Entity for the consensus_votes table. Append-only; one vote per
//! (consensus, voter) enforced by a unique constraint.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::consensus_votes::Model)]
#[sea_orm(schema_name = "datacase_platform", table_name = "consensus_votes")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = String)]
    pub id: Id,

    #[schema(value_type = String)]
    pub consensus_id: Id,

    #[schema(value_type = String)]
    pub voter_id: Id,

    pub approve: bool,

    pub comment: Option<String>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::decision_consensuses::Entity",
        from = "Column::ConsensusId",
        to = "super::decision_consensuses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    DecisionConsensuses,

    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::VoterId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::decision_consensuses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DecisionConsensuses.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
