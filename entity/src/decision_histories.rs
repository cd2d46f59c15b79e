//! SeaORM Entity for the decision_histories table.
//! Append-only log of every workflow decision point with point-in-time
//! snapshots, used for training-data export. Never mutated after insert.

use crate::decision_outcome::{DecisionOutcome, DecisionPoint};
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::decision_histories::Model)]
#[sea_orm(schema_name = "datacase_platform", table_name = "decision_histories")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = String)]
    pub id: Id,

    #[schema(value_type = Option<String>)]
    pub case_id: Option<Id>,

    #[schema(value_type = Option<String>)]
    pub case_variable_id: Option<Id>,

    #[schema(value_type = Option<String>)]
    pub variable_match_id: Option<Id>,

    #[schema(value_type = String)]
    pub decision_point: DecisionPoint,

    #[schema(value_type = String)]
    pub outcome: DecisionOutcome,

    #[schema(value_type = Option<String>)]
    pub actor_id: Option<Id>,

    /// Snapshot of the variable at decision time, serialized JSON.
    #[sea_orm(column_type = "Text", nullable)]
    pub variable_snapshot: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub table_snapshot: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub match_snapshot: Option<String>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
