//! SeaORM Entity for the requester_responses table. Append-only.

use crate::response_types::RequesterResponseType;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::requester_responses::Model)]
#[sea_orm(schema_name = "datacase_platform", table_name = "requester_responses")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = String)]
    pub id: Id,

    #[schema(value_type = String)]
    pub variable_match_id: Id,

    #[schema(value_type = String)]
    pub responder_id: Id,

    #[schema(value_type = String)]
    pub response_type: RequesterResponseType,

    pub comment: Option<String>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::variable_matches::Entity",
        from = "Column::VariableMatchId",
        to = "super::variable_matches::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    VariableMatches,

    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ResponderId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::variable_matches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VariableMatches.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
