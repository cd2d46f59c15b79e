//! SeaORM Entity for the data_tables catalog.
//! Rows are synced from the external table registry and are read-only from
//! the matching core's perspective.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::data_tables::Model)]
#[sea_orm(schema_name = "datacase_platform", table_name = "data_tables")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = String)]
    pub id: Id,

    /// Physical table name; unique within the catalog and used as the
    /// upsert key during sync.
    #[sea_orm(unique)]
    pub name: String,

    pub display_name: Option<String>,

    pub description: Option<String>,

    pub domain: Option<String>,

    /// Comma-separated keyword list declared by the table owner.
    pub keywords: Option<String>,

    #[schema(value_type = String)]
    pub owner_id: Id,

    pub is_active: bool,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub synced_at: Option<DateTimeWithTimeZone>,

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
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,

    #[sea_orm(has_many = "super::variable_matches::Entity")]
    VariableMatches,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::variable_matches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VariableMatches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
