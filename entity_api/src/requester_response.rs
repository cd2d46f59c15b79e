use sea_orm::{entity::prelude::*, ActiveValue::Set, DatabaseConnection, TryIntoModel};

use super::error::{EntityApiErrorKind, Error};
use entity::requester_responses::{ActiveModel, Column, Entity, Model};
use entity::Id;

/// Requester responses are append-only decision records; there is no update path.
pub async fn create(db: &DatabaseConnection, response_model: Model) -> Result<Model, Error> {
    let now = chrono::Utc::now();

    let active_model: ActiveModel = ActiveModel {
        variable_match_id: Set(response_model.variable_match_id),
        responder_id: Set(response_model.responder_id),
        response_type: Set(response_model.response_type),
        comment: Set(response_model.comment),
        created_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

pub async fn find_by_match_id(db: &DatabaseConnection, match_id: Id) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::VariableMatchId.eq(match_id))
        .all(db)
        .await?)
}
