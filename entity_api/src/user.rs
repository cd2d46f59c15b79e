use sea_orm::{entity::prelude::*, ActiveValue::Set, DatabaseConnection, TryIntoModel};

use super::error::{EntityApiErrorKind, Error};
use entity::users::{ActiveModel, Column, Entity, Model};
use entity::Id;

pub async fn create(db: &DatabaseConnection, user_model: Model) -> Result<Model, Error> {
    let now = chrono::Utc::now();

    let active_model: ActiveModel = ActiveModel {
        email: Set(user_model.email),
        display_name: Set(user_model.display_name),
        role: Set(user_model.role),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
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

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::Email.eq(email))
        .one(db)
        .await?)
}
