use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, TryIntoModel,
};

use super::error::{EntityApiErrorKind, Error};
use entity::decision_contexts::{ActiveModel, Column, Entity, Model};
use entity::Id;

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

pub async fn find_by_hash(db: &DatabaseConnection, context_hash: &str) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::ContextHash.eq(context_hash))
        .one(db)
        .await?)
}

/// Finds the context for a hash or creates it. The unique constraint on
/// context_hash makes concurrent creations collapse onto one row.
pub async fn find_or_create(
    db: &DatabaseConnection,
    context_type: &str,
    context_hash: &str,
    context_data: &str,
) -> Result<Model, Error> {
    if let Some(existing) = find_by_hash(db, context_hash).await? {
        return Ok(existing);
    }

    let now = chrono::Utc::now();
    let active_model: ActiveModel = ActiveModel {
        context_type: Set(context_type.to_owned()),
        context_hash: Set(context_hash.to_owned()),
        context_data: Set(context_data.to_owned()),
        approved_count: Set(0),
        rejected_count: Set(0),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

/// Bumps the running approval statistics after a decision on this context
/// resolves.
pub async fn record_outcome(
    db: &DatabaseConnection,
    id: Id,
    approved: bool,
) -> Result<Model, Error> {
    let context = find_by_id(db, id).await?;

    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(context.id),
        approved_count: Set(context.approved_count + i32::from(approved)),
        rejected_count: Set(context.rejected_count + i32::from(!approved)),
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Most recent approved decision linked to this context, if any.
pub async fn latest_decision(
    db: &DatabaseConnection,
    context_id: Id,
) -> Result<Option<entity::agent_decisions::Model>, Error> {
    use sea_orm::QueryOrder;

    Ok(entity::agent_decisions::Entity::find()
        .filter(entity::agent_decisions::Column::ContextId.eq(context_id))
        .order_by_desc(entity::agent_decisions::Column::CreatedAt)
        .one(db)
        .await?)
}
