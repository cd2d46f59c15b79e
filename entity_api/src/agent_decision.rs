use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, TryIntoModel,
};

use super::error::{EntityApiErrorKind, Error};
use entity::agent_decisions::{ActiveModel, Entity, Model};
use entity::decision_status::AgentDecisionStatus;
use entity::Id;
use log::*;

pub async fn create(db: &DatabaseConnection, decision_model: Model) -> Result<Model, Error> {
    debug!("New AgentDecision Model to be inserted: {decision_model:?}");

    let now = chrono::Utc::now();

    let active_model: ActiveModel = ActiveModel {
        agent_id: Set(decision_model.agent_id),
        decision_type: Set(decision_model.decision_type),
        context_id: Set(decision_model.context_id),
        value: Set(decision_model.value),
        confidence: Set(decision_model.confidence),
        status: Set(decision_model.status),
        is_reused: Set(decision_model.is_reused),
        source_decision_id: Set(decision_model.source_decision_id),
        reuse_count: Set(0),
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

pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(Entity::find().all(db).await?)
}

pub async fn update_status(
    db: &DatabaseConnection,
    id: Id,
    status: AgentDecisionStatus,
) -> Result<Model, Error> {
    let decision = find_by_id(db, id).await?;

    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(decision.id),
        status: Set(status),
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Bumps the reuse counter on the source decision of a reuse.
pub async fn increment_reuse(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    let decision = find_by_id(db, id).await?;

    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(decision.id),
        reuse_count: Set(decision.reuse_count + 1),
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}
