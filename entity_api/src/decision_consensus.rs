use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, TransactionTrait, TryIntoModel,
};

use super::error::{EntityApiErrorKind, Error};
use entity::consensus_votes;
use entity::decision_consensuses::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;

pub async fn create(
    db: &DatabaseConnection,
    agent_decision_id: Id,
    required_approvals: i32,
    deadline: chrono::DateTime<chrono::FixedOffset>,
) -> Result<Model, Error> {
    let now = chrono::Utc::now();

    let active_model: ActiveModel = ActiveModel {
        agent_decision_id: Set(agent_decision_id),
        required_approvals: Set(required_approvals),
        deadline: Set(deadline),
        approval_votes: Set(0),
        rejection_votes: Set(0),
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

pub async fn find_by_decision_id(
    db: &DatabaseConnection,
    agent_decision_id: Id,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::AgentDecisionId.eq(agent_decision_id))
        .one(db)
        .await?)
}

/// Unresolved consensuses whose deadline has passed; candidates for lazy
/// expiry on the next evaluation.
pub async fn find_expired(
    db: &DatabaseConnection,
    now: chrono::DateTime<chrono::FixedOffset>,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::ResolvedAt.is_null())
        .filter(Column::Deadline.lt(now))
        .all(db)
        .await?)
}

/// Inserts a vote and updates the running tally inside one transaction.
/// The unique constraint on (consensus_id, voter_id) turns a duplicate vote
/// into a RecordAlreadyExists error; the caller surfaces it as a conflict.
pub async fn record_vote(
    db: &DatabaseConnection,
    consensus_id: Id,
    voter_id: Id,
    approve: bool,
    comment: Option<String>,
) -> Result<Model, Error> {
    let consensus = find_by_id(db, consensus_id).await?;
    let now = chrono::Utc::now();

    let txn = db.begin().await?;

    let vote_active_model: consensus_votes::ActiveModel = consensus_votes::ActiveModel {
        consensus_id: Set(consensus_id),
        voter_id: Set(voter_id),
        approve: Set(approve),
        comment: Set(comment),
        created_at: Set(now.into()),
        ..Default::default()
    };
    vote_active_model.save(&txn).await?;

    let tally_active_model: ActiveModel = ActiveModel {
        id: Unchanged(consensus.id),
        approval_votes: Set(consensus.approval_votes + i32::from(approve)),
        rejection_votes: Set(consensus.rejection_votes + i32::from(!approve)),
        updated_at: Set(now.into()),
        ..Default::default()
    };
    let updated = tally_active_model.update(&txn).await?;

    txn.commit().await?;

    debug!(
        "Vote recorded on consensus {consensus_id}: approvals={}, rejections={}",
        updated.approval_votes, updated.rejection_votes
    );

    Ok(updated.try_into_model()?)
}

pub async fn mark_resolved(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    let consensus = find_by_id(db, id).await?;
    let now = chrono::Utc::now();

    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(consensus.id),
        resolved_at: Set(Some(now.into())),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

pub async fn find_votes(db: &DatabaseConnection, consensus_id: Id) -> Result<Vec<consensus_votes::Model>, Error> {
    Ok(consensus_votes::Entity::find()
        .filter(consensus_votes::Column::ConsensusId.eq(consensus_id))
        .all(db)
        .await?)
}
