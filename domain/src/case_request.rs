//! Case lifecycle services: creation with variables, role-gated status
//! updates and closure.

use std::sync::Arc;

use crate::case_workflow::{self, Actor};
use crate::decision_history;
use crate::error::{BusinessRuleKind, Error};
use crate::matching;
use crate::scoring::ScoringConfig;
use entity::case_status::CaseStatus;
use entity::roles::Role;
use entity::search_status::SearchStatus;
use entity::{case_variables, cases, Id};
use entity_api::query::{self, QuerySort};
use entity_api::{case, case_variable, user, IntoQueryFilterMap};
use events::{DomainEvent, EventPublisher};
use log::*;
use sea_orm::DatabaseConnection;
use serde_json::json;

pub use entity_api::case::{find_by_id, update};

/// A variable requested as part of a new case.
#[derive(Debug, Clone)]
pub struct NewVariable {
    pub name: String,
    pub variable_type: String,
    pub concept: Option<String>,
}

/// Input for [`create`].
#[derive(Debug, Clone)]
pub struct NewCase {
    pub title: String,
    pub requester_id: Id,
    pub macro_case: Option<String>,
    pub budget: Option<f64>,
    pub starts_on: Option<chrono::NaiveDate>,
    pub ends_on: Option<chrono::NaiveDate>,
    pub variables: Vec<NewVariable>,
}

/// Creates a case with its variables and triggers a background match search
/// for each one (fire-and-forget; search failures are logged and leave the
/// variable re-triggerable).
pub async fn create(
    db: &Arc<DatabaseConnection>,
    publisher: &EventPublisher,
    scoring_config: &ScoringConfig,
    new_case: NewCase,
) -> Result<(cases::Model, Vec<case_variables::Model>), Error> {
    if new_case.title.trim().is_empty() {
        return Err(Error::validation("a case needs a non-empty title"));
    }

    let created_case = case::create(
        db,
        cases::Model {
            id: Id::new_v4(),
            title: new_case.title,
            status: CaseStatus::Draft,
            requester_id: new_case.requester_id,
            macro_case: new_case.macro_case,
            budget: new_case.budget,
            starts_on: new_case.starts_on,
            ends_on: new_case.ends_on,
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
        },
    )
    .await?;

    let mut created_variables = Vec::with_capacity(new_case.variables.len());
    for variable in new_case.variables {
        let created = case_variable::create(
            db,
            case_variables::Model {
                id: Id::new_v4(),
                case_id: created_case.id,
                name: variable.name,
                variable_type: variable.variable_type,
                concept: variable.concept,
                search_status: SearchStatus::Pending,
                is_cancelled: false,
                cancelled_at: None,
                cancelled_by: None,
                cancel_reason: None,
                search_started_at: None,
                search_completed_at: None,
                created_at: chrono::Utc::now().into(),
                updated_at: chrono::Utc::now().into(),
            },
        )
        .await?;

        matching::trigger_search(
            Arc::clone(db),
            publisher.clone(),
            scoring_config.clone(),
            created.id,
        );
        created_variables.push(created);
    }

    info!(
        "Case {} created with {} variable(s); match searches dispatched",
        created_case.id,
        created_variables.len()
    );

    Ok((created_case, created_variables))
}

/// Filtered case listing for the caller-facing layer; params decide which
/// of their fields become filters and how results are sorted.
pub async fn find_by<P>(db: &DatabaseConnection, params: P) -> Result<Vec<cases::Model>, Error>
where
    P: IntoQueryFilterMap + QuerySort<entity::cases::Column>,
{
    Ok(query::find_by::<entity::cases::Entity, entity::cases::Column, P>(db, params).await?)
}

async fn load_actor(
    db: &DatabaseConnection,
    case: &cases::Model,
    actor_id: Id,
) -> Result<Actor, Error> {
    let actor_user = user::find_by_id(db, actor_id).await?;
    Ok(Actor {
        role: actor_user.role,
        is_requester: case.requester_id == actor_id,
    })
}

/// Validates and applies a case status transition, audit-logging the change
/// and publishing a status event. Closure additionally requires every
/// non-cancelled variable to have reached a terminal state.
pub async fn update_status(
    db: &DatabaseConnection,
    publisher: &EventPublisher,
    case_id: Id,
    target: CaseStatus,
    actor_id: Id,
) -> Result<cases::Model, Error> {
    let current_case = case::find_by_id(db, case_id).await?;
    let actor = load_actor(db, &current_case, actor_id).await?;

    case_workflow::validate_transition(current_case.status, target, &actor)?;

    if target == CaseStatus::Closed {
        let variables = case_variable::find_by_case_id(db, case_id).await?;
        case_workflow::can_close(&variables)?;
    }

    let old_status = current_case.status;
    let updated = case::update_status(db, case_id, target).await?;

    info!("Case {case_id} moved {old_status} -> {target} by {actor_id}");

    publisher
        .publish(DomainEvent::CaseStatusChanged {
            case_id,
            old_status: old_status.to_string(),
            new_status: target.to_string(),
            case: json!(updated.clone()),
            notify_user_ids: vec![updated.requester_id],
        })
        .await;

    Ok(updated)
}

/// Cancels one variable with an audit trail and a neutral history entry.
pub async fn cancel_variable(
    db: &DatabaseConnection,
    publisher: &EventPublisher,
    variable_id: Id,
    actor_id: Id,
    reason: Option<String>,
) -> Result<case_variables::Model, Error> {
    let variable = case_variable::find_by_id(db, variable_id).await?;
    let case = case::find_by_id(db, variable.case_id).await?;
    let actor = load_actor(db, &case, actor_id).await?;

    if !actor.is_requester && !actor.role.at_least(&Role::Manager) {
        return Err(Error::business(
            BusinessRuleKind::Unauthorized,
            "only the owning requester or a manager can cancel a variable",
        ));
    }
    if variable.is_cancelled {
        return Err(Error::business(
            BusinessRuleKind::InvalidTransition,
            "the variable is already cancelled",
        ));
    }

    let old_status = variable.search_status;
    let cancelled = case_variable::cancel(db, variable_id, actor_id, reason).await?;
    decision_history::record_variable_cancelled(db, &cancelled, actor_id).await?;

    publisher
        .publish(DomainEvent::VariableStatusChanged {
            case_id: case.id,
            case_variable_id: variable_id,
            old_status: old_status.to_string(),
            new_status: cancelled.search_status.to_string(),
            notify_user_ids: vec![case.requester_id],
        })
        .await;

    Ok(cancelled)
}

/// Admin-only hard delete; variables cascade at the database level.
pub async fn delete(db: &DatabaseConnection, case_id: Id, actor_id: Id) -> Result<(), Error> {
    let actor_user = user::find_by_id(db, actor_id).await?;
    if actor_user.role != Role::Admin {
        return Err(Error::business(
            BusinessRuleKind::Unauthorized,
            "only an admin can delete a case",
        ));
    }

    warn!("Case {case_id} deleted by admin {actor_id}");
    Ok(case::delete_by_id(db, case_id).await?)
}
