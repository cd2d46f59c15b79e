//! Multi-party review of suggested matches.
//!
//! The table owner answers first (confirm, correct, data-not-exist or
//! delegate); the requester has the final word on owner-validated matches.
//! Both answers are append-only records; this module advances match and
//! variable state around them, feeds the approval-history loop and the
//! decision-history log, and emits review events.

use crate::error::{BusinessRuleKind, Error};
use crate::{approval_feedback, decision_history, involvement};
use entity::match_status::MatchStatus;
use entity::response_types::{OwnerResponseType, RequesterResponseType};
use entity::search_status::SearchStatus;
use entity::{owner_responses, requester_responses, variable_matches, Id};
use entity_api::{
    case, case_variable, data_table, owner_response, requester_response, variable_match,
};
use events::{DomainEvent, EventPublisher, RecipientRole};
use log::*;
use sea_orm::DatabaseConnection;

/// An owner's answer to a suggested match.
#[derive(Debug, Clone)]
pub struct OwnerDecision {
    pub variable_match_id: Id,
    pub responder_id: Id,
    pub response_type: OwnerResponseType,
    pub corrected_table_id: Option<Id>,
    pub delegate_user_id: Option<Id>,
    pub comment: Option<String>,
}

enum OwnerAction {
    Confirm,
    Correct(Id),
    NotExist,
    Delegate(Id),
}

/// The requester's final word on an owner-validated match.
#[derive(Debug, Clone)]
pub struct RequesterDecision {
    pub variable_match_id: Id,
    pub responder_id: Id,
    pub response_type: RequesterResponseType,
    pub comment: Option<String>,
}

pub async fn submit_owner_response(
    db: &DatabaseConnection,
    publisher: &EventPublisher,
    decision: OwnerDecision,
) -> Result<owner_responses::Model, Error> {
    let variable_match = variable_match::find_by_id(db, decision.variable_match_id).await?;
    let variable = case_variable::find_by_id(db, variable_match.case_variable_id).await?;
    let table = data_table::find_by_id(db, variable_match.data_table_id).await?;
    let case = case::find_by_id(db, variable.case_id).await?;

    if variable_match.status != MatchStatus::Suggested {
        return Err(Error::business(
            BusinessRuleKind::MatchNotAwaitingReview,
            format!(
                "match {} is {} and no longer accepts an owner response",
                variable_match.id, variable_match.status
            ),
        ));
    }
    if table.owner_id != decision.responder_id {
        return Err(Error::business(
            BusinessRuleKind::Unauthorized,
            "only the table's owner can answer this suggestion",
        ));
    }

    // Validate the payload before any mutation happens.
    let action = match decision.response_type {
        OwnerResponseType::ConfirmMatch => OwnerAction::Confirm,
        OwnerResponseType::CorrectTable => OwnerAction::Correct(
            decision.corrected_table_id.ok_or_else(|| {
                Error::validation("correct_table responses must name the corrected table")
            })?,
        ),
        OwnerResponseType::DataNotExist => OwnerAction::NotExist,
        OwnerResponseType::DelegateOwner => OwnerAction::Delegate(
            decision.delegate_user_id.ok_or_else(|| {
                Error::validation("delegate_owner responses must name the delegate")
            })?,
        ),
    };

    let response = owner_response::create(
        db,
        owner_responses::Model {
            id: Id::new_v4(),
            variable_match_id: variable_match.id,
            responder_id: decision.responder_id,
            response_type: decision.response_type,
            corrected_table_id: decision.corrected_table_id,
            delegate_user_id: decision.delegate_user_id,
            comment: decision.comment,
            created_at: chrono::Utc::now().into(),
        },
    )
    .await?;

    match action {
        OwnerAction::Confirm => {
            let updated =
                variable_match::update_status(db, variable_match.id, MatchStatus::RequesterPending)
                    .await?;
            case_variable::update_search_status(db, variable.id, SearchStatus::RequesterReview)
                .await?;
            decision_history::record_owner_response(db, &variable, &table, &updated, &response)
                .await?;

            publisher
                .publish(DomainEvent::ReviewNeeded {
                    case_id: case.id,
                    case_variable_id: variable.id,
                    variable_match_id: Some(updated.id),
                    recipient_role: RecipientRole::Requester,
                    notify_user_ids: vec![case.requester_id],
                })
                .await;
        }
        OwnerAction::Correct(corrected_table_id) => {
            let corrected_table = data_table::find_by_id(db, corrected_table_id).await?;

            let redirected =
                variable_match::update_status(db, variable_match.id, MatchStatus::OwnerRedirected)
                    .await?;
            decision_history::record_owner_response(db, &variable, &table, &redirected, &response)
                .await?;

            // The replacement match skips scoring entirely; the owner named
            // the table.
            let replacement = variable_match::create(
                db,
                variable_matches::Model {
                    id: Id::new_v4(),
                    case_variable_id: variable.id,
                    data_table_id: corrected_table.id,
                    score: 1.0,
                    reasons: "table named directly by its owner".to_owned(),
                    status: MatchStatus::RequesterPending,
                    created_at: chrono::Utc::now().into(),
                    updated_at: chrono::Utc::now().into(),
                },
            )
            .await?;
            case_variable::update_search_status(db, variable.id, SearchStatus::RequesterReview)
                .await?;

            publisher
                .publish(DomainEvent::ReviewNeeded {
                    case_id: case.id,
                    case_variable_id: variable.id,
                    variable_match_id: Some(replacement.id),
                    recipient_role: RecipientRole::Requester,
                    notify_user_ids: vec![case.requester_id],
                })
                .await;
        }
        OwnerAction::NotExist => {
            let updated =
                variable_match::update_status(db, variable_match.id, MatchStatus::OwnerRejected)
                    .await?;
            decision_history::record_owner_response(db, &variable, &table, &updated, &response)
                .await?;

            involvement::open(db, variable.id, case.requester_id, table.owner_id).await?;
            let refreshed =
                case_variable::update_search_status(db, variable.id, SearchStatus::NoMatch).await?;

            publisher
                .publish(DomainEvent::VariableStatusChanged {
                    case_id: case.id,
                    case_variable_id: variable.id,
                    old_status: variable.search_status.to_string(),
                    new_status: refreshed.search_status.to_string(),
                    notify_user_ids: vec![case.requester_id],
                })
                .await;
        }
        OwnerAction::Delegate(delegate_id) => {
            decision_history::record_owner_response(
                db,
                &variable,
                &table,
                &variable_match,
                &response,
            )
            .await?;

            publisher
                .publish(DomainEvent::ReviewNeeded {
                    case_id: case.id,
                    case_variable_id: variable.id,
                    variable_match_id: Some(variable_match.id),
                    recipient_role: RecipientRole::TableOwner,
                    notify_user_ids: vec![delegate_id],
                })
                .await;
        }
    }

    info!(
        "Owner response {} on match {}: {}",
        response.id, variable_match.id, response.response_type
    );

    Ok(response)
}

pub async fn submit_requester_response(
    db: &DatabaseConnection,
    publisher: &EventPublisher,
    decision: RequesterDecision,
) -> Result<requester_responses::Model, Error> {
    let variable_match = variable_match::find_by_id(db, decision.variable_match_id).await?;
    let variable = case_variable::find_by_id(db, variable_match.case_variable_id).await?;
    let table = data_table::find_by_id(db, variable_match.data_table_id).await?;
    let case = case::find_by_id(db, variable.case_id).await?;

    if case.requester_id != decision.responder_id {
        return Err(Error::business(
            BusinessRuleKind::Unauthorized,
            "only the case's requester can give the final word on a match",
        ));
    }
    if variable_match.status != MatchStatus::RequesterPending {
        return Err(Error::business(
            BusinessRuleKind::MatchNotAwaitingReview,
            format!(
                "match {} is {} and is not awaiting the requester",
                variable_match.id, variable_match.status
            ),
        ));
    }

    if decision.response_type == RequesterResponseType::Approve {
        // One accepted match per variable: refuse if a sibling match was
        // accepted in the meantime.
        let siblings = variable_match::find_by_variable_id(db, variable.id).await?;
        if siblings
            .iter()
            .any(|m| m.id != variable_match.id && m.status == MatchStatus::Accepted)
        {
            return Err(Error::business(
                BusinessRuleKind::MatchNotAwaitingReview,
                "another match was already accepted for this variable",
            ));
        }
    }

    let response = requester_response::create(
        db,
        requester_responses::Model {
            id: Id::new_v4(),
            variable_match_id: variable_match.id,
            responder_id: decision.responder_id,
            response_type: decision.response_type,
            comment: decision.comment,
            created_at: chrono::Utc::now().into(),
        },
    )
    .await?;

    let old_status = variable.search_status;

    match decision.response_type {
        RequesterResponseType::Approve => {
            let accepted =
                variable_match::update_status(db, variable_match.id, MatchStatus::Accepted).await?;
            let refreshed =
                case_variable::update_search_status(db, variable.id, SearchStatus::InUse).await?;
            approval_feedback::record(db, &variable, table.id, true).await?;
            decision_history::record_requester_response(db, &variable, &table, &accepted, &response)
                .await?;

            publisher
                .publish(DomainEvent::VariableStatusChanged {
                    case_id: case.id,
                    case_variable_id: variable.id,
                    old_status: old_status.to_string(),
                    new_status: refreshed.search_status.to_string(),
                    notify_user_ids: vec![case.requester_id, table.owner_id],
                })
                .await;
        }
        RequesterResponseType::RejectMatch => {
            let declined =
                variable_match::update_status(db, variable_match.id, MatchStatus::Declined).await?;
            approval_feedback::record(db, &variable, table.id, false).await?;
            decision_history::record_requester_response(db, &variable, &table, &declined, &response)
                .await?;

            // Fall back to the remaining candidates, if any.
            let siblings = variable_match::find_by_variable_id(db, variable.id).await?;
            let has_open_candidates = siblings.iter().any(|m| {
                matches!(
                    m.status,
                    MatchStatus::Suggested | MatchStatus::RequesterPending
                )
            });
            let next_status = if has_open_candidates {
                SearchStatus::Matched
            } else {
                SearchStatus::NoMatch
            };
            case_variable::update_search_status(db, variable.id, next_status).await?;
        }
        RequesterResponseType::RejectAndCancel => {
            let declined =
                variable_match::update_status(db, variable_match.id, MatchStatus::Declined).await?;
            approval_feedback::record(db, &variable, table.id, false).await?;
            decision_history::record_requester_response(db, &variable, &table, &declined, &response)
                .await?;

            let cancelled = case_variable::cancel(
                db,
                variable.id,
                decision.responder_id,
                Some("rejected by requester".to_owned()),
            )
            .await?;
            decision_history::record_variable_cancelled(db, &cancelled, decision.responder_id)
                .await?;

            publisher
                .publish(DomainEvent::VariableStatusChanged {
                    case_id: case.id,
                    case_variable_id: variable.id,
                    old_status: old_status.to_string(),
                    new_status: cancelled.search_status.to_string(),
                    notify_user_ids: vec![case.requester_id, table.owner_id],
                })
                .await;
        }
    }

    info!(
        "Requester response {} on match {}: {}",
        response.id, variable_match.id, response.response_type
    );

    Ok(response)
}
