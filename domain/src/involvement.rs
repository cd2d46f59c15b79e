//! Involvement lifecycle: a table owner's commitment to create data that a
//! case requested but that does not exist yet.
//!
//! Stored transitions are Pending -> InProgress (owner commits to a date)
//! -> Completed (owner names the created table). Overdue is never stored:
//! it is derived from the expected date at read time and drives the
//! periodic reminder sweep.

use crate::error::{BusinessRuleKind, Error};
use chrono::NaiveDate;
use entity::involvement_status::InvolvementStatus;
use entity::{involvements, Id};
use entity_api::{case_variable, involvement};
use events::{DomainEvent, EventPublisher, RecipientRole};
use log::*;
use sea_orm::DatabaseConnection;

pub use entity_api::involvement::find_by_id;

/// Opens an involvement for a variable whose data does not exist yet.
/// Called by the review flow when an owner answers DATA_NOT_EXIST.
pub async fn open(
    db: &DatabaseConnection,
    case_variable_id: Id,
    requester_id: Id,
    owner_id: Id,
) -> Result<involvements::Model, Error> {
    let model = involvements::Model {
        id: Id::new_v4(),
        case_variable_id,
        requester_id,
        owner_id,
        status: InvolvementStatus::Pending,
        expected_completion_date: None,
        actual_completion_date: None,
        created_table_name: None,
        created_concept: None,
        reminder_count: 0,
        last_reminder_at: None,
        created_at: chrono::Utc::now().into(),
        updated_at: chrono::Utc::now().into(),
    };

    Ok(involvement::create(db, model).await?)
}

fn ensure_owner(involvement: &involvements::Model, actor_id: Id) -> Result<(), Error> {
    if involvement.owner_id == actor_id {
        Ok(())
    } else {
        Err(Error::business(
            BusinessRuleKind::Unauthorized,
            "only the committed table owner can update this involvement",
        ))
    }
}

/// Owner commits to an expected completion date; the involvement moves to
/// InProgress.
pub async fn set_expected_date(
    db: &DatabaseConnection,
    involvement_id: Id,
    actor_id: Id,
    expected: NaiveDate,
) -> Result<involvements::Model, Error> {
    let current = involvement::find_by_id(db, involvement_id).await?;
    ensure_owner(&current, actor_id)?;

    if current.status == InvolvementStatus::Completed {
        return Err(Error::business(
            BusinessRuleKind::InvalidTransition,
            "a completed involvement cannot be rescheduled",
        ));
    }

    Ok(involvement::set_expected_date(db, involvement_id, expected).await?)
}

/// Owner reports the data as created. Requires a committed date first.
pub async fn complete(
    db: &DatabaseConnection,
    involvement_id: Id,
    actor_id: Id,
    created_table_name: String,
    created_concept: Option<String>,
) -> Result<involvements::Model, Error> {
    let current = involvement::find_by_id(db, involvement_id).await?;
    ensure_owner(&current, actor_id)?;

    if current.expected_completion_date.is_none() {
        return Err(Error::business(
            BusinessRuleKind::MissingCompletionDate,
            "commit to an expected completion date before completing",
        ));
    }

    let today = chrono::Utc::now().date_naive();
    Ok(involvement::complete(db, involvement_id, created_table_name, created_concept, today)
        .await?)
}

/// Effective status at `today`: a stored Pending/InProgress whose expected
/// date has passed reads as Overdue. Stored state is never rewritten.
pub fn effective_status(involvement: &involvements::Model, today: NaiveDate) -> InvolvementStatus {
    if involvement.status == InvolvementStatus::Completed {
        return InvolvementStatus::Completed;
    }
    match involvement.expected_completion_date {
        Some(expected) if expected < today => InvolvementStatus::Overdue,
        _ => involvement.status,
    }
}

/// Periodic reminder sweep: bumps the reminder counter on every overdue
/// involvement and emits a review event for its owner. Safe under
/// overlapping invocations; stored status is left untouched.
pub async fn sweep_overdue(
    db: &DatabaseConnection,
    publisher: &EventPublisher,
) -> Result<u64, Error> {
    let today = chrono::Utc::now().date_naive();
    let overdue = involvement::find_overdue(db, today).await?;
    let mut reminded = 0;

    for row in overdue {
        involvement::bump_reminder(db, row.id).await?;
        let variable = case_variable::find_by_id(db, row.case_variable_id).await?;
        info!(
            "Involvement {} is overdue (expected {:?}); reminder #{} queued for owner {}",
            row.id,
            row.expected_completion_date,
            row.reminder_count + 1,
            row.owner_id
        );

        publisher
            .publish(DomainEvent::ReviewNeeded {
                case_id: variable.case_id,
                case_variable_id: variable.id,
                variable_match_id: None,
                recipient_role: RecipientRole::TableOwner,
                notify_user_ids: vec![row.owner_id],
            })
            .await;
        reminded += 1;
    }

    Ok(reminded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn involvement_row(
        status: InvolvementStatus,
        expected: Option<NaiveDate>,
    ) -> involvements::Model {
        let now = Utc::now();
        involvements::Model {
            id: Id::new_v4(),
            case_variable_id: Id::new_v4(),
            requester_id: Id::new_v4(),
            owner_id: Id::new_v4(),
            status,
            expected_completion_date: expected,
            actual_completion_date: None,
            created_table_name: None,
            created_concept: None,
            reminder_count: 0,
            last_reminder_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn effective_status_derives_overdue_from_expected_date() {
        let row = involvement_row(InvolvementStatus::InProgress, Some(date(2025, 1, 10)));

        assert_eq!(
            effective_status(&row, date(2025, 1, 11)),
            InvolvementStatus::Overdue
        );
        assert_eq!(
            effective_status(&row, date(2025, 1, 10)),
            InvolvementStatus::InProgress
        );
    }

    #[test]
    fn effective_status_without_date_is_stored_status() {
        let row = involvement_row(InvolvementStatus::Pending, None);

        assert_eq!(
            effective_status(&row, date(2025, 6, 1)),
            InvolvementStatus::Pending
        );
    }

    #[test]
    fn completed_involvement_never_reads_overdue() {
        let row = involvement_row(InvolvementStatus::Completed, Some(date(2025, 1, 1)));

        assert_eq!(
            effective_status(&row, date(2025, 2, 1)),
            InvolvementStatus::Completed
        );
    }

    #[test]
    fn ensure_owner_rejects_other_users() {
        let row = involvement_row(InvolvementStatus::Pending, None);

        assert!(ensure_owner(&row, row.owner_id).is_ok());
        assert!(ensure_owner(&row, Id::new_v4()).is_err());
    }
}
