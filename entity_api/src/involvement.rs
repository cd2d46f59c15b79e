use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, TryIntoModel,
};

use super::error::{EntityApiErrorKind, Error};
use entity::involvement_status::InvolvementStatus;
use entity::involvements::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;

pub async fn create(db: &DatabaseConnection, involvement_model: Model) -> Result<Model, Error> {
    debug!("New Involvement Model to be inserted: {involvement_model:?}");

    let now = chrono::Utc::now();

    let active_model: ActiveModel = ActiveModel {
        case_variable_id: Set(involvement_model.case_variable_id),
        requester_id: Set(involvement_model.requester_id),
        owner_id: Set(involvement_model.owner_id),
        status: Set(InvolvementStatus::Pending),
        reminder_count: Set(0),
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

pub async fn set_expected_date(
    db: &DatabaseConnection,
    id: Id,
    expected: chrono::NaiveDate,
) -> Result<Model, Error> {
    let involvement = find_by_id(db, id).await?;

    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(involvement.id),
        status: Set(InvolvementStatus::InProgress),
        expected_completion_date: Set(Some(expected)),
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

pub async fn complete(
    db: &DatabaseConnection,
    id: Id,
    created_table_name: String,
    created_concept: Option<String>,
    completed_on: chrono::NaiveDate,
) -> Result<Model, Error> {
    let involvement = find_by_id(db, id).await?;

    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(involvement.id),
        status: Set(InvolvementStatus::Completed),
        actual_completion_date: Set(Some(completed_on)),
        created_table_name: Set(Some(created_table_name)),
        created_concept: Set(created_concept),
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Incomplete involvements whose expected date has passed. Feeds the
/// reminder sweep; stored status is left untouched.
pub async fn find_overdue(db: &DatabaseConnection, today: chrono::NaiveDate) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::Status.ne(InvolvementStatus::Completed))
        .filter(Column::ExpectedCompletionDate.lt(today))
        .all(db)
        .await?)
}

pub async fn bump_reminder(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    let involvement = find_by_id(db, id).await?;
    let now = chrono::Utc::now();

    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(involvement.id),
        reminder_count: Set(involvement.reminder_count + 1),
        last_reminder_at: Set(Some(now.into())),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}
