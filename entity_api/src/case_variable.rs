use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, QueryOrder, TryIntoModel,
};

use super::error::{EntityApiErrorKind, Error};
use entity::case_variables::{ActiveModel, Column, Entity, Model};
use entity::search_status::SearchStatus;
use entity::Id;
use log::*;

pub async fn create(db: &DatabaseConnection, variable_model: Model) -> Result<Model, Error> {
    debug!("New CaseVariable Model to be inserted: {variable_model:?}");

    let now = chrono::Utc::now();

    let variable_active_model: ActiveModel = ActiveModel {
        case_id: Set(variable_model.case_id),
        name: Set(variable_model.name),
        variable_type: Set(variable_model.variable_type),
        concept: Set(variable_model.concept),
        search_status: Set(variable_model.search_status),
        is_cancelled: Set(false),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(variable_active_model.save(db).await?.try_into_model()?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

pub async fn find_by_case_id(db: &DatabaseConnection, case_id: Id) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::CaseId.eq(case_id))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?)
}

/// Marks the start of a search run: status goes to `Searching` and the start
/// timestamp is stamped.
pub async fn mark_searching(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    let variable = find_by_id(db, id).await?;
    let now = chrono::Utc::now();

    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(variable.id),
        search_status: Set(SearchStatus::Searching),
        search_started_at: Set(Some(now.into())),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Marks the end of a search run with its resulting status and stamps the
/// completion timestamp.
pub async fn complete_search(
    db: &DatabaseConnection,
    id: Id,
    status: SearchStatus,
) -> Result<Model, Error> {
    let variable = find_by_id(db, id).await?;
    let now = chrono::Utc::now();

    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(variable.id),
        search_status: Set(status),
        search_completed_at: Set(Some(now.into())),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

pub async fn update_search_status(
    db: &DatabaseConnection,
    id: Id,
    status: SearchStatus,
) -> Result<Model, Error> {
    let variable = find_by_id(db, id).await?;

    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(variable.id),
        search_status: Set(status),
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

pub async fn cancel(
    db: &DatabaseConnection,
    id: Id,
    cancelled_by: Id,
    reason: Option<String>,
) -> Result<Model, Error> {
    let variable = find_by_id(db, id).await?;
    let now = chrono::Utc::now();

    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(variable.id),
        search_status: Set(SearchStatus::Cancelled),
        is_cancelled: Set(true),
        cancelled_at: Set(Some(now.into())),
        cancelled_by: Set(Some(cancelled_by)),
        cancel_reason: Set(reason),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn variable_model(now: chrono::DateTime<chrono::Utc>) -> Model {
        Model {
            id: Id::new_v4(),
            case_id: Id::new_v4(),
            name: "receita_total".to_owned(),
            variable_type: "currency".to_owned(),
            concept: Some("total revenue per customer".to_owned()),
            search_status: SearchStatus::Pending,
            is_cancelled: false,
            cancelled_at: None,
            cancelled_by: None,
            cancel_reason: None,
            search_started_at: None,
            search_completed_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn mark_searching_stamps_start_and_status() -> Result<(), Error> {
        let now = chrono::Utc::now();
        let model = variable_model(now);
        let mut searching = model.clone();
        searching.search_status = SearchStatus::Searching;
        searching.search_started_at = Some(now.into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()], vec![searching.clone()]])
            .into_connection();

        let variable = mark_searching(&db, model.id).await?;

        assert_eq!(variable.search_status, SearchStatus::Searching);
        assert!(variable.search_started_at.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn cancel_sets_audit_fields() -> Result<(), Error> {
        let now = chrono::Utc::now();
        let model = variable_model(now);
        let actor = Id::new_v4();
        let mut cancelled = model.clone();
        cancelled.search_status = SearchStatus::Cancelled;
        cancelled.is_cancelled = true;
        cancelled.cancelled_by = Some(actor);
        cancelled.cancel_reason = Some("duplicate request".to_owned());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()], vec![cancelled.clone()]])
            .into_connection();

        let variable = cancel(&db, model.id, actor, Some("duplicate request".to_owned())).await?;

        assert!(variable.is_cancelled);
        assert_eq!(variable.cancelled_by, Some(actor));

        Ok(())
    }
}
