use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, TryIntoModel,
};

use super::error::{EntityApiErrorKind, Error};
use entity::case_status::CaseStatus;
use entity::cases::{ActiveModel, Entity, Model};
use entity::Id;
use log::*;

pub async fn create(db: &DatabaseConnection, case_model: Model) -> Result<Model, Error> {
    debug!("New Case Model to be inserted: {case_model:?}");

    let now = chrono::Utc::now();

    let case_active_model: ActiveModel = ActiveModel {
        title: Set(case_model.title),
        status: Set(case_model.status),
        requester_id: Set(case_model.requester_id),
        macro_case: Set(case_model.macro_case),
        budget: Set(case_model.budget),
        starts_on: Set(case_model.starts_on),
        ends_on: Set(case_model.ends_on),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(case_active_model.save(db).await?.try_into_model()?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

pub async fn update_status(
    db: &DatabaseConnection,
    id: Id,
    status: CaseStatus,
) -> Result<Model, Error> {
    let case = find_by_id(db, id).await?;

    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(case.id),
        status: Set(status),
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

pub async fn update(
    db: &DatabaseConnection,
    id: Id,
    params: impl crate::mutate::IntoUpdateMap,
) -> Result<Model, Error> {
    use sea_orm::IntoActiveModel;

    let case = find_by_id(db, id).await?;
    let mut update_map = params.into_update_map();
    update_map.insert(
        "updated_at".to_string(),
        Some(sea_orm::Value::ChronoDateTimeWithTimeZone(Some(Box::new(
            chrono::Utc::now().into(),
        )))),
    );

    crate::mutate::update::<ActiveModel, entity::cases::Column>(
        db,
        case.into_active_model(),
        update_map,
    )
    .await
}

/// Admin-only removal; variables cascade at the database level.
pub async fn delete_by_id(db: &DatabaseConnection, id: Id) -> Result<(), Error> {
    let case = find_by_id(db, id).await?;
    case.delete(db).await?;
    Ok(())
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn case_model(now: chrono::DateTime<chrono::Utc>) -> Model {
        Model {
            id: Id::new_v4(),
            title: "Churn analysis".to_owned(),
            status: CaseStatus::Draft,
            requester_id: Id::new_v4(),
            macro_case: Some("customer analytics".to_owned()),
            budget: Some(25_000.0),
            starts_on: None,
            ends_on: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_returns_a_new_case_model() -> Result<(), Error> {
        let now = chrono::Utc::now();
        let model = case_model(now);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let case = create(&db, model.clone()).await?;

        assert_eq!(case.title, model.title);

        Ok(())
    }

    #[tokio::test]
    async fn update_status_returns_an_updated_case_model() -> Result<(), Error> {
        let now = chrono::Utc::now();
        let model = case_model(now);
        let mut updated = model.clone();
        updated.status = CaseStatus::Submitted;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()], vec![updated.clone()]])
            .into_connection();

        let case = update_status(&db, model.id, CaseStatus::Submitted).await?;

        assert_eq!(case.status, CaseStatus::Submitted);

        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_returns_error_when_case_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .into_connection();

        let result = find_by_id(&db, Id::new_v4()).await;

        assert!(result.is_err());
    }
}
