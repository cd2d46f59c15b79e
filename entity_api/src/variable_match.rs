use std::collections::HashSet;

use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, QueryOrder, TryIntoModel,
};

use super::error::{EntityApiErrorKind, Error};
use entity::match_status::MatchStatus;
use entity::variable_matches::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;

pub async fn create(db: &DatabaseConnection, match_model: Model) -> Result<Model, Error> {
    debug!("New VariableMatch Model to be inserted: {match_model:?}");

    let now = chrono::Utc::now();

    let match_active_model: ActiveModel = ActiveModel {
        case_variable_id: Set(match_model.case_variable_id),
        data_table_id: Set(match_model.data_table_id),
        score: Set(match_model.score),
        reasons: Set(match_model.reasons),
        status: Set(match_model.status),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    // A unique constraint on (case_variable_id, data_table_id) turns racing
    // inserts into a RecordAlreadyExists error instead of a duplicate row.
    Ok(match_active_model.save(db).await?.try_into_model()?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// All matches for a variable ordered by score, best first.
pub async fn find_by_variable_id(db: &DatabaseConnection, variable_id: Id) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::CaseVariableId.eq(variable_id))
        .order_by_desc(Column::Score)
        .all(db)
        .await?)
}

/// The set of table ids that already have a match record for this variable.
/// Lets a re-run of the search skip pairs it has produced before.
pub async fn matched_table_ids(
    db: &DatabaseConnection,
    variable_id: Id,
) -> Result<HashSet<Id>, Error> {
    let matches = find_by_variable_id(db, variable_id).await?;
    Ok(matches.into_iter().map(|m| m.data_table_id).collect())
}

pub async fn update_status(
    db: &DatabaseConnection,
    id: Id,
    status: MatchStatus,
) -> Result<Model, Error> {
    let result = Entity::find_by_id(id).one(db).await?;

    match result {
        Some(variable_match) => {
            let active_model: ActiveModel = ActiveModel {
                id: Unchanged(variable_match.id),
                status: Set(status),
                updated_at: Set(chrono::Utc::now().into()),
                ..Default::default()
            };

            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => {
            error!("VariableMatch with id {id} not found");

            Err(Error {
                source: None,
                error_kind: EntityApiErrorKind::RecordNotFound,
            })
        }
    }
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn match_model(now: chrono::DateTime<chrono::Utc>) -> Model {
        Model {
            id: Id::new_v4(),
            case_variable_id: Id::new_v4(),
            data_table_id: Id::new_v4(),
            score: 0.72,
            reasons: "strong name and concept overlap".to_owned(),
            status: MatchStatus::Suggested,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_returns_a_new_match_model() -> Result<(), Error> {
        let now = chrono::Utc::now();
        let model = match_model(now);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let variable_match = create(&db, model.clone()).await?;

        assert_eq!(variable_match.data_table_id, model.data_table_id);

        Ok(())
    }

    #[tokio::test]
    async fn matched_table_ids_collects_existing_pairs() -> Result<(), Error> {
        let now = chrono::Utc::now();
        let first = match_model(now);
        let mut second = match_model(now);
        second.case_variable_id = first.case_variable_id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![first.clone(), second.clone()]])
            .into_connection();

        let ids = matched_table_ids(&db, first.case_variable_id).await?;

        assert!(ids.contains(&first.data_table_id));
        assert!(ids.contains(&second.data_table_id));

        Ok(())
    }

    #[tokio::test]
    async fn update_status_returns_error_when_match_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .into_connection();

        let result = update_status(&db, Id::new_v4(), MatchStatus::Accepted).await;

        assert!(result.is_err());
    }
}
