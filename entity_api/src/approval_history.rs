use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, TryIntoModel,
};

use super::error::Error;
use entity::approval_histories::{ActiveModel, Column, Entity, Model};
use entity::Id;

pub async fn find_by_key(
    db: &DatabaseConnection,
    concept_hash: &str,
    data_table_id: Id,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::ConceptHash.eq(concept_hash))
        .filter(Column::DataTableId.eq(data_table_id))
        .one(db)
        .await?)
}

/// Upserts the (concept_hash, data_table_id) row, bumping the approved or
/// rejected counter. Counters only ever grow; the unique key makes
/// overlapping feedback writes converge on the same row.
pub async fn record(
    db: &DatabaseConnection,
    concept_hash: &str,
    data_table_id: Id,
    approved: bool,
) -> Result<Model, Error> {
    let now = chrono::Utc::now();

    match find_by_key(db, concept_hash, data_table_id).await? {
        Some(existing) => {
            let active_model: ActiveModel = ActiveModel {
                id: Unchanged(existing.id),
                approved_count: Set(existing.approved_count + i32::from(approved)),
                rejected_count: Set(existing.rejected_count + i32::from(!approved)),
                last_used_at: Set(Some(now.into())),
                updated_at: Set(now.into()),
                ..Default::default()
            };
            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => {
            let active_model: ActiveModel = ActiveModel {
                concept_hash: Set(concept_hash.to_owned()),
                data_table_id: Set(data_table_id),
                approved_count: Set(i32::from(approved)),
                rejected_count: Set(i32::from(!approved)),
                last_used_at: Set(Some(now.into())),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            };
            Ok(active_model.save(db).await?.try_into_model()?)
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

    #[tokio::test]
    async fn record_increments_approved_count_on_existing_row() -> Result<(), Error> {
        let now = chrono::Utc::now();
        let existing = Model {
            id: Id::new_v4(),
            concept_hash: "a".repeat(32),
            data_table_id: Id::new_v4(),
            approved_count: 6,
            rejected_count: 3,
            last_used_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let mut bumped = existing.clone();
        bumped.approved_count = 7;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![existing.clone()], vec![bumped.clone()]])
            .into_connection();

        let row = record(&db, &existing.concept_hash, existing.data_table_id, true).await?;

        assert_eq!(row.approved_count, 7);
        assert_eq!(row.rejected_count, 3);

        Ok(())
    }

    #[tokio::test]
    async fn record_creates_row_when_absent() -> Result<(), Error> {
        let now = chrono::Utc::now();
        let created = Model {
            id: Id::new_v4(),
            concept_hash: "b".repeat(32),
            data_table_id: Id::new_v4(),
            approved_count: 0,
            rejected_count: 1,
            last_used_at: Some(now.into()),
            created_at: now.into(),
            updated_at: now.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .append_query_results(vec![vec![created.clone()]])
            .into_connection();

        let row = record(&db, &created.concept_hash, created.data_table_id, false).await?;

        assert_eq!(row.rejected_count, 1);

        Ok(())
    }
}
