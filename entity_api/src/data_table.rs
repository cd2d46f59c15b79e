use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, TryIntoModel,
};

use super::error::{EntityApiErrorKind, Error};
use entity::data_tables::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// All catalog tables eligible for matching.
pub async fn find_all_active(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::IsActive.eq(true))
        .all(db)
        .await?)
}

pub async fn find_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::Name.eq(name))
        .one(db)
        .await?)
}

/// Inserts or refreshes a catalog row keyed by its unique table name.
/// Used by the periodic sync job; overlapping runs converge on the same row.
pub async fn upsert_by_name(db: &DatabaseConnection, incoming: Model) -> Result<Model, Error> {
    let now = chrono::Utc::now();

    match find_by_name(db, &incoming.name).await? {
        Some(existing) => {
            let active_model: ActiveModel = ActiveModel {
                id: Unchanged(existing.id),
                display_name: Set(incoming.display_name),
                description: Set(incoming.description),
                domain: Set(incoming.domain),
                keywords: Set(incoming.keywords),
                owner_id: Set(incoming.owner_id),
                is_active: Set(true),
                synced_at: Set(Some(now.into())),
                updated_at: Set(now.into()),
                ..Default::default()
            };
            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => {
            debug!("New DataTable to be inserted from sync: {}", incoming.name);
            let active_model: ActiveModel = ActiveModel {
                name: Set(incoming.name),
                display_name: Set(incoming.display_name),
                description: Set(incoming.description),
                domain: Set(incoming.domain),
                keywords: Set(incoming.keywords),
                owner_id: Set(incoming.owner_id),
                is_active: Set(true),
                synced_at: Set(Some(now.into())),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            };
            Ok(active_model.save(db).await?.try_into_model()?)
        }
    }
}

/// Deactivates every active table whose name is absent from the current
/// registry feed. Returns how many rows were deactivated.
pub async fn deactivate_missing(
    db: &DatabaseConnection,
    current_names: &[String],
) -> Result<u64, Error> {
    let mut deactivated = 0;
    let active = find_all_active(db).await?;

    for table in active {
        if !current_names.contains(&table.name) {
            let active_model: ActiveModel = ActiveModel {
                id: Unchanged(table.id),
                is_active: Set(false),
                updated_at: Set(chrono::Utc::now().into()),
                ..Default::default()
            };
            active_model.update(db).await?;
            deactivated += 1;
        }
    }

    Ok(deactivated)
}
