use sea_orm::{
    entity::prelude::*, ActiveValue::Set, DatabaseConnection, QueryOrder, QuerySelect,
    TryIntoModel,
};

use super::error::Error;
use entity::decision_histories::{ActiveModel, Column, Entity, Model};
use entity::decision_outcome::DecisionPoint;
use entity::Id;

/// Decision history rows are append-only; there is no update or delete path.
pub async fn create(db: &DatabaseConnection, history_model: Model) -> Result<Model, Error> {
    let now = chrono::Utc::now();

    let active_model: ActiveModel = ActiveModel {
        case_id: Set(history_model.case_id),
        case_variable_id: Set(history_model.case_variable_id),
        variable_match_id: Set(history_model.variable_match_id),
        decision_point: Set(history_model.decision_point),
        outcome: Set(history_model.outcome),
        actor_id: Set(history_model.actor_id),
        variable_snapshot: Set(history_model.variable_snapshot),
        table_snapshot: Set(history_model.table_snapshot),
        match_snapshot: Set(history_model.match_snapshot),
        created_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

/// Filters for the training export. String ids arrive from the API boundary
/// and are parsed here; a malformed id is an invalid query term, not a miss.
#[derive(Debug, Default)]
pub struct HistoryFilter {
    pub case_id: Option<String>,
    pub case_variable_id: Option<String>,
    pub decision_point: Option<DecisionPoint>,
}

pub async fn find_filtered(
    db: &DatabaseConnection,
    filter: HistoryFilter,
    limit: u64,
    offset: u64,
) -> Result<Vec<Model>, Error> {
    let mut query = Entity::find();

    if let Some(case_id) = filter.case_id {
        let case_id: Id = crate::uuid_parse_str(&case_id)?;
        query = query.filter(Column::CaseId.eq(case_id));
    }
    if let Some(variable_id) = filter.case_variable_id {
        let variable_id: Id = crate::uuid_parse_str(&variable_id)?;
        query = query.filter(Column::CaseVariableId.eq(variable_id));
    }
    if let Some(decision_point) = filter.decision_point {
        query = query.filter(Column::DecisionPoint.eq(decision_point));
    }

    Ok(query
        .order_by_asc(Column::CreatedAt)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use entity::decision_outcome::DecisionOutcome;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn find_filtered_rejects_malformed_case_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let filter = HistoryFilter {
            case_id: Some("not-a-uuid".to_owned()),
            ..Default::default()
        };

        let result = find_filtered(&db, filter, 10, 0).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn create_returns_history_row() -> Result<(), Error> {
        let now = chrono::Utc::now();
        let model = Model {
            id: Id::new_v4(),
            case_id: Some(Id::new_v4()),
            case_variable_id: Some(Id::new_v4()),
            variable_match_id: None,
            decision_point: DecisionPoint::MatchSuggested,
            outcome: DecisionOutcome::Neutral,
            actor_id: None,
            variable_snapshot: Some("{}".to_owned()),
            table_snapshot: None,
            match_snapshot: None,
            created_at: now.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let row = create(&db, model.clone()).await?;

        assert_eq!(row.decision_point, DecisionPoint::MatchSuggested);

        Ok(())
    }
}
