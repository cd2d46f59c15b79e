//! Decision history recorder.
//!
//! Every workflow decision point is appended with point-in-time snapshots of
//! the variable, table and match involved, classified as positive, negative
//! or neutral. Rows are never mutated after insert; the flattened export
//! feeds offline learning.

use crate::error::Error;
use entity::decision_outcome::{DecisionOutcome, DecisionPoint};
use entity::{
    case_variables, cases, data_tables, decision_histories, owner_responses, requester_responses,
    variable_matches, Id,
};
use entity::response_types::{OwnerResponseType, RequesterResponseType};
use entity_api::decision_history;
pub use entity_api::decision_history::HistoryFilter;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn snapshot<T: Serialize>(value: &T) -> Result<String, Error> {
    Ok(serde_json::to_string(value)?)
}

/// Records the suggestion of a match by the search engine. Neutral: no
/// human has weighed in yet.
pub async fn record_match_suggested(
    db: &DatabaseConnection,
    case: &cases::Model,
    variable: &case_variables::Model,
    table: &data_tables::Model,
    variable_match: &variable_matches::Model,
) -> Result<decision_histories::Model, Error> {
    let model = decision_histories::Model {
        id: Id::new_v4(),
        case_id: Some(case.id),
        case_variable_id: Some(variable.id),
        variable_match_id: Some(variable_match.id),
        decision_point: DecisionPoint::MatchSuggested,
        outcome: DecisionOutcome::Neutral,
        actor_id: None,
        variable_snapshot: Some(snapshot(variable)?),
        table_snapshot: Some(snapshot(table)?),
        match_snapshot: Some(snapshot(variable_match)?),
        created_at: chrono::Utc::now().into(),
    };

    Ok(decision_history::create(db, model).await?)
}

/// Classification of an owner response for the training log.
fn owner_outcome(response_type: OwnerResponseType) -> DecisionOutcome {
    match response_type {
        OwnerResponseType::ConfirmMatch => DecisionOutcome::Positive,
        OwnerResponseType::DataNotExist => DecisionOutcome::Negative,
        OwnerResponseType::CorrectTable | OwnerResponseType::DelegateOwner => {
            DecisionOutcome::Neutral
        }
    }
}

pub async fn record_owner_response(
    db: &DatabaseConnection,
    variable: &case_variables::Model,
    table: &data_tables::Model,
    variable_match: &variable_matches::Model,
    response: &owner_responses::Model,
) -> Result<decision_histories::Model, Error> {
    let model = decision_histories::Model {
        id: Id::new_v4(),
        case_id: Some(variable.case_id),
        case_variable_id: Some(variable.id),
        variable_match_id: Some(variable_match.id),
        decision_point: DecisionPoint::OwnerResponse,
        outcome: owner_outcome(response.response_type),
        actor_id: Some(response.responder_id),
        variable_snapshot: Some(snapshot(variable)?),
        table_snapshot: Some(snapshot(table)?),
        match_snapshot: Some(snapshot(variable_match)?),
        created_at: chrono::Utc::now().into(),
    };

    Ok(decision_history::create(db, model).await?)
}

fn requester_outcome(response_type: RequesterResponseType) -> DecisionOutcome {
    match response_type {
        RequesterResponseType::Approve => DecisionOutcome::Positive,
        RequesterResponseType::RejectMatch | RequesterResponseType::RejectAndCancel => {
            DecisionOutcome::Negative
        }
    }
}

pub async fn record_requester_response(
    db: &DatabaseConnection,
    variable: &case_variables::Model,
    table: &data_tables::Model,
    variable_match: &variable_matches::Model,
    response: &requester_responses::Model,
) -> Result<decision_histories::Model, Error> {
    let model = decision_histories::Model {
        id: Id::new_v4(),
        case_id: Some(variable.case_id),
        case_variable_id: Some(variable.id),
        variable_match_id: Some(variable_match.id),
        decision_point: DecisionPoint::RequesterResponse,
        outcome: requester_outcome(response.response_type),
        actor_id: Some(response.responder_id),
        variable_snapshot: Some(snapshot(variable)?),
        table_snapshot: Some(snapshot(table)?),
        match_snapshot: Some(snapshot(variable_match)?),
        created_at: chrono::Utc::now().into(),
    };

    Ok(decision_history::create(db, model).await?)
}

pub async fn record_variable_cancelled(
    db: &DatabaseConnection,
    variable: &case_variables::Model,
    actor_id: Id,
) -> Result<decision_histories::Model, Error> {
    let model = decision_histories::Model {
        id: Id::new_v4(),
        case_id: Some(variable.case_id),
        case_variable_id: Some(variable.id),
        variable_match_id: None,
        decision_point: DecisionPoint::VariableCancelled,
        outcome: DecisionOutcome::Neutral,
        actor_id: Some(actor_id),
        variable_snapshot: Some(snapshot(variable)?),
        table_snapshot: None,
        match_snapshot: None,
        created_at: chrono::Utc::now().into(),
    };

    Ok(decision_history::create(db, model).await?)
}

/// One flattened training record: the history row with the load-bearing
/// snapshot fields pulled out of their JSON blobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub history_id: Id,
    pub case_id: Option<Id>,
    pub case_variable_id: Option<Id>,
    pub variable_match_id: Option<Id>,
    pub decision_point: DecisionPoint,
    pub outcome: DecisionOutcome,
    pub actor_id: Option<Id>,
    pub variable_name: Option<String>,
    pub variable_type: Option<String>,
    pub concept: Option<String>,
    pub table_id: Option<Id>,
    pub table_name: Option<String>,
    pub match_score: Option<f64>,
}

fn json_field(snapshot: Option<&str>, field: &str) -> Option<Value> {
    let value: Value = serde_json::from_str(snapshot?).ok()?;
    value.get(field).cloned()
}

fn json_string(snapshot: Option<&str>, field: &str) -> Option<String> {
    match json_field(snapshot, field)? {
        Value::String(s) => Some(s),
        _ => None,
    }
}

/// Flattens stored history rows into export records. Pure over the loaded
/// rows; snapshot fields that fail to parse degrade to absent options.
pub fn flatten(rows: Vec<decision_histories::Model>) -> Vec<ExportRecord> {
    rows.into_iter()
        .map(|row| ExportRecord {
            history_id: row.id,
            case_id: row.case_id,
            case_variable_id: row.case_variable_id,
            variable_match_id: row.variable_match_id,
            decision_point: row.decision_point,
            outcome: row.outcome,
            actor_id: row.actor_id,
            variable_name: json_string(row.variable_snapshot.as_deref(), "name"),
            variable_type: json_string(row.variable_snapshot.as_deref(), "variable_type"),
            concept: json_string(row.variable_snapshot.as_deref(), "concept"),
            table_id: json_string(row.table_snapshot.as_deref(), "id")
                .and_then(|raw| raw.parse().ok()),
            table_name: json_string(row.table_snapshot.as_deref(), "name"),
            match_score: json_field(row.match_snapshot.as_deref(), "score")
                .and_then(|value| value.as_f64()),
        })
        .collect()
}

/// Training export with filters and paging.
pub async fn export(
    db: &DatabaseConnection,
    filter: HistoryFilter,
    limit: u64,
    offset: u64,
) -> Result<Vec<ExportRecord>, Error> {
    let rows = decision_history::find_filtered(db, filter, limit, offset).await?;
    Ok(flatten(rows))
}

/// A (concept hash x table, verdict) pair reconstructed from an export.
/// Re-importing an export reproduces exactly the pairs that fed the
/// approval-history counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedFeedback {
    pub concept_hash: String,
    pub data_table_id: Id,
    pub approved: bool,
}

/// Rebuilds the approval-feedback pairs from exported records. Only
/// requester responses feed the counters; other decision points are
/// training context and are skipped here.
pub fn import(records: &[ExportRecord]) -> Vec<ImportedFeedback> {
    records
        .iter()
        .filter(|record| record.decision_point == DecisionPoint::RequesterResponse)
        .filter_map(|record| {
            let name = record.variable_name.as_deref()?;
            let variable_type = record.variable_type.as_deref()?;
            let data_table_id = record.table_id?;
            Some(ImportedFeedback {
                concept_hash: crate::scoring::concept_hash(name, variable_type),
                data_table_id,
                approved: record.outcome == DecisionOutcome::Positive,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use entity::match_status::MatchStatus;
    use entity::search_status::SearchStatus;

    fn history_row(
        decision_point: DecisionPoint,
        outcome: DecisionOutcome,
        variable_name: &str,
        table_id: Id,
    ) -> decision_histories::Model {
        let now = Utc::now();
        let variable = case_variables::Model {
            id: Id::new_v4(),
            case_id: Id::new_v4(),
            name: variable_name.to_owned(),
            variable_type: "currency".to_owned(),
            concept: Some("receita mensal".to_owned()),
            search_status: SearchStatus::RequesterReview,
            is_cancelled: false,
            cancelled_at: None,
            cancelled_by: None,
            cancel_reason: None,
            search_started_at: None,
            search_completed_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let table = data_tables::Model {
            id: table_id,
            name: "tb_receita".to_owned(),
            display_name: None,
            description: None,
            domain: None,
            keywords: None,
            owner_id: Id::new_v4(),
            is_active: true,
            synced_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let variable_match = variable_matches::Model {
            id: Id::new_v4(),
            case_variable_id: variable.id,
            data_table_id: table.id,
            score: 0.66,
            reasons: "keywords match".to_owned(),
            status: MatchStatus::RequesterPending,
            created_at: now.into(),
            updated_at: now.into(),
        };

        decision_histories::Model {
            id: Id::new_v4(),
            case_id: Some(variable.case_id),
            case_variable_id: Some(variable.id),
            variable_match_id: Some(variable_match.id),
            decision_point,
            outcome,
            actor_id: Some(Id::new_v4()),
            variable_snapshot: Some(serde_json::to_string(&variable).unwrap()),
            table_snapshot: Some(serde_json::to_string(&table).unwrap()),
            match_snapshot: Some(serde_json::to_string(&variable_match).unwrap()),
            created_at: now.into(),
        }
    }

    #[test]
    fn flatten_extracts_snapshot_fields() {
        let table_id = Id::new_v4();
        let rows = vec![history_row(
            DecisionPoint::RequesterResponse,
            DecisionOutcome::Positive,
            "receita_total",
            table_id,
        )];

        let records = flatten(rows);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].variable_name.as_deref(), Some("receita_total"));
        assert_eq!(records[0].table_id, Some(table_id));
        assert_eq!(records[0].match_score, Some(0.66));
    }

    #[test]
    fn flatten_degrades_gracefully_on_broken_snapshots() {
        let mut row = history_row(
            DecisionPoint::OwnerResponse,
            DecisionOutcome::Neutral,
            "x",
            Id::new_v4(),
        );
        row.variable_snapshot = Some("not json".to_owned());
        row.table_snapshot = None;

        let records = flatten(vec![row]);

        assert_eq!(records[0].variable_name, None);
        assert_eq!(records[0].table_id, None);
    }

    #[test]
    fn export_import_round_trip_reproduces_feedback_pairs() {
        let approved_table = Id::new_v4();
        let rejected_table = Id::new_v4();
        let rows = vec![
            history_row(
                DecisionPoint::MatchSuggested,
                DecisionOutcome::Neutral,
                "receita_total",
                approved_table,
            ),
            history_row(
                DecisionPoint::RequesterResponse,
                DecisionOutcome::Positive,
                "receita_total",
                approved_table,
            ),
            history_row(
                DecisionPoint::RequesterResponse,
                DecisionOutcome::Negative,
                "margem_bruta",
                rejected_table,
            ),
        ];

        let imported = import(&flatten(rows));

        assert_eq!(imported.len(), 2);
        assert_eq!(
            imported[0],
            ImportedFeedback {
                concept_hash: crate::scoring::concept_hash("receita_total", "currency"),
                data_table_id: approved_table,
                approved: true,
            }
        );
        assert_eq!(
            imported[1],
            ImportedFeedback {
                concept_hash: crate::scoring::concept_hash("margem_bruta", "currency"),
                data_table_id: rejected_table,
                approved: false,
            }
        );
    }
}
