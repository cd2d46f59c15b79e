//! Match search: scores every active catalog table against one variable,
//! keeps the best candidates and persists them as suggested matches.
//!
//! The ranking itself is a pure function over loaded models; `run_search`
//! wraps it with the persistence choreography (status stamps, idempotent
//! inserts, decision-history entries and review notifications).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::decision_history;
use crate::error::{self, Error};
use crate::scoring::{self, ScoringConfig};
use entity::match_status::MatchStatus;
use entity::search_status::SearchStatus;
use entity::{data_tables, variable_matches, Id};
use entity_api::{approval_history, case, case_variable, data_table, variable_match};
use events::{DomainEvent, EventPublisher, RecipientRole};
use log::*;
use sea_orm::DatabaseConnection;

/// A surviving candidate produced by [`rank_candidates`].
#[derive(Debug, Clone)]
pub struct Candidate {
    pub table_id: Id,
    pub score: f64,
    pub reasons: String,
}

/// Scores all (variable, table) pairs, discards those below the cutoff,
/// ranks the rest by score descending, keeps the top N and skips pairs that
/// already carry a match record. Pure; all inputs are pre-loaded.
pub fn rank_candidates(
    variable: &entity::case_variables::Model,
    tables: &[data_tables::Model],
    histories: &HashMap<Id, entity::approval_histories::Model>,
    macro_case: Option<&str>,
    existing_table_ids: &HashSet<Id>,
    config: &ScoringConfig,
) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = tables
        .iter()
        .map(|table| {
            let result =
                scoring::score(variable, table, histories.get(&table.id), macro_case, config);
            Candidate {
                table_id: table.id,
                score: result.score,
                reasons: result.reasons,
            }
        })
        .filter(|candidate| candidate.score >= config.min_match_score)
        .collect();

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.truncate(config.max_results);
    candidates.retain(|candidate| !existing_table_ids.contains(&candidate.table_id));

    candidates
}

/// Runs the match search for one variable end to end.
///
/// The variable is stamped `Searching` up front; on success it lands on
/// `Matched` or `NoMatch` with a completion timestamp. A failure mid-search
/// moves it to the `Failed` terminal state (re-triggerable) and surfaces the
/// error to the caller.
pub async fn run_search(
    db: &DatabaseConnection,
    publisher: &EventPublisher,
    config: &ScoringConfig,
    variable_id: Id,
) -> Result<Vec<variable_matches::Model>, Error> {
    let variable = case_variable::mark_searching(db, variable_id).await?;

    match search_inner(db, publisher, config, &variable).await {
        Ok(created) => Ok(created),
        Err(err) => {
            warn!("Match search for variable {variable_id} failed: {err}");
            if let Err(status_err) =
                case_variable::complete_search(db, variable_id, SearchStatus::Failed).await
            {
                error!("Could not mark variable {variable_id} as failed: {status_err}");
            }
            Err(err)
        }
    }
}

async fn search_inner(
    db: &DatabaseConnection,
    publisher: &EventPublisher,
    config: &ScoringConfig,
    variable: &entity::case_variables::Model,
) -> Result<Vec<variable_matches::Model>, Error> {
    let case = case::find_by_id(db, variable.case_id).await?;
    let tables = data_table::find_all_active(db).await?;

    if tables.is_empty() {
        debug!("No active catalog tables; variable {} has no match", variable.id);
        case_variable::complete_search(db, variable.id, SearchStatus::NoMatch).await?;
        return Ok(vec![]);
    }

    let existing = variable_match::matched_table_ids(db, variable.id).await?;

    let concept_hash = scoring::concept_hash(&variable.name, &variable.variable_type);
    let mut histories = HashMap::new();
    for table in &tables {
        if let Some(row) = approval_history::find_by_key(db, &concept_hash, table.id).await? {
            histories.insert(table.id, row);
        }
    }

    let candidates = rank_candidates(
        variable,
        &tables,
        &histories,
        case.macro_case.as_deref(),
        &existing,
        config,
    );

    let tables_by_id: HashMap<Id, &data_tables::Model> =
        tables.iter().map(|table| (table.id, table)).collect();

    let mut created = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let model = variable_matches::Model {
            id: Id::new_v4(),
            case_variable_id: variable.id,
            data_table_id: candidate.table_id,
            score: candidate.score,
            reasons: candidate.reasons,
            status: MatchStatus::Suggested,
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
        };

        match variable_match::create(db, model).await {
            Ok(persisted) => {
                if let Some(table) = tables_by_id.get(&candidate.table_id) {
                    decision_history::record_match_suggested(db, &case, variable, table, &persisted)
                        .await?;
                }
                created.push(persisted);
            }
            Err(err) => {
                let err: Error = err.into();
                if error::is_conflict(&err) {
                    // A concurrent search already persisted this pair.
                    debug!(
                        "Match ({}, {}) already exists; skipping",
                        variable.id, candidate.table_id
                    );
                } else {
                    return Err(err);
                }
            }
        }
    }

    let outcome = if created.is_empty() && existing.is_empty() {
        SearchStatus::NoMatch
    } else {
        SearchStatus::Matched
    };
    case_variable::complete_search(db, variable.id, outcome).await?;

    if !created.is_empty() {
        let owner_ids: Vec<Id> = created
            .iter()
            .filter_map(|m| tables_by_id.get(&m.data_table_id).map(|t| t.owner_id))
            .collect();
        publisher
            .publish(DomainEvent::ReviewNeeded {
                case_id: case.id,
                case_variable_id: variable.id,
                variable_match_id: created.first().map(|m| m.id),
                recipient_role: RecipientRole::TableOwner,
                notify_user_ids: owner_ids,
            })
            .await;
    }

    info!(
        "Match search for variable {} finished with {} new candidate(s), status {outcome}",
        variable.id,
        created.len()
    );

    Ok(created)
}

/// Fire-and-forget entry point used by case creation: spawns the search as a
/// background unit of work. Failures are logged, not retried; the variable
/// lands on `Failed` and can be re-triggered.
pub fn trigger_search(
    db: Arc<DatabaseConnection>,
    publisher: EventPublisher,
    config: ScoringConfig,
    variable_id: Id,
) {
    tokio::spawn(async move {
        if let Err(err) = run_search(db.as_ref(), &publisher, &config, variable_id).await {
            error!("Background match search for variable {variable_id} failed: {err}");
        }
    });
}

/// Matches for a variable, best score first.
pub async fn get_matches(
    db: &DatabaseConnection,
    variable_id: Id,
) -> Result<Vec<variable_matches::Model>, Error> {
    Ok(variable_match::find_by_variable_id(db, variable_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn variable(name: &str) -> entity::case_variables::Model {
        let now = Utc::now();
        entity::case_variables::Model {
            id: Id::new_v4(),
            case_id: Id::new_v4(),
            name: name.to_owned(),
            variable_type: "currency".to_owned(),
            concept: Some("receita mensal por cliente".to_owned()),
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

    fn table(name: &str, description: &str, domain: &str) -> data_tables::Model {
        let now = Utc::now();
        data_tables::Model {
            id: Id::new_v4(),
            name: name.to_owned(),
            display_name: None,
            description: Some(description.to_owned()),
            domain: Some(domain.to_owned()),
            keywords: Some("receita,cliente".to_owned()),
            owner_id: Id::new_v4(),
            is_active: true,
            synced_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn rank_candidates_discards_below_cutoff_and_sorts_descending() {
        let variable = variable("receita cliente");
        let strong = table("receita cliente", "receita mensal cliente", "vendas");
        let weak = table("tb_frota", "veículos da frota", "logistica");
        let config = ScoringConfig::default();

        let candidates = rank_candidates(
            &variable,
            &[weak.clone(), strong.clone()],
            &HashMap::new(),
            Some("vendas"),
            &HashSet::new(),
            &config,
        );

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].table_id, strong.id);
    }

    #[test]
    fn rank_candidates_caps_at_max_results() {
        let variable = variable("receita cliente");
        let tables: Vec<_> = (0..8)
            .map(|i| table(&format!("receita cliente {i}"), "receita cliente", "vendas"))
            .collect();
        let config = ScoringConfig {
            max_results: 5,
            ..Default::default()
        };

        let candidates = rank_candidates(
            &variable,
            &tables,
            &HashMap::new(),
            Some("vendas"),
            &HashSet::new(),
            &config,
        );

        assert_eq!(candidates.len(), 5);
        for window in candidates.windows(2) {
            assert!(window[0].score >= window[1].score);
        }
    }

    #[test]
    fn rank_candidates_skips_pairs_that_already_have_a_match() {
        let variable = variable("receita cliente");
        let first = table("receita cliente", "receita mensal", "vendas");
        let second = table("receita cliente anual", "receita anual", "vendas");
        let existing: HashSet<Id> = [first.id].into_iter().collect();
        let config = ScoringConfig::default();

        let candidates = rank_candidates(
            &variable,
            &[first.clone(), second.clone()],
            &HashMap::new(),
            Some("vendas"),
            &existing,
            &config,
        );

        assert!(candidates.iter().all(|c| c.table_id != first.id));
        assert!(candidates.iter().any(|c| c.table_id == second.id));
    }

    #[test]
    fn rank_candidates_is_idempotent_once_all_pairs_exist() {
        let variable = variable("receita cliente");
        let tables = vec![
            table("receita cliente", "receita mensal", "vendas"),
            table("receita cliente anual", "receita anual", "vendas"),
        ];
        let config = ScoringConfig::default();

        let first_run = rank_candidates(
            &variable,
            &tables,
            &HashMap::new(),
            Some("vendas"),
            &HashSet::new(),
            &config,
        );
        let existing: HashSet<Id> = first_run.iter().map(|c| c.table_id).collect();

        let second_run = rank_candidates(
            &variable,
            &tables,
            &HashMap::new(),
            Some("vendas"),
            &existing,
            &config,
        );

        assert!(!first_run.is_empty());
        assert!(second_run.is_empty());
    }
}
