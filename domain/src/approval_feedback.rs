//! Feedback loop from human decisions into the approval history counters.
//!
//! This module is the sole writer of approval history; the scoring engine
//! only ever reads it. Counters are keyed by concept hash x table and only
//! ever grow.

use crate::error::Error;
use crate::scoring;
use entity::{approval_histories, case_variables, Id};
use entity_api::approval_history;
use log::*;
use sea_orm::DatabaseConnection;

/// Records a human verdict on a (variable concept, table) pair so that
/// future searches for the same concept score the table accordingly.
pub async fn record(
    db: &DatabaseConnection,
    variable: &case_variables::Model,
    data_table_id: Id,
    approved: bool,
) -> Result<approval_histories::Model, Error> {
    let concept_hash = scoring::concept_hash(&variable.name, &variable.variable_type);

    let row = approval_history::record(db, &concept_hash, data_table_id, approved).await?;

    debug!(
        "Approval history for ({concept_hash}, {data_table_id}) now at {}/{} approved/rejected",
        row.approved_count, row.rejected_count
    );

    Ok(row)
}
