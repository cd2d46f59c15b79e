//! Decision core of the Data Case Platform.
//!
//! This crate holds the matching, workflow and consensus logic. It depends
//! on `entity_api` for persistence and re-exports the pieces callers need so
//! that the (out-of-scope) transport layer never touches `entity_api`
//! directly.
pub use entity_api::{
    mutate::{IntoUpdateMap, UpdateMap},
    query::QuerySort,
    IntoQueryFilterMap, QueryFilterMap,
};

// Re-exports from the `entity` crate via `entity_api`
pub use entity_api::{
    agent_decisions, approval_histories, case_variables, cases, consensus_votes, data_tables,
    decision_consensuses, decision_contexts, decision_histories, involvements, owner_responses,
    requester_responses, users, variable_matches, Id,
};

pub mod approval_feedback;
pub mod case_request;
pub mod case_workflow;
pub mod consensus;
pub mod decision_history;
pub mod error;
pub mod involvement;
pub mod matching;
pub mod review;
pub mod scoring;

pub mod gateway;
