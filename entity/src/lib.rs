use uuid::Uuid;

// Core entities
pub mod agent_decisions;
pub mod approval_histories;
pub mod case_variables;
pub mod cases;
pub mod consensus_votes;
pub mod data_tables;
pub mod decision_consensuses;
pub mod decision_contexts;
pub mod decision_histories;
pub mod involvements;
pub mod owner_responses;
pub mod requester_responses;
pub mod users;
pub mod variable_matches;

// Shared enums
pub mod case_status;
pub mod decision_outcome;
pub mod decision_status;
pub mod involvement_status;
pub mod match_status;
pub mod response_types;
pub mod roles;
pub mod search_status;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
