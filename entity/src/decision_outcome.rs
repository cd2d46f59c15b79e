use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which point of the review workflow produced a decision-history entry.
#[derive(Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Serialize, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "decision_point")]
pub enum DecisionPoint {
    #[sea_orm(string_value = "match_suggested")]
    MatchSuggested,
    #[sea_orm(string_value = "owner_response")]
    OwnerResponse,
    #[sea_orm(string_value = "requester_response")]
    RequesterResponse,
    #[sea_orm(string_value = "variable_cancelled")]
    VariableCancelled,
}

impl std::fmt::Display for DecisionPoint {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecisionPoint::MatchSuggested => write!(fmt, "match_suggested"),
            DecisionPoint::OwnerResponse => write!(fmt, "owner_response"),
            DecisionPoint::RequesterResponse => write!(fmt, "requester_response"),
            DecisionPoint::VariableCancelled => write!(fmt, "variable_cancelled"),
        }
    }
}

/// Classification of a recorded decision for offline learning.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "decision_outcome")]
pub enum DecisionOutcome {
    #[sea_orm(string_value = "positive")]
    Positive,
    #[sea_orm(string_value = "neutral")]
    #[default]
    Neutral,
    #[sea_orm(string_value = "negative")]
    Negative,
}

impl std::fmt::Display for DecisionOutcome {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecisionOutcome::Positive => write!(fmt, "positive"),
            DecisionOutcome::Neutral => write!(fmt, "neutral"),
            DecisionOutcome::Negative => write!(fmt, "negative"),
        }
    }
}
