use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What kind of automated decision an agent recorded.
#[derive(Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Serialize, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "agent_decision_type")]
pub enum AgentDecisionType {
    /// Selection of a catalog table for a case variable.
    #[sea_orm(string_value = "variable_match")]
    VariableMatch,
    /// Classification of a catalog table (domain, sensitivity).
    #[sea_orm(string_value = "table_classification")]
    TableClassification,
    /// Risk narrative / assessment attached to a case.
    #[sea_orm(string_value = "risk_assessment")]
    RiskAssessment,
}

impl AgentDecisionType {
    /// Critical decision types are never auto-rejected on low confidence;
    /// they escalate to human consensus instead.
    pub fn is_critical(&self) -> bool {
        matches!(self, AgentDecisionType::VariableMatch)
    }
}

impl std::fmt::Display for AgentDecisionType {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentDecisionType::VariableMatch => write!(fmt, "variable_match"),
            AgentDecisionType::TableClassification => write!(fmt, "table_classification"),
            AgentDecisionType::RiskAssessment => write!(fmt, "risk_assessment"),
        }
    }
}

/// Stored status of an automated agent decision.
///
/// Expiry is never stored: a decision whose consensus passed its deadline
/// without quorum reads as expired through the domain layer's effective
/// status helper and resolves to `Rejected` on the next evaluation.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum,
)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "agent_decision_status"
)]
pub enum AgentDecisionStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "consensus_required")]
    ConsensusRequired,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl std::fmt::Display for AgentDecisionStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentDecisionStatus::Pending => write!(fmt, "pending"),
            AgentDecisionStatus::ConsensusRequired => write!(fmt, "consensus_required"),
            AgentDecisionStatus::Approved => write!(fmt, "approved"),
            AgentDecisionStatus::Rejected => write!(fmt, "rejected"),
        }
    }
}
