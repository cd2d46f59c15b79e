use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a case. `Closed` and `Cancelled` are terminal.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "case_status")]
pub enum CaseStatus {
    #[sea_orm(string_value = "draft")]
    #[default]
    Draft,
    #[sea_orm(string_value = "submitted")]
    Submitted,
    #[sea_orm(string_value = "review")]
    Review,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "closed")]
    Closed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl CaseStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaseStatus::Closed | CaseStatus::Cancelled)
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseStatus::Draft => write!(fmt, "draft"),
            CaseStatus::Submitted => write!(fmt, "submitted"),
            CaseStatus::Review => write!(fmt, "review"),
            CaseStatus::Approved => write!(fmt, "approved"),
            CaseStatus::Rejected => write!(fmt, "rejected"),
            CaseStatus::Closed => write!(fmt, "closed"),
            CaseStatus::Cancelled => write!(fmt, "cancelled"),
        }
    }
}
