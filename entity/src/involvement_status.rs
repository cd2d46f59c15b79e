use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored status of a data-creation commitment.
///
/// Only `Pending`, `InProgress` and `Completed` are ever persisted. `Overdue`
/// is derived at read time from `expected_completion_date` and exists so that
/// callers can report an effective status without a second type.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "involvement_status")]
pub enum InvolvementStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "overdue")]
    Overdue,
}

impl std::fmt::Display for InvolvementStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvolvementStatus::Pending => write!(fmt, "pending"),
            InvolvementStatus::InProgress => write!(fmt, "in_progress"),
            InvolvementStatus::Completed => write!(fmt, "completed"),
            InvolvementStatus::Overdue => write!(fmt, "overdue"),
        }
    }
}
