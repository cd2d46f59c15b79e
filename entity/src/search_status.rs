use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Progress of the match search pipeline for a single case variable.
///
/// `InUse` and `Cancelled` are terminal; a case can only close once every
/// non-cancelled variable reaches one of them. `Failed` marks a search that
/// errored out and may be re-triggered.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "search_status")]
pub enum SearchStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "searching")]
    Searching,
    #[sea_orm(string_value = "matched")]
    Matched,
    #[sea_orm(string_value = "no_match")]
    NoMatch,
    #[sea_orm(string_value = "requester_review")]
    RequesterReview,
    #[sea_orm(string_value = "in_use")]
    InUse,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl SearchStatus {
    /// A variable in a terminal state no longer blocks case closure.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchStatus::InUse | SearchStatus::Cancelled)
    }
}

impl std::fmt::Display for SearchStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchStatus::Pending => write!(fmt, "pending"),
            SearchStatus::Searching => write!(fmt, "searching"),
            SearchStatus::Matched => write!(fmt, "matched"),
            SearchStatus::NoMatch => write!(fmt, "no_match"),
            SearchStatus::RequesterReview => write!(fmt, "requester_review"),
            SearchStatus::InUse => write!(fmt, "in_use"),
            SearchStatus::Cancelled => write!(fmt, "cancelled"),
            SearchStatus::Failed => write!(fmt, "failed"),
        }
    }
}
