use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review status of a suggested (variable, table) match.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "match_status")]
pub enum MatchStatus {
    /// Produced by the search engine, waiting on the table owner.
    #[sea_orm(string_value = "suggested")]
    #[default]
    Suggested,
    /// Owner confirmed the table fits the variable.
    #[sea_orm(string_value = "owner_confirmed")]
    OwnerConfirmed,
    /// Owner rejected the suggestion outright.
    #[sea_orm(string_value = "owner_rejected")]
    OwnerRejected,
    /// Owner pointed at a different table; a replacement match was created.
    #[sea_orm(string_value = "owner_redirected")]
    OwnerRedirected,
    /// Waiting on the requester's final word.
    #[sea_orm(string_value = "requester_pending")]
    RequesterPending,
    /// Requester approved; the variable is bound to this table.
    #[sea_orm(string_value = "accepted")]
    Accepted,
    /// Requester turned the match down.
    #[sea_orm(string_value = "declined")]
    Declined,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Suggested => write!(fmt, "suggested"),
            MatchStatus::OwnerConfirmed => write!(fmt, "owner_confirmed"),
            MatchStatus::OwnerRejected => write!(fmt, "owner_rejected"),
            MatchStatus::OwnerRedirected => write!(fmt, "owner_redirected"),
            MatchStatus::RequesterPending => write!(fmt, "requester_pending"),
            MatchStatus::Accepted => write!(fmt, "accepted"),
            MatchStatus::Declined => write!(fmt, "declined"),
        }
    }
}
