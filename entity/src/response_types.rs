use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How a table owner answered a suggested match.
#[derive(Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Serialize, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "owner_response_type")]
pub enum OwnerResponseType {
    /// The suggested table is the right one.
    #[sea_orm(string_value = "confirm_match")]
    ConfirmMatch,
    /// The data lives in a different table; the owner names it.
    #[sea_orm(string_value = "correct_table")]
    CorrectTable,
    /// The requested data does not exist yet; opens an involvement.
    #[sea_orm(string_value = "data_not_exist")]
    DataNotExist,
    /// Another user owns this subject and should answer instead.
    #[sea_orm(string_value = "delegate_owner")]
    DelegateOwner,
}

impl std::fmt::Display for OwnerResponseType {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwnerResponseType::ConfirmMatch => write!(fmt, "confirm_match"),
            OwnerResponseType::CorrectTable => write!(fmt, "correct_table"),
            OwnerResponseType::DataNotExist => write!(fmt, "data_not_exist"),
            OwnerResponseType::DelegateOwner => write!(fmt, "delegate_owner"),
        }
    }
}

/// The requester's final word on an owner-validated match.
#[derive(Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Serialize, DeriveActiveEnum)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "requester_response_type"
)]
pub enum RequesterResponseType {
    /// Accept the match; the variable goes into use.
    #[sea_orm(string_value = "approve")]
    Approve,
    /// Reject this match but keep the variable open for other candidates.
    #[sea_orm(string_value = "reject_match")]
    RejectMatch,
    /// Reject and cancel the variable entirely.
    #[sea_orm(string_value = "reject_and_cancel")]
    RejectAndCancel,
}

impl std::fmt::Display for RequesterResponseType {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequesterResponseType::Approve => write!(fmt, "approve"),
            RequesterResponseType::RejectMatch => write!(fmt, "reject_match"),
            RequesterResponseType::RejectAndCancel => write!(fmt, "reject_and_cancel"),
        }
    }
}
