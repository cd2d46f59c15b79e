//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure with
/// `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain
/// layer or in lower layers. The `source` field holds the original error
/// that caused the domain error, translating errors between layers while
/// maintaining layer boundaries: the (out-of-scope) transport layer depends
/// on `domain`, never on `entity_api` directly, and maps `error_kind`s to
/// status codes via [`Error::code`].
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
    /// Human-readable detail accompanying the machine-readable kind.
    pub message: Option<String>,
}

impl Error {
    pub fn business(kind: BusinessRuleKind, message: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::BusinessRule(kind),
            message: Some(message.into()),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Validation,
            message: Some(message.into()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other),
            message: Some(message.into()),
        }
    }

    /// Stable machine-readable code for callers that must not parse messages.
    pub fn code(&self) -> &'static str {
        match &self.error_kind {
            DomainErrorKind::Validation => "validation_failed",
            DomainErrorKind::BusinessRule(kind) => match kind {
                BusinessRuleKind::InvalidTransition => "invalid_transition",
                BusinessRuleKind::Unauthorized => "unauthorized",
                BusinessRuleKind::CaseNotClosable => "case_not_closable",
                BusinessRuleKind::ConsensusClosed => "consensus_closed",
                BusinessRuleKind::MatchNotAwaitingReview => "match_not_awaiting_review",
                BusinessRuleKind::MissingCompletionDate => "missing_completion_date",
            },
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound)) => {
                "not_found"
            }
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Conflict)) => {
                "conflict"
            }
            DomainErrorKind::Internal(_) => "internal_error",
            DomainErrorKind::External(_) => "external_error",
        }
    }
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    /// Malformed input caught before any mutation happened.
    Validation,
    /// A workflow rule refused the operation.
    BusinessRule(BusinessRuleKind),
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Workflow rules that can refuse an operation.
#[derive(Debug, PartialEq)]
pub enum BusinessRuleKind {
    /// The (current, target) status pair is not in the transition table.
    InvalidTransition,
    /// The actor's role is below what the operation requires, or the actor
    /// is not the party the operation belongs to.
    Unauthorized,
    /// At least one non-cancelled variable has not reached a terminal state.
    CaseNotClosable,
    /// The consensus is already resolved or past its voting deadline.
    ConsensusClosed,
    /// The match is not in a state that accepts this response.
    MatchNotAwaitingReview,
    /// An involvement cannot complete before a date was committed to.
    MissingCompletionDate,
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Config,
    Other,
}

/// Enum representing the various kinds of entity errors that can bubble up from the "Entity"
/// layer (`entity_api` and `entity`). These errors are translated from the `entity_api` layer
/// to the `domain` layer and reduced to a subset of error kinds that are relevant here.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Invalid,
    /// A unique constraint refused the write, e.g. a duplicate vote or a
    /// duplicate (variable, table) match. Recoverable by re-querying state.
    Conflict,
    DbTransaction,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let entity_error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => EntityErrorKind::NotFound,
            EntityApiErrorKind::InvalidQueryTerm => EntityErrorKind::Invalid,
            EntityApiErrorKind::RecordAlreadyExists => EntityErrorKind::Conflict,
            _ => EntityErrorKind::Other("EntityErrorKind".to_string()),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
            message: None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other),
                message: Some("Failed to build reqwest client".to_string()),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                message: None,
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other),
            message: Some("Serialization related error".to_string()),
        }
    }
}

/// True when the error is the entity layer reporting a missing record.
pub fn is_not_found(err: &Error) -> bool {
    err.error_kind
        == DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound))
}

/// True when the error is a unique-constraint conflict from the entity layer.
pub fn is_conflict(err: &Error) -> bool {
    err.error_kind
        == DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Conflict))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_record_translates_to_a_conflict() {
        let entity_err = EntityApiError {
            source: None,
            error_kind: EntityApiErrorKind::RecordAlreadyExists,
        };

        let err: Error = entity_err.into();

        assert!(is_conflict(&err));
        assert_eq!(err.code(), "conflict");
    }

    #[test]
    fn missing_record_translates_to_not_found() {
        let entity_err = EntityApiError {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        };

        let err: Error = entity_err.into();

        assert!(is_not_found(&err));
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn business_rule_errors_expose_stable_codes() {
        let err = Error::business(BusinessRuleKind::InvalidTransition, "nope");
        assert_eq!(err.code(), "invalid_transition");

        let err = Error::validation("bad confidence");
        assert_eq!(err.code(), "validation_failed");
    }
}
