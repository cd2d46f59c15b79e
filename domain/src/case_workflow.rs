//! Case status state machine.
//!
//! The transition table maps (current, target) pairs to the minimum role
//! allowed to perform them. Validation is a pure predicate: the caller
//! applies the mutation and audit-logs it after a successful check.

use crate::error::{BusinessRuleKind, Error};
use entity::case_status::CaseStatus;
use entity::case_variables;
use entity::roles::Role;

/// Who is attempting a transition. `is_requester` is true when the actor is
/// the case's owning requester, which matters only for cancellation.
#[derive(Debug, Clone)]
pub struct Actor {
    pub role: Role,
    pub is_requester: bool,
}

/// Minimum role required for a (current, target) pair, or `None` when the
/// transition does not exist. Cancellation is handled separately in
/// [`validate_transition`] because it is gated on ownership, not only role.
fn required_role(current: CaseStatus, target: CaseStatus) -> Option<Role> {
    use CaseStatus::*;

    match (current, target) {
        (Draft, Submitted) => Some(Role::User),
        (Submitted, Review) => Some(Role::Manager),
        (Review, Approved) => Some(Role::Manager),
        (Review, Rejected) => Some(Role::Manager),
        (Approved, Closed) => Some(Role::User),
        (Rejected, Closed) => Some(Role::User),
        _ => None,
    }
}

/// Validates a case status transition without applying it.
///
/// Fails with `InvalidTransition` when the (current, target) pair is not in
/// the table, and with `Unauthorized` when the actor's role is below the
/// required level. Any non-terminal state can move to `Cancelled` by the
/// owning requester or a manager and above.
pub fn validate_transition(
    current: CaseStatus,
    target: CaseStatus,
    actor: &Actor,
) -> Result<(), Error> {
    if target == CaseStatus::Cancelled {
        if current.is_terminal() {
            return Err(Error::business(
                BusinessRuleKind::InvalidTransition,
                format!("a {current} case can no longer be cancelled"),
            ));
        }
        if actor.is_requester || actor.role.at_least(&Role::Manager) {
            return Ok(());
        }
        return Err(Error::business(
            BusinessRuleKind::Unauthorized,
            "only the owning requester or a manager can cancel a case",
        ));
    }

    match required_role(current, target) {
        None => Err(Error::business(
            BusinessRuleKind::InvalidTransition,
            format!("cannot move a case from {current} to {target}"),
        )),
        Some(required) if actor.role.at_least(&required) => Ok(()),
        Some(required) => Err(Error::business(
            BusinessRuleKind::Unauthorized,
            format!("moving a case from {current} to {target} requires at least the {required} role"),
        )),
    }
}

/// Checks whether a case can close given its variables' current state.
///
/// Every non-cancelled variable must have reached a terminal search status.
/// The failure message names up to three offending variables.
pub fn can_close(variables: &[case_variables::Model]) -> Result<(), Error> {
    let blocking: Vec<&str> = variables
        .iter()
        .filter(|variable| !variable.is_cancelled && !variable.search_status.is_terminal())
        .map(|variable| variable.name.as_str())
        .collect();

    if blocking.is_empty() {
        return Ok(());
    }

    let mut listed = blocking
        .iter()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if blocking.len() > 3 {
        listed.push_str(&format!(" +{} more", blocking.len() - 3));
    }

    Err(Error::business(
        BusinessRuleKind::CaseNotClosable,
        format!("variables still unresolved: {listed}"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainErrorKind;
    use chrono::Utc;
    use entity::search_status::SearchStatus;
    use entity::Id;

    fn actor(role: Role) -> Actor {
        Actor {
            role,
            is_requester: false,
        }
    }

    fn business_kind(err: Error) -> BusinessRuleKind {
        match err.error_kind {
            DomainErrorKind::BusinessRule(kind) => kind,
            other => panic!("expected a business rule error, got {other:?}"),
        }
    }

    #[test]
    fn draft_to_approved_is_invalid_for_any_role() {
        let err = validate_transition(
            CaseStatus::Draft,
            CaseStatus::Approved,
            &actor(Role::Admin),
        )
        .unwrap_err();

        assert_eq!(business_kind(err), BusinessRuleKind::InvalidTransition);
    }

    #[test]
    fn submitted_to_review_requires_manager() {
        let err = validate_transition(
            CaseStatus::Submitted,
            CaseStatus::Review,
            &actor(Role::User),
        )
        .unwrap_err();
        assert_eq!(business_kind(err), BusinessRuleKind::Unauthorized);

        assert!(validate_transition(
            CaseStatus::Submitted,
            CaseStatus::Review,
            &actor(Role::Manager)
        )
        .is_ok());
    }

    #[test]
    fn requester_can_cancel_non_terminal_case() {
        let requester = Actor {
            role: Role::User,
            is_requester: true,
        };

        assert!(validate_transition(CaseStatus::Review, CaseStatus::Cancelled, &requester).is_ok());
    }

    #[test]
    fn non_requester_user_cannot_cancel() {
        let err = validate_transition(
            CaseStatus::Review,
            CaseStatus::Cancelled,
            &actor(Role::User),
        )
        .unwrap_err();

        assert_eq!(business_kind(err), BusinessRuleKind::Unauthorized);
    }

    #[test]
    fn terminal_case_cannot_be_cancelled() {
        let err = validate_transition(
            CaseStatus::Closed,
            CaseStatus::Cancelled,
            &actor(Role::Admin),
        )
        .unwrap_err();

        assert_eq!(business_kind(err), BusinessRuleKind::InvalidTransition);
    }

    fn variable(name: &str, status: SearchStatus, cancelled: bool) -> case_variables::Model {
        let now = Utc::now();
        case_variables::Model {
            id: Id::new_v4(),
            case_id: Id::new_v4(),
            name: name.to_owned(),
            variable_type: "text".to_owned(),
            concept: None,
            search_status: status,
            is_cancelled: cancelled,
            cancelled_at: None,
            cancelled_by: None,
            cancel_reason: None,
            search_started_at: None,
            search_completed_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn empty_case_is_closable() {
        assert!(can_close(&[]).is_ok());
    }

    #[test]
    fn pending_variable_blocks_closure_and_is_named() {
        let err = can_close(&[variable("receita_total", SearchStatus::Pending, false)])
            .unwrap_err();

        assert_eq!(business_kind_ref(&err), &BusinessRuleKind::CaseNotClosable);
        assert!(err.message.as_deref().unwrap().contains("receita_total"));
    }

    #[test]
    fn cancelled_variables_do_not_block_closure() {
        let variables = [
            variable("a", SearchStatus::InUse, false),
            variable("b", SearchStatus::Pending, true),
            variable("c", SearchStatus::Cancelled, false),
        ];

        assert!(can_close(&variables).is_ok());
    }

    #[test]
    fn more_than_three_blockers_get_a_suffix() {
        let variables: Vec<_> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|name| variable(name, SearchStatus::Searching, false))
            .collect();

        let err = can_close(&variables).unwrap_err();
        let message = err.message.unwrap();

        assert!(message.contains("a, b, c"));
        assert!(message.contains("+2 more"));
        assert!(!message.contains('d'));
    }

    fn business_kind_ref(err: &Error) -> &BusinessRuleKind {
        match &err.error_kind {
            DomainErrorKind::BusinessRule(kind) => kind,
            other => panic!("expected a business rule error, got {other:?}"),
        }
    }
}
