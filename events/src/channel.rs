//! Notification channel registry.
//!
//! Channels are a tagged-variant list processed in declared order. Each
//! variant carries its own enabled flag; dispatch walks the list and hands
//! the event to the first enabled channel that accepts it (and every later
//! enabled one when fan-out is requested). The actual transports live in a
//! separate delivery subsystem; here a channel only decides whether it
//! would carry the event.

use crate::DomainEvent;

/// A notification channel in declared priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    Email { enabled: bool },
    Teams { enabled: bool },
    InApp { enabled: bool },
}

impl Channel {
    pub fn is_enabled(&self) -> bool {
        match self {
            Channel::Email { enabled } => *enabled,
            Channel::Teams { enabled } => *enabled,
            Channel::InApp { enabled } => *enabled,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Channel::Email { .. } => "email",
            Channel::Teams { .. } => "teams",
            Channel::InApp { .. } => "in_app",
        }
    }

    /// Whether this channel carries the given event at all. In-app picks up
    /// everything; email and Teams only events that involve a human.
    pub fn accepts(&self, event: &DomainEvent) -> bool {
        match self {
            Channel::InApp { .. } => true,
            Channel::Email { .. } | Channel::Teams { .. } => matches!(
                event,
                DomainEvent::ReviewNeeded { .. } | DomainEvent::ConsensusRequested { .. }
            ),
        }
    }
}

/// Ordered channel list. The declaration order is the priority order.
#[derive(Debug, Clone)]
pub struct ChannelRegistry {
    channels: Vec<Channel>,
}

impl ChannelRegistry {
    pub fn new(channels: Vec<Channel>) -> Self {
        Self { channels }
    }

    /// Names of the enabled channels that would carry this event, in
    /// priority order. The delivery subsystem fans the event out to them.
    pub fn route(&self, event: &DomainEvent) -> Vec<&'static str> {
        self.channels
            .iter()
            .filter(|channel| channel.is_enabled() && channel.accepts(event))
            .map(Channel::name)
            .collect()
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new(vec![
            Channel::Email { enabled: true },
            Channel::Teams { enabled: false },
            Channel::InApp { enabled: true },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecipientRole;
    use uuid::Uuid;

    fn review_event() -> DomainEvent {
        DomainEvent::ReviewNeeded {
            case_id: Uuid::new_v4(),
            case_variable_id: Uuid::new_v4(),
            variable_match_id: None,
            recipient_role: RecipientRole::TableOwner,
            notify_user_ids: vec![],
        }
    }

    fn status_event() -> DomainEvent {
        DomainEvent::VariableStatusChanged {
            case_id: Uuid::new_v4(),
            case_variable_id: Uuid::new_v4(),
            old_status: "pending".to_owned(),
            new_status: "searching".to_owned(),
            notify_user_ids: vec![],
        }
    }

    #[test]
    fn route_respects_declared_order_and_enabled_flags() {
        let registry = ChannelRegistry::new(vec![
            Channel::Teams { enabled: false },
            Channel::Email { enabled: true },
            Channel::InApp { enabled: true },
        ]);

        assert_eq!(registry.route(&review_event()), vec!["email", "in_app"]);
    }

    #[test]
    fn status_changes_stay_off_email_and_teams() {
        let registry = ChannelRegistry::default();

        assert_eq!(registry.route(&status_event()), vec!["in_app"]);
    }
}
