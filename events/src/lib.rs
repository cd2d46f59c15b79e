//! Event system infrastructure for the Data Case Platform.
//!
//! This crate provides the event system that enables loose coupling between
//! the decision core and infrastructure concerns (notification delivery,
//! audit trails).
//!
//! # Architecture
//!
//! - **DomainEvent**: Enum representing the business events the core emits
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventPublisher**: Publishes events to registered handlers
//! - **channel**: Declared-priority notification channel registry
//!
//! This crate has no dependencies on internal crates (entity, domain, etc.),
//! avoiding circular dependencies. Entity data is carried as serialized JSON
//! values, and recipients are addressed by user id plus an abstract role
//! string; the core never knows about delivery transports.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

pub mod channel;

/// A type alias that represents any Entity's internal id field data type.
/// This matches the definition in the entity crate to maintain compatibility.
pub type Id = Uuid;

/// The workflow role a notification is aimed at. The delivery subsystem
/// resolves roles to concrete recipients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientRole {
    Requester,
    TableOwner,
    Moderator,
}

/// Domain events that represent business-level changes in the system.
/// These events are emitted when domain operations complete successfully.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A case moved to a new status.
    CaseStatusChanged {
        case_id: Id,
        old_status: String,
        new_status: String,
        /// Complete serialized case entity for downstream consumers.
        case: Value,
        notify_user_ids: Vec<Id>,
    },
    /// A variable's search status changed (search finished, match accepted,
    /// variable cancelled, ...).
    VariableStatusChanged {
        case_id: Id,
        case_variable_id: Id,
        old_status: String,
        new_status: String,
        notify_user_ids: Vec<Id>,
    },
    /// A human needs to look at a match: the owner after a search produced
    /// suggestions, or the requester after the owner responded.
    ReviewNeeded {
        case_id: Id,
        case_variable_id: Id,
        variable_match_id: Option<Id>,
        recipient_role: RecipientRole,
        notify_user_ids: Vec<Id>,
    },
    /// An agent decision was escalated and votes are wanted.
    ConsensusRequested {
        agent_decision_id: Id,
        consensus_id: Id,
        recipient_role: RecipientRole,
    },
}

/// Trait for handling domain events.
/// Implementations can perform side effects like sending notifications,
/// updating caches, logging, etc.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    /// Publish an event to all registered handlers.
    /// Handlers are called sequentially. If a handler panics or errors,
    /// we log it but continue with remaining handlers.
    pub async fn publish(&self, event: DomainEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
