//! Result events emitted after each successful operation.
//!
//! Delivery is fire-and-forget: `EventSink::emit` is synchronous, returns
//! nothing and cannot fail the operation that produced the event.

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::normalize::Normalized;
use crate::types::EntityId;

/// What an operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    FetchedEntity,
    FetchedEntities,
    UpdatedEntity,
    CreatedEntity,
    DeletedEntity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultEvent {
    FetchedEntity {
        entity_type: String,
        response: Normalized,
    },
    FetchedEntities {
        entity_type: String,
        response: Normalized,
    },
    UpdatedEntity {
        entity_type: String,
        response: Normalized,
        #[serde(skip_serializing_if = "Option::is_none")]
        success_message: Option<String>,
    },
    CreatedEntity {
        entity_type: String,
        response: Normalized,
    },
    DeletedEntity {
        entity_type: String,
        endpoint: String,
        id: EntityId,
    },
}

impl ResultEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ResultEvent::FetchedEntity { .. } => EventKind::FetchedEntity,
            ResultEvent::FetchedEntities { .. } => EventKind::FetchedEntities,
            ResultEvent::UpdatedEntity { .. } => EventKind::UpdatedEntity,
            ResultEvent::CreatedEntity { .. } => EventKind::CreatedEntity,
            ResultEvent::DeletedEntity { .. } => EventKind::DeletedEntity,
        }
    }

    pub fn entity_type(&self) -> &str {
        match self {
            ResultEvent::FetchedEntity { entity_type, .. }
            | ResultEvent::FetchedEntities { entity_type, .. }
            | ResultEvent::UpdatedEntity { entity_type, .. }
            | ResultEvent::CreatedEntity { entity_type, .. }
            | ResultEvent::DeletedEntity { entity_type, .. } => entity_type,
        }
    }

    /// The normalized payload; deletions carry none.
    pub fn response(&self) -> Option<&Normalized> {
        match self {
            ResultEvent::FetchedEntity { response, .. }
            | ResultEvent::FetchedEntities { response, .. }
            | ResultEvent::UpdatedEntity { response, .. }
            | ResultEvent::CreatedEntity { response, .. } => Some(response),
            ResultEvent::DeletedEntity { .. } => None,
        }
    }
}

/// Receives result events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ResultEvent);
}

impl EventSink for UnboundedSender<ResultEvent> {
    fn emit(&self, event: ResultEvent) {
        if let Err(err) = self.send(event) {
            warn!(kind = ?err.0.kind(), "event receiver dropped; discarding result event");
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: ResultEvent) {}
}
