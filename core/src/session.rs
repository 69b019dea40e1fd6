//! Session context: the auth token and current user id the orchestrator reads
//! at the start of every intent.
//!
//! # Design
//! The session is owned elsewhere (a login flow, a token refresher). The
//! orchestrator only reads it, once per intent, and never caches the values,
//! so a token swapped between two intents is picked up by the second one.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::types::EntityId;

/// Read-only view of the current session.
#[async_trait]
pub trait SessionContext: Send + Sync {
    async fn auth_token(&self) -> Option<String>;
    async fn user_id(&self) -> Option<EntityId>;
}

#[derive(Debug, Clone, Default)]
struct SessionState {
    auth_token: Option<String>,
    user_id: Option<EntityId>,
}

/// A cloneable, in-process session handle. Clones share the same state, so
/// one clone can be handed to an `EntityClient` while another is updated by
/// the login flow.
#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    state: Arc<RwLock<SessionState>>,
}

impl SharedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(auth_token: Option<&str>, user_id: Option<EntityId>) -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState {
                auth_token: auth_token.map(str::to_string),
                user_id,
            })),
        }
    }

    pub async fn sign_in(&self, auth_token: &str, user_id: EntityId) {
        let mut state = self.state.write().await;
        state.auth_token = Some(auth_token.to_string());
        state.user_id = Some(user_id);
    }

    pub async fn sign_out(&self) {
        *self.state.write().await = SessionState::default();
    }
}

#[async_trait]
impl SessionContext for SharedSession {
    async fn auth_token(&self) -> Option<String> {
        self.state.read().await.auth_token.clone()
    }

    async fn user_id(&self) -> Option<EntityId> {
        self.state.read().await.user_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_observe_sign_in_and_sign_out() {
        let session = SharedSession::new();
        let view = session.clone();
        assert!(view.auth_token().await.is_none());

        session.sign_in("t0k3n", EntityId::from(99)).await;
        assert_eq!(view.auth_token().await.as_deref(), Some("t0k3n"));
        assert_eq!(view.user_id().await, Some(EntityId::Number(99)));

        session.sign_out().await;
        assert!(view.auth_token().await.is_none());
        assert!(view.user_id().await.is_none());
    }
}
