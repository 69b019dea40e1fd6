//! Request orchestrator for entity intents.
//!
//! # Design
//! `EntityClient` holds only read-only collaborators: the transport, the
//! schema registry, the session view and the event sink. Every operation is a
//! short linear pipeline: read the session, build options, await the
//! exchange, normalize, emit, return. The only suspension points are the
//! session read and the exchange. Dropping an operation's future before the
//! exchange resolves therefore emits nothing.
//!
//! Fetch, create and update operations return the raw response. The
//! normalized form only travels on the emitted event.

use std::sync::Arc;

use tracing::debug;

use crate::error::{EntityError, EntityResult};
use crate::event::{EventSink, ResultEvent};
use crate::http::{set_header, HttpMethod, RedirectPolicy, RequestMode, RequestOptions};
use crate::intent::{CallIntent, CreateIntent, CustomUpdateIntent, DeleteIntent, FetchIntent, Intent, UpdateIntent};
use crate::query::{with_query, Query};
use crate::schema::EntityRegistry;
use crate::session::SessionContext;
use crate::transport::{ApiResponse, Transport};

/// Orchestrates entity intents into authenticated HTTP exchanges and result
/// events.
#[derive(Clone)]
pub struct EntityClient {
    transport: Transport,
    registry: Arc<EntityRegistry>,
    session: Arc<dyn SessionContext>,
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for EntityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityClient")
            .field("transport", &self.transport)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl EntityClient {
    pub fn new(
        transport: Transport,
        registry: Arc<EntityRegistry>,
        session: Arc<dyn SessionContext>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            transport,
            registry,
            session,
            sink,
        }
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Run any intent.
    pub async fn dispatch(&self, intent: Intent) -> EntityResult<ApiResponse> {
        debug!(intent = intent.name(), "dispatching intent");
        match intent {
            Intent::FetchEntity(fetch) => self.fetch_entity(fetch).await,
            Intent::FetchEntities(fetch) => self.fetch_entities(fetch).await,
            Intent::FetchUserEntities(fetch) => self.fetch_user_entities(fetch).await,
            Intent::CreateEntity(create) => self.create_entity(create).await,
            Intent::UpdateEntity(update) => self.update_entity(update).await,
            Intent::CustomUpdateEntity(update) => self.custom_update_entity(update).await,
            Intent::DeleteEntity(delete) => self.delete_entity(delete).await,
            Intent::CallApi(CallIntent {
                endpoint,
                query,
                options,
            }) => self.call_api(&endpoint, &query, options).await,
        }
    }

    /// The primitive every other operation builds on: authenticate, merge
    /// options, append the query and perform one exchange.
    pub async fn call_api(&self, endpoint: &str, query: &Query, options: RequestOptions) -> EntityResult<ApiResponse> {
        let token = self.session.auth_token().await;
        let options = build_options(token.as_deref(), options);
        let endpoint = with_query(endpoint, query);
        self.transport.send(&endpoint, options).await
    }

    pub async fn fetch_entity(&self, intent: FetchIntent) -> EntityResult<ApiResponse> {
        let response = self
            .call_api(&intent.endpoint, &intent.query, intent.options)
            .await?;
        let normalized = self.registry.normalize_single(&response, &intent.entity_type)?;
        self.sink.emit(ResultEvent::FetchedEntity {
            entity_type: intent.entity_type,
            response: normalized,
        });
        Ok(response)
    }

    pub async fn fetch_entities(&self, intent: FetchIntent) -> EntityResult<ApiResponse> {
        let response = self
            .call_api(&intent.endpoint, &intent.query, intent.options)
            .await?;
        let normalized = self
            .registry
            .normalize_collection(&response, &intent.entity_type)?;
        self.sink.emit(ResultEvent::FetchedEntities {
            entity_type: intent.entity_type,
            response: normalized,
        });
        Ok(response)
    }

    /// Fetch a collection under `users/{current user id}/`.
    pub async fn fetch_user_entities(&self, intent: FetchIntent) -> EntityResult<ApiResponse> {
        let user_id = self.session.user_id().await.ok_or_else(|| {
            EntityError::Configuration(format!(
                "no current user id for user-scoped `{}` request",
                intent.entity_type
            ))
        })?;
        let endpoint = format!("users/{user_id}/{}", intent.endpoint.trim_start_matches('/'));
        self.fetch_entities(FetchIntent { endpoint, ..intent }).await
    }

    /// POST the entity as JSON. Caller options are layered over the POST
    /// defaults, so they may change the method or body.
    pub async fn create_entity(&self, intent: CreateIntent) -> EntityResult<ApiResponse> {
        let body = serde_json::to_string(&intent.entity)?;
        let options = RequestOptions::new()
            .method(HttpMethod::Post)
            .body(body)
            .merge(intent.options);
        let response = self.call_api(&intent.endpoint, &Query::new(), options).await?;
        let normalized = self.registry.normalize_single(&response, &intent.entity_type)?;
        self.sink.emit(ResultEvent::CreatedEntity {
            entity_type: intent.entity_type,
            response: normalized,
        });
        Ok(response)
    }

    pub async fn update_entity(&self, intent: UpdateIntent) -> EntityResult<ApiResponse> {
        let body = serde_json::to_string(&intent.changes)?;
        let options = RequestOptions::new().method(HttpMethod::Put).body(body);
        let response = self.call_api(&intent.endpoint, &Query::new(), options).await?;
        let normalized = self.registry.normalize_single(&response, &intent.entity_type)?;
        self.sink.emit(ResultEvent::UpdatedEntity {
            entity_type: intent.entity_type,
            response: normalized,
            success_message: intent.success_message,
        });
        Ok(response)
    }

    /// An update with caller-chosen method and body; nothing defaults to PUT.
    pub async fn custom_update_entity(&self, intent: CustomUpdateIntent) -> EntityResult<ApiResponse> {
        let response = self
            .call_api(&intent.endpoint, &Query::new(), intent.options)
            .await?;
        let normalized = self.registry.normalize_single(&response, &intent.entity_type)?;
        self.sink.emit(ResultEvent::UpdatedEntity {
            entity_type: intent.entity_type,
            response: normalized,
            success_message: None,
        });
        Ok(response)
    }

    /// DELETE the endpoint. The event carries the id, not a payload.
    pub async fn delete_entity(&self, intent: DeleteIntent) -> EntityResult<ApiResponse> {
        let options = RequestOptions::new().method(HttpMethod::Delete);
        let response = self.call_api(&intent.endpoint, &Query::new(), options).await?;
        self.sink.emit(ResultEvent::DeletedEntity {
            entity_type: intent.entity_type,
            endpoint: intent.endpoint,
            id: intent.id,
        });
        Ok(response)
    }
}

/// Merge caller options over the computed defaults.
///
/// Defaults are GET, CORS, follow-redirects and a JSON content type. Caller
/// values win field by field and header by header. A present token is
/// written last as `Authorization`; an absent or empty token adds no header.
pub fn build_options(token: Option<&str>, options: RequestOptions) -> RequestOptions {
    let defaults = RequestOptions::new()
        .method(HttpMethod::Get)
        .mode(RequestMode::Cors)
        .redirect(RedirectPolicy::Follow)
        .header("Content-Type", "application/json");
    let mut merged = defaults.merge(options);
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        set_header(&mut merged.headers, "Authorization".to_string(), token.to_string());
    }
    merged
}
