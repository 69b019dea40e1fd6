//! Declarative entity access over a JSON HTTP API.
//!
//! # Overview
//! Callers describe what they want (`Intent`: fetch, create, update, delete
//! or a raw call). `EntityClient` turns each intent into one authenticated
//! HTTP exchange, normalizes the JSON body with the schema registered for the
//! entity type, and emits a `ResultEvent` describing what changed.
//!
//! # Design
//! - `EntityClient` holds no mutable state. The session (auth token, user id)
//!   is read through `SessionContext` at the start of every intent.
//! - The raw exchange sits behind the `Exchange` trait. `ReqwestExchange` is
//!   bundled (feature `reqwest`); hosts may supply their own.
//! - `EntityRegistry` is immutable configuration shared behind an `Arc`.
//!   Normalization is a pure function of response, entity type and registry.
//! - Events go to an `EventSink`, fire-and-forget. Nothing is emitted when an
//!   operation fails or is abandoned mid-flight.

pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod http;
pub mod intent;
pub mod normalize;
pub mod query;
#[cfg(feature = "reqwest")]
pub mod reqwest_exchange;
pub mod schema;
pub mod session;
pub mod transport;
pub mod types;

pub use client::{build_options, EntityClient};
pub use config::ApiConfig;
pub use error::{ApiError, ConfigError, EntityError, EntityResult, NormalizeError, TransportError};
pub use event::{EventKind, EventSink, NullSink, ResultEvent};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RedirectPolicy, RequestMode, RequestOptions};
pub use intent::{CallIntent, CreateIntent, CustomUpdateIntent, DeleteIntent, FetchIntent, Intent, UpdateIntent};
pub use normalize::{Normalized, NormalizedGraph};
pub use query::{encode_query, Query};
#[cfg(feature = "reqwest")]
pub use reqwest_exchange::ReqwestExchange;
pub use schema::{EntityRegistry, Relation, Schema};
pub use session::{SessionContext, SharedSession};
pub use transport::{ApiResponse, Exchange, Transport};
pub use types::EntityId;
