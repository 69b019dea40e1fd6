//! Error types for the entity access layer.
//!
//! # Design
//! Transport failures (the exchange itself broke, or the body was not JSON)
//! are kept apart from API failures (the server answered with a failing
//! status). `ApiError` carries the server's `error` field untouched because
//! downstream consumers match on that payload, not on the HTTP status.

use serde_json::Value;
use thiserror::Error;

/// Result alias used by every orchestrator operation.
pub type EntityResult<T> = Result<T, EntityError>;

/// The exchange could not produce a usable response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// DNS, connect, reset, timeout: anything below HTTP.
    #[error("network error: {0}")]
    Network(String),

    /// The response body was not valid JSON.
    #[error("malformed response body (HTTP {status}): {message}")]
    MalformedBody { status: u16, message: String },

    /// Redirect policy `error` met a 3xx response.
    #[error("unexpected redirect (HTTP {status}) to {location:?}")]
    Redirect { status: u16, location: Option<String> },

    /// The request could not be handed to the transport primitive.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// The server answered with a failing status.
///
/// `payload` is the `error` field of the JSON body, or `null` when the body
/// was empty or had no such field.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("API error (HTTP {status}): {payload}")]
pub struct ApiError {
    pub status: u16,
    pub payload: Value,
}

/// A response could not be flattened with its registered schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("expected a JSON array of `{entity_type}` entities")]
    ExpectedCollection { entity_type: String },

    #[error("expected a JSON object for a `{entity_type}` entity")]
    ExpectedEntity { entity_type: String },

    #[error("`{entity_type}` entity has no usable `{id_attribute}` attribute")]
    MissingId {
        entity_type: String,
        id_attribute: String,
    },
}

/// Startup configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("environment variable {name} is invalid: {message}")]
    InvalidVar { name: &'static str, message: String },

    #[error("invalid entity registry: {0}")]
    Registry(#[from] serde_json::Error),
}

/// Every way an orchestrator operation can fail.
#[derive(Debug, Error)]
pub enum EntityError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// A user-scoped intent ran without a current user id.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A request body could not be encoded as JSON.
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl EntityError {
    /// The server's error payload, if this is an API failure.
    pub fn api_payload(&self) -> Option<&Value> {
        match self {
            EntityError::Api(err) => Some(&err.payload),
            _ => None,
        }
    }
}
