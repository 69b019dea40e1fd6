//! Transport adapter: one HTTP exchange in, one JSON value (or error) out.
//!
//! # Design
//! The raw request/response exchange lives behind the `Exchange` trait so the
//! host decides how bytes move (reqwest, a blocking agent on a worker pool, a
//! canned response in tests). `Transport` owns everything around it: resolving
//! endpoints against the base URL, spotting empty bodies, decoding JSON and
//! turning failing statuses into `ApiError`s carrying the server's `error`
//! field.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::ApiConfig;
use crate::error::{ApiError, EntityError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RedirectPolicy, RequestMode, RequestOptions};

/// The transport primitive: execute one request and return the response as
/// data. Failing statuses are data too; only failures below HTTP are errors.
#[async_trait]
pub trait Exchange: Send + Sync {
    async fn exchange(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    /// The server sent no body (204, or an empty 2xx body).
    NoContent,
}

impl ApiResponse {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ApiResponse::Json(value) => Some(value),
            ApiResponse::NoContent => None,
        }
    }

    pub fn is_no_content(&self) -> bool {
        matches!(self, ApiResponse::NoContent)
    }

    /// The JSON body, or `null` for an empty response.
    pub fn into_json(self) -> Value {
        match self {
            ApiResponse::Json(value) => value,
            ApiResponse::NoContent => Value::Null,
        }
    }
}

impl Serialize for ApiResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ApiResponse::Json(value) => value.serialize(serializer),
            ApiResponse::NoContent => serializer.serialize_unit(),
        }
    }
}

/// Resolves endpoints and classifies responses around an `Exchange`.
#[derive(Clone)]
pub struct Transport {
    base_url: String,
    exchange: Arc<dyn Exchange>,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Transport {
    pub fn new(base_url: &str, exchange: Arc<dyn Exchange>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            exchange,
        }
    }

    pub fn from_config(config: &ApiConfig, exchange: Arc<dyn Exchange>) -> Self {
        Self::new(&config.base_url, exchange)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join `endpoint` onto the base URL, unless it is already an absolute
    /// URL with an authority (`scheme://...`). Scheme-only forms such as
    /// `mailto:x` or `urn:y` are treated as relative paths.
    pub fn resolve_url(&self, endpoint: &str) -> String {
        if has_scheme(endpoint) {
            return endpoint.to_string();
        }
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Perform one exchange. Options left unset fall back to GET, CORS mode
    /// and follow-redirects.
    pub async fn send(&self, endpoint: &str, options: RequestOptions) -> Result<ApiResponse, EntityError> {
        let request = HttpRequest {
            method: options.method.unwrap_or(HttpMethod::Get),
            url: self.resolve_url(endpoint),
            headers: options.headers,
            body: options.body,
            mode: options.mode.unwrap_or(RequestMode::Cors),
            redirect: options.redirect.unwrap_or(RedirectPolicy::Follow),
        };
        let method = request.method;
        let url = request.url.clone();
        let redirect = request.redirect;
        trace!(body = ?request.body, "request body");

        let response = self.exchange.exchange(request).await?;
        debug!(%method, %url, status = response.status, "exchange completed");
        trace!(body = %response.body, "response body");

        classify(response, redirect)
    }
}

/// Turn a raw response into a decoded body or the matching error.
pub fn classify(response: HttpResponse, redirect: RedirectPolicy) -> Result<ApiResponse, EntityError> {
    if (300..400).contains(&response.status) && redirect != RedirectPolicy::Follow {
        return Err(TransportError::Redirect {
            status: response.status,
            location: response.header("location").map(str::to_string),
        }
        .into());
    }

    if response.status == 204 || response.body.trim().is_empty() {
        if response.is_success() {
            return Ok(ApiResponse::NoContent);
        }
        return Err(ApiError {
            status: response.status,
            payload: Value::Null,
        }
        .into());
    }

    let json: Value = serde_json::from_str(&response.body).map_err(|e| TransportError::MalformedBody {
        status: response.status,
        message: e.to_string(),
    })?;

    if !response.is_success() {
        let payload = json.get("error").cloned().unwrap_or(Value::Null);
        return Err(ApiError {
            status: response.status,
            payload,
        }
        .into());
    }

    Ok(ApiResponse::Json(json))
}

/// `scheme ":"` per RFC 3986, and then `//`. Requiring the authority keeps
/// scheme-only forms (`mailto:x`, `urn:y`) relative.
fn has_scheme(endpoint: &str) -> bool {
    let Some((scheme, rest)) = endpoint.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_alpha
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && rest.starts_with("//")
}
