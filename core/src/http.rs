//! HTTP request and response types described as plain data.
//!
//! # Design
//! The orchestrator works with `RequestOptions`, a bag of optional settings
//! that callers layer over computed defaults with `merge`. Once merged and
//! resolved against the base URL the options become an `HttpRequest`, which
//! is what the transport primitive executes. The primitive answers with an
//! `HttpResponse`; nothing here touches the network.
//!
//! All fields use owned types (`String`, `Vec`) so values move freely across
//! task and thread boundaries.

use std::fmt;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cross-origin mode. Only browser-hosted transports act on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    Cors,
    NoCors,
    SameOrigin,
}

/// What the transport does when the server answers with a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectPolicy {
    Follow,
    Error,
    Manual,
}

/// Caller-facing request options. Every field is optional so that a partial
/// set can be merged over the defaults the orchestrator computes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    /// Written as a JSON object; read from an object or from `[name, value]`
    /// pairs. Kept as a list so case-insensitive replacement preserves order.
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "serialize_headers",
        deserialize_with = "deserialize_headers"
    )]
    pub headers: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<RequestMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<RedirectPolicy>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        set_header(&mut self.headers, name.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn mode(mut self, mode: RequestMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn redirect(mut self, redirect: RedirectPolicy) -> Self {
        self.redirect = Some(redirect);
        self
    }

    /// Layer `over` on top of `self`. Values set in `over` win at every level:
    /// scalar fields are replaced when present, and headers are merged one by
    /// one so an override of one header leaves the others in place.
    pub fn merge(mut self, over: RequestOptions) -> Self {
        self.method = over.method.or(self.method);
        self.body = over.body.or(self.body);
        self.mode = over.mode.or(self.mode);
        self.redirect = over.redirect.or(self.redirect);
        for (name, value) in over.headers {
            set_header(&mut self.headers, name, value);
        }
        self
    }

    /// Look up a header by name, ignoring ASCII case.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Insert or replace a header. Names compare case-insensitively; the
/// replacing entry keeps the new spelling.
pub(crate) fn set_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
    headers.push((name, value));
}

fn serialize_headers<S: Serializer>(headers: &[(String, String)], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(headers.len()))?;
    for (name, value) in headers {
        map.serialize_entry(name, value)?;
    }
    map.end()
}

fn deserialize_headers<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<(String, String)>, D::Error> {
    struct HeadersVisitor;

    impl<'de> Visitor<'de> for HeadersVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of header names to values, or a list of [name, value] pairs")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut headers = Vec::new();
            while let Some((name, value)) = access.next_entry::<String, String>()? {
                set_header(&mut headers, name, value);
            }
            Ok(headers)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut headers = Vec::new();
            while let Some((name, value)) = access.next_element::<(String, String)>()? {
                set_header(&mut headers, name, value);
            }
            Ok(headers)
        }
    }

    deserializer.deserialize_any(HeadersVisitor)
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// A fully resolved request, ready for the transport primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub mode: RequestMode,
    pub redirect: RedirectPolicy,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data, as returned by the transport
/// primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_overriding_scalars() {
        let defaults = RequestOptions::new()
            .method(HttpMethod::Get)
            .mode(RequestMode::Cors)
            .redirect(RedirectPolicy::Follow);
        let merged = defaults.merge(RequestOptions::new().method(HttpMethod::Post).body("{}"));

        assert_eq!(merged.method, Some(HttpMethod::Post));
        assert_eq!(merged.body.as_deref(), Some("{}"));
        assert_eq!(merged.mode, Some(RequestMode::Cors));
        assert_eq!(merged.redirect, Some(RedirectPolicy::Follow));
    }

    #[test]
    fn merge_keeps_unset_fields_from_base() {
        let base = RequestOptions::new().body("payload");
        let merged = base.merge(RequestOptions::new());
        assert_eq!(merged.body.as_deref(), Some("payload"));
        assert!(merged.method.is_none());
    }

    #[test]
    fn merge_combines_headers() {
        let defaults = RequestOptions::new()
            .header("Content-Type", "application/json")
            .header("Authorization", "t0k3n");
        let merged = defaults
            .merge(RequestOptions::new().header("A", "1"))
            .merge(RequestOptions::new().header("B", "2"));

        assert_eq!(merged.header_value("A"), Some("1"));
        assert_eq!(merged.header_value("B"), Some("2"));
        assert_eq!(merged.header_value("content-type"), Some("application/json"));
        assert_eq!(merged.header_value("Authorization"), Some("t0k3n"));
    }

    #[test]
    fn merge_replaces_header_case_insensitively() {
        let defaults = RequestOptions::new().header("Content-Type", "application/json");
        let merged = defaults.merge(RequestOptions::new().header("content-type", "text/plain"));

        assert_eq!(merged.headers, vec![("content-type".to_string(), "text/plain".to_string())]);
    }

    #[test]
    fn options_deserialize_from_partial_json() {
        let options: RequestOptions =
            serde_json::from_str(r#"{"method":"PATCH","headers":[["X-Trace","1"]]}"#).unwrap();
        assert_eq!(options.method, Some(HttpMethod::Patch));
        assert_eq!(options.header_value("x-trace"), Some("1"));
        assert!(options.mode.is_none());
    }

    #[test]
    fn headers_deserialize_from_an_object() {
        let options: RequestOptions =
            serde_json::from_value(serde_json::json!({"headers": {"X-Trace": "1", "Accept": "text/csv"}})).unwrap();
        assert_eq!(
            options.headers,
            vec![
                ("X-Trace".to_string(), "1".to_string()),
                ("Accept".to_string(), "text/csv".to_string()),
            ]
        );
    }

    #[test]
    fn headers_reject_non_string_values() {
        let result = serde_json::from_value::<RequestOptions>(serde_json::json!({"headers": {"X-Retry": 3}}));
        assert!(result.is_err());
    }

    #[test]
    fn headers_serialize_as_an_object() {
        let options = RequestOptions::new().header("X-Trace", "1");
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            serde_json::json!({"headers": {"X-Trace": "1"}})
        );
    }

    #[test]
    fn response_success_range() {
        let mut response = HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: String::new(),
        };
        assert!(response.is_success());
        response.status = 302;
        assert!(!response.is_success());
    }
}
