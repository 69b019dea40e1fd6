//! `Exchange` implementation backed by `reqwest`.
//!
//! Redirect handling is a client-level setting in reqwest, so two clients are
//! kept: one that follows redirects and one that hands 3xx responses back as
//! they are (for the `error` and `manual` policies). Request mode only has a
//! meaning inside a browser and is ignored here.

use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::{Client, Method};

use crate::config::ApiConfig;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RedirectPolicy};
use crate::transport::Exchange;

#[derive(Debug, Clone)]
pub struct ReqwestExchange {
    following: Client,
    non_following: Client,
}

impl ReqwestExchange {
    pub fn new() -> Result<Self, TransportError> {
        Self::from_config(&ApiConfig::new(""))
    }

    /// Build clients honouring the configured timeout.
    pub fn from_config(config: &ApiConfig) -> Result<Self, TransportError> {
        let build = |policy: Policy| {
            let mut builder = Client::builder().redirect(policy);
            if let Some(timeout) = config.timeout {
                builder = builder.timeout(timeout);
            }
            builder
                .build()
                .map_err(|e| TransportError::InvalidRequest(format!("failed to build HTTP client: {e}")))
        };
        Ok(Self {
            following: build(Policy::default())?,
            non_following: build(Policy::none())?,
        })
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl Exchange for ReqwestExchange {
    async fn exchange(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let client = match request.redirect {
            RedirectPolicy::Follow => &self.following,
            RedirectPolicy::Error | RedirectPolicy::Manual => &self.non_following,
        };

        let mut builder = client.request(method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                TransportError::InvalidRequest(e.to_string())
            } else {
                TransportError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
