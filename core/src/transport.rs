//! The HTTP transport seam and its ureq-backed implementation.
//!
//! # Design
//! `Transport` is the only place network IO happens; the executor depends on
//! it as a trait object so tests can script responses. `UreqTransport` turns
//! every well-formed HTTP exchange into an `HttpResponse` whatever its status
//! or body size, and reports only failures that prevented a response as
//! `TransportError`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use base64::Engine as _;
use ureq::http::header::AUTHORIZATION;

use crate::error::{TransportError, TransportErrorKind};
use crate::http::{HttpRequest, HttpResponse};

/// Performs the network exchange for one request.
///
/// Implementations deliver either a response (status, headers, body) or the
/// failure that prevented one, exactly once per call.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by a shared `ureq::Agent`.
///
/// ureq is blocking, so each call runs on tokio's blocking pool. Non-2xx
/// statuses are returned as responses, not errors.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent.clone();
        let request = request.clone();
        tokio::task::spawn_blocking(move || execute(&agent, &request))
            .await
            .map_err(|e| TransportError::new(TransportErrorKind::Cancelled, e.to_string()))?
    }
}

fn execute(agent: &ureq::Agent, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
    let mut builder = ureq::http::Request::builder()
        .method(request.method().as_str())
        .uri(request.url());
    for (name, value) in request.headers() {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(credential) = request.credential() {
        if request.header(AUTHORIZATION.as_str()).is_none() {
            builder = builder.header(AUTHORIZATION, basic_authorization(&credential.user, &credential.password));
        }
    }

    let invalid = |e: ureq::http::Error| TransportError::new(TransportErrorKind::InvalidRequest, e.to_string());
    let mut response = match request.body() {
        Some(body) => agent.run(builder.body(body.to_vec()).map_err(invalid)?)?,
        None => agent.run(builder.body(()).map_err(invalid)?)?,
    };

    let status = response.status().as_u16();
    let headers: BTreeMap<String, String> = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let data = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()?;
    let body = if data.is_empty() { None } else { Some(data) };

    Ok(HttpResponse::new(status, headers, body))
}

fn basic_authorization(user: &str, password: &str) -> String {
    let token = base64::engine::general_purpose::STANDARD.encode(format!("{user}:{password}"));
    format!("Basic {token}")
}
