//! HTTP request and response values.
//!
//! # Design
//! These types describe one HTTP exchange as plain data. A `Request` is built
//! by the caller and never mutated afterwards; a `Response` is produced by the
//! transport. All fields use owned types so values move freely between the
//! caller, the runtime and the main callback queue.

use std::collections::BTreeMap;

use crate::error::DecodeError;
use crate::shape::Shape;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl HttpMethod {
    /// The method token as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

/// A user/password pair, either embedded in a request or held by a
/// credential store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub user: String,
    pub password: String,
}

impl Credential {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

/// An HTTP request described as plain data.
///
/// Construct with [`HttpRequest::new`] or [`HttpRequest::get`] and the
/// consuming `with_*` methods. Once built, a request only exposes readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    method: HttpMethod,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    credential: Option<Credential>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            credential: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Append a header. Order is preserved; repeated names are kept.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Case-insensitive lookup of the first header named `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }
}

/// An HTTP response described as plain data.
///
/// `HttpResponse::default()` is the empty sentinel (status 0, no headers, no
/// body) reported alongside failures that happened before any response
/// arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl HttpResponse {
    pub fn new(status: u16, headers: BTreeMap<String, String>, body: Option<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// The sentinel response used when the transport failed.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty_sentinel(&self) -> bool {
        self.status == 0 && self.headers.is_empty() && self.body.is_none()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body bytes, or an empty slice when the response carried none.
    pub fn bytes(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }

    /// Parse the body as JSON and check it against `shape`.
    pub fn json<S: Shape>(&self, shape: &S) -> Result<S::Output, DecodeError> {
        let data = self.body.as_deref().ok_or(DecodeError::NoData)?;
        let value: serde_json::Value = serde_json::from_slice(data)?;
        shape.decode(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::JsonShape;

    fn response(body: &str) -> HttpResponse {
        HttpResponse::new(200, BTreeMap::new(), Some(body.as_bytes().to_vec()))
    }

    #[test]
    fn request_builder_keeps_header_order() {
        let req = HttpRequest::new(HttpMethod::Post, "http://localhost/x")
            .with_header("B", "2")
            .with_header("A", "1")
            .with_body("payload");
        assert_eq!(req.method(), HttpMethod::Post);
        assert_eq!(
            req.headers(),
            &[("B".to_string(), "2".to_string()), ("A".to_string(), "1".to_string())]
        );
        assert_eq!(req.body(), Some(&b"payload"[..]));
        assert_eq!(req.header("a"), Some("1"));
        assert!(req.credential().is_none());
    }

    #[test]
    fn default_response_is_sentinel() {
        let r = HttpResponse::default();
        assert!(r.is_empty_sentinel());
        assert_eq!(r.status, 0);
        assert!(r.bytes().is_empty());
        assert!(!r.is_success());
    }

    #[test]
    fn json_without_body_is_no_data() {
        let r = HttpResponse::new(204, BTreeMap::new(), None);
        let err = r.json(&JsonShape::Any).unwrap_err();
        assert!(matches!(err, DecodeError::NoData));
    }

    #[test]
    fn json_with_invalid_body_is_invalid_json() {
        let err = response("not json").json(&JsonShape::Any).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidJson(_)));
    }

    #[test]
    fn json_matching_shape_returns_value() {
        let value = response(r#"[{"a":1}]"#)
            .json(&JsonShape::sequence_of(JsonShape::mapping_of(JsonShape::Any)))
            .unwrap();
        assert_eq!(value, serde_json::json!([{"a": 1}]));
    }
}
