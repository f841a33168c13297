//! The result of one fetch.
//!
//! # Design
//! Success and failure both carry an `HttpResponse`, so callers can branch
//! on status and headers even when decoding failed. Failures that happened
//! before any response existed carry the empty sentinel instead.

use crate::error::{FetchError, WrappedError};
use crate::http::HttpResponse;

/// Result of one fetch, always paired with the response context that was
/// available. On transport failure `response` is the empty sentinel.
#[derive(Debug)]
pub enum Outcome<T> {
    Success { response: HttpResponse, value: T },
    Failure { response: HttpResponse, error: FetchError },
}

impl<T> Outcome<T> {
    pub fn success(response: HttpResponse, value: T) -> Self {
        Outcome::Success { response, value }
    }

    pub fn failure(response: HttpResponse, error: impl Into<FetchError>) -> Self {
        Outcome::Failure {
            response,
            error: error.into(),
        }
    }

    pub fn response(&self) -> &HttpResponse {
        match self {
            Outcome::Success { response, .. } | Outcome::Failure { response, .. } => response,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success { response, value } => Outcome::Success {
                response,
                value: f(value),
            },
            Outcome::Failure { response, error } => Outcome::Failure { response, error },
        }
    }

    pub fn into_result(self) -> Result<(HttpResponse, T), WrappedError> {
        match self {
            Outcome::Success { response, value } => Ok((response, value)),
            Outcome::Failure { response, error } => Err(WrappedError { response, error }),
        }
    }
}
