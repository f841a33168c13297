//! Error types for fetch operations.
//!
//! # Design
//! Transport failures and decode failures are kept apart because only the
//! latter happen after a real response arrived. `WrappedError` pairs either
//! of them with the response that was available at the point of failure, the
//! empty sentinel when the transport never produced one.

use std::fmt;

use thiserror::Error;

use crate::http::HttpResponse;

/// Classification of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    ConnectionRefused,
    Timeout,
    Tls,
    Cancelled,
    /// The request could not be turned into a wire request (bad URL, bad
    /// header value).
    InvalidRequest,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransportErrorKind::ConnectionRefused => "connection refused",
            TransportErrorKind::Timeout => "timed out",
            TransportErrorKind::Tls => "TLS failure",
            TransportErrorKind::Cancelled => "cancelled",
            TransportErrorKind::InvalidRequest => "invalid request",
            TransportErrorKind::Other => "transport failure",
        };
        f.write_str(s)
    }
}

/// The network or IO failure reported by the transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        let kind = match &err {
            ureq::Error::Io(io) => match io.kind() {
                std::io::ErrorKind::ConnectionRefused => TransportErrorKind::ConnectionRefused,
                std::io::ErrorKind::TimedOut => TransportErrorKind::Timeout,
                _ => TransportErrorKind::Other,
            },
            ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
            ureq::Error::BadUri(_) | ureq::Error::Http(_) => TransportErrorKind::InvalidRequest,
            _ => {
                let text = err.to_string().to_ascii_lowercase();
                if text.contains("tls") || text.contains("certificate") {
                    TransportErrorKind::Tls
                } else if text.contains("refused") {
                    TransportErrorKind::ConnectionRefused
                } else {
                    TransportErrorKind::Other
                }
            }
        };
        TransportError::new(kind, err.to_string())
    }
}

/// Failure to turn a received body into the requested shape.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("No Data")]
    NoData,

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Expected JSON type: {expected}, found: {found}")]
    UnexpectedType { expected: String, found: String },
}

/// The underlying error of a failed fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl FetchError {
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, FetchError::Decode(_))
    }
}

/// A fetch error together with the response available when it happened.
#[derive(Debug, Error)]
#[error("HTTP {}: {error}", .response.status)]
pub struct WrappedError {
    pub response: HttpResponse,
    #[source]
    pub error: FetchError,
}

impl WrappedError {
    pub fn new(response: HttpResponse, error: impl Into<FetchError>) -> Self {
        Self {
            response,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn unexpected_type_names_both_shapes() {
        let err = DecodeError::UnexpectedType {
            expected: "mapping of any".to_string(),
            found: "sequence of mapping of number".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Expected JSON type: mapping of any, found: sequence of mapping of number"
        );
    }

    #[test]
    fn wrapped_error_exposes_source() {
        let err = WrappedError::new(
            HttpResponse::empty(),
            TransportError::new(TransportErrorKind::ConnectionRefused, "nope"),
        );
        assert_eq!(err.to_string(), "HTTP 0: connection refused: nope");
        assert!(err.source().is_some());
        assert!(err.error.is_transport());
    }

    #[test]
    fn io_refused_is_classified() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = TransportError::from(ureq::Error::Io(io));
        assert_eq!(err.kind, TransportErrorKind::ConnectionRefused);
    }
}
