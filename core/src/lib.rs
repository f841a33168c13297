//! Fetch-and-decode over HTTP, offered in four callback styles.
//!
//! # Overview
//! One operation (issue a request, receive a response or a transport error,
//! optionally decode the body as JSON of an expected shape) exposed through
//! four interchangeable ways of receiving the result. A `curl` describer
//! renders requests for debug logging.
//!
//! # Design
//! - `Executor` is stateless; transport, runtime, main queue and the stores
//!   behind the describer are all injected.
//! - The async `fetch` / `fetch_json` / `fetch_typed_json` methods are the
//!   only implementation; the callback styles in [`callbacks`] adapt them.
//! - Completions are delivered on a [`MainQueue`] drained by one thread.
//! - Every failure reports the response available at that point, the empty
//!   sentinel when the transport produced none.

pub mod callbacks;
pub mod describe;
pub mod error;
pub mod executor;
pub mod http;
pub mod main_queue;
pub mod outcome;
pub mod shape;
pub mod store;
pub mod transport;

pub use callbacks::{Deferred, DeferredResult, DeferredWrapped, Split, SumType, WrappedResult};
pub use describe::Describer;
pub use error::{DecodeError, FetchError, TransportError, TransportErrorKind, WrappedError};
pub use executor::Executor;
pub use http::{Credential, HttpMethod, HttpRequest, HttpResponse};
pub use main_queue::{MainHandle, MainQueue};
pub use outcome::Outcome;
pub use shape::{JsonShape, Shape, Typed};
pub use store::{
    Cookie, CookieStore, CredentialStore, MemoryCookieStore, MemoryCredentialStore, ProtectionSpace,
    StoredCredential,
};
pub use transport::{Transport, UreqTransport};
