//! Issues requests through a [`Transport`] and normalizes what comes back.
//!
//! # Design
//! `Executor` holds only shared handles (transport, runtime, main queue,
//! describer) and no per-call state. The async methods are the single
//! implementation of fetch / fetch JSON / fetch typed JSON; the callback
//! styles in [`crate::callbacks`] are thin adapters over them that run the
//! future on the runtime and deliver the result on the main queue.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Handle;
use tracing::Instrument;
use uuid::Uuid;

use crate::callbacks::{Deferred, DeferredWrapped, Split, SumType};
use crate::describe::Describer;
use crate::error::{TransportError, TransportErrorKind};
use crate::http::{HttpRequest, HttpResponse};
use crate::main_queue::MainHandle;
use crate::outcome::Outcome;
use crate::shape::{JsonShape, Shape};
use crate::transport::Transport;

#[derive(Clone)]
pub struct Executor {
    transport: Arc<dyn Transport>,
    runtime: Handle,
    main: MainHandle,
    describer: Describer,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("main", &self.main)
            .field("describer", &self.describer)
            .finish_non_exhaustive()
    }
}

impl Executor {
    pub fn new(transport: Arc<dyn Transport>, runtime: Handle, main: MainHandle) -> Self {
        Self {
            transport,
            runtime,
            main,
            describer: Describer::default(),
        }
    }

    pub fn with_describer(mut self, describer: Describer) -> Self {
        self.describer = describer;
        self
    }

    pub fn describer(&self) -> &Describer {
        &self.describer
    }

    /// Issue one request. Success carries the body bytes (empty when the
    /// response had none); transport failure carries the empty response.
    pub async fn fetch(&self, request: &HttpRequest) -> Outcome<Vec<u8>> {
        let span = tracing::debug_span!(
            "fetch",
            id = %Uuid::new_v4(),
            method = request.method().as_str(),
            url = request.url()
        );
        async {
            tracing::trace!("\n{}", self.describer.describe_masked(request));
            match self.transport.send(request).await {
                Ok(response) => {
                    tracing::debug!(status = response.status, "response received");
                    let bytes = response.bytes().to_vec();
                    Outcome::success(response, bytes)
                }
                Err(error) => {
                    tracing::warn!(%error, "transport failure");
                    Outcome::failure(Default::default(), error)
                }
            }
        }
        .instrument(span)
        .await
    }

    pub async fn fetch_json(&self, request: &HttpRequest) -> Outcome<Value> {
        self.fetch_typed_json(request, &JsonShape::Any).await
    }

    /// Fetch and decode against `shape`. Decode failures keep the response
    /// that was received.
    pub async fn fetch_typed_json<S: Shape>(&self, request: &HttpRequest, shape: &S) -> Outcome<S::Output> {
        match self.fetch(request).await {
            Outcome::Failure { response, error } => Outcome::Failure { response, error },
            Outcome::Success { response, .. } => match response.json(shape) {
                Ok(value) => Outcome::success(response, value),
                Err(error) => {
                    tracing::debug!(status = response.status, %error, "decode failure");
                    Outcome::failure(response, error)
                }
            },
        }
    }

    /// Run `work` on the runtime and hand its outcome to `then` on the main
    /// queue. `then` runs exactly once: if the task is dropped before it
    /// finishes (the runtime shut down), it receives a `Cancelled` failure.
    pub fn spawn_then<T, Fut, F>(&self, work: Fut, then: F)
    where
        T: Send + 'static,
        Fut: Future<Output = Outcome<T>> + Send + 'static,
        F: FnOnce(Outcome<T>) + Send + 'static,
    {
        let delivery = Delivery {
            main: self.main.clone(),
            then: Some(then),
            _output: PhantomData,
        };
        self.runtime.spawn(async move {
            let outcome = work.await;
            delivery.deliver(outcome);
        });
    }

    /// Callback receiving one [`Outcome`].
    pub fn sum_type(&self) -> SumType<'_> {
        SumType::new(self)
    }

    /// Callback receiving a thunk that returns the value or an untyped error.
    pub fn deferred(&self) -> Deferred<'_> {
        Deferred::new(self)
    }

    /// Callback receiving a thunk whose errors are all [`crate::WrappedError`].
    pub fn deferred_wrapped(&self) -> DeferredWrapped<'_> {
        DeferredWrapped::new(self)
    }

    /// Separate success and error callbacks.
    pub fn split(&self) -> Split<'_> {
        Split::new(self)
    }
}

/// Posts the continuation once, with the real outcome or, when dropped
/// unused, with a cancellation.
struct Delivery<T, F>
where
    T: Send + 'static,
    F: FnOnce(Outcome<T>) + Send + 'static,
{
    main: MainHandle,
    then: Option<F>,
    _output: PhantomData<fn() -> T>,
}

impl<T, F> Delivery<T, F>
where
    T: Send + 'static,
    F: FnOnce(Outcome<T>) + Send + 'static,
{
    fn deliver(mut self, outcome: Outcome<T>) {
        if let Some(then) = self.then.take() {
            self.main.post(move || then(outcome));
        }
    }
}

impl<T, F> Drop for Delivery<T, F>
where
    T: Send + 'static,
    F: FnOnce(Outcome<T>) + Send + 'static,
{
    fn drop(&mut self) {
        if let Some(then) = self.then.take() {
            tracing::warn!("fetch task dropped before completion");
            let error = TransportError::new(
                TransportErrorKind::Cancelled,
                "runtime shut down before the request completed",
            );
            let outcome = Outcome::failure(HttpResponse::empty(), error);
            self.main.post(move || then(outcome));
        }
    }
}
