//! Four callback styles over the same fetch operations.
//!
//! Every style issues the request through [`Executor`], then invokes the
//! caller's callback(s) exactly once on the main queue:
//!
//! | Style | Callback receives | Error carries response |
//! |---|---|---|
//! | [`SumType`] | `Outcome<T>` | yes |
//! | [`Deferred`] | thunk returning `anyhow::Result<T>` | decode failures only |
//! | [`DeferredWrapped`] | thunk returning `Result<T, WrappedError>` | yes |
//! | [`Split`] | `on_success` or `on_error(response, error)` | yes |

use serde_json::Value;

use crate::error::{FetchError, WrappedError};
use crate::executor::Executor;
use crate::http::{HttpRequest, HttpResponse};
use crate::outcome::Outcome;
use crate::shape::{JsonShape, Shape};

/// Resolve-or-raise thunk with an untyped error.
pub type DeferredResult<T> = Box<dyn FnOnce() -> anyhow::Result<T> + Send>;

/// Resolve-or-raise thunk whose error always carries the response.
pub type WrappedResult<T> = Box<dyn FnOnce() -> Result<T, WrappedError> + Send>;

/// Erase the error type. Transport failures downcast to `TransportError`;
/// decode failures downcast to `WrappedError` so the received response stays
/// reachable.
fn untyped(response: HttpResponse, error: FetchError) -> anyhow::Error {
    match error {
        FetchError::Transport(e) => anyhow::Error::new(e),
        error @ FetchError::Decode(_) => anyhow::Error::new(WrappedError { response, error }),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SumType<'a> {
    executor: &'a Executor,
}

impl<'a> SumType<'a> {
    pub(crate) fn new(executor: &'a Executor) -> Self {
        Self { executor }
    }

    pub fn fetch_data(&self, request: HttpRequest, completion: impl FnOnce(Outcome<Vec<u8>>) + Send + 'static) {
        let executor = self.executor.clone();
        self.executor
            .spawn_then(async move { executor.fetch(&request).await }, completion);
    }

    pub fn fetch_json(&self, request: HttpRequest, completion: impl FnOnce(Outcome<Value>) + Send + 'static) {
        self.fetch_typed_json(request, JsonShape::Any, completion);
    }

    pub fn fetch_typed_json<S>(
        &self,
        request: HttpRequest,
        shape: S,
        completion: impl FnOnce(Outcome<S::Output>) + Send + 'static,
    ) where
        S: Shape + 'static,
    {
        let executor = self.executor.clone();
        self.executor.spawn_then(
            async move { executor.fetch_typed_json(&request, &shape).await },
            completion,
        );
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Deferred<'a> {
    executor: &'a Executor,
}

impl<'a> Deferred<'a> {
    pub(crate) fn new(executor: &'a Executor) -> Self {
        Self { executor }
    }

    pub fn fetch_data(&self, request: HttpRequest, completion: impl FnOnce(DeferredResult<HttpResponse>) + Send + 'static) {
        self.executor.sum_type().fetch_data(request, move |outcome| {
            let result: DeferredResult<HttpResponse> = match outcome {
                Outcome::Success { response, .. } => Box::new(move || Ok(response)),
                Outcome::Failure { response, error } => Box::new(move || Err(untyped(response, error))),
            };
            completion(result);
        });
    }

    pub fn fetch_json(
        &self,
        request: HttpRequest,
        completion: impl FnOnce(DeferredResult<(HttpResponse, Value)>) + Send + 'static,
    ) {
        self.fetch_typed_json(request, JsonShape::Any, completion);
    }

    pub fn fetch_typed_json<S>(
        &self,
        request: HttpRequest,
        shape: S,
        completion: impl FnOnce(DeferredResult<(HttpResponse, S::Output)>) + Send + 'static,
    ) where
        S: Shape + 'static,
    {
        self.executor
            .sum_type()
            .fetch_typed_json(request, shape, move |outcome| {
                let result: DeferredResult<(HttpResponse, S::Output)> = match outcome {
                    Outcome::Success { response, value } => Box::new(move || Ok((response, value))),
                    Outcome::Failure { response, error } => Box::new(move || Err(untyped(response, error))),
                };
                completion(result);
            });
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeferredWrapped<'a> {
    executor: &'a Executor,
}

impl<'a> DeferredWrapped<'a> {
    pub(crate) fn new(executor: &'a Executor) -> Self {
        Self { executor }
    }

    pub fn fetch_data(&self, request: HttpRequest, completion: impl FnOnce(WrappedResult<HttpResponse>) + Send + 'static) {
        self.executor.sum_type().fetch_data(request, move |outcome| {
            let result = outcome.into_result().map(|(response, _)| response);
            completion(Box::new(move || result));
        });
    }

    pub fn fetch_json(
        &self,
        request: HttpRequest,
        completion: impl FnOnce(WrappedResult<(HttpResponse, Value)>) + Send + 'static,
    ) {
        self.fetch_typed_json(request, JsonShape::Any, completion);
    }

    pub fn fetch_typed_json<S>(
        &self,
        request: HttpRequest,
        shape: S,
        completion: impl FnOnce(WrappedResult<(HttpResponse, S::Output)>) + Send + 'static,
    ) where
        S: Shape + 'static,
    {
        self.executor
            .sum_type()
            .fetch_typed_json(request, shape, move |outcome| {
                let result = outcome.into_result();
                completion(Box::new(move || result));
            });
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Split<'a> {
    executor: &'a Executor,
}

impl<'a> Split<'a> {
    pub(crate) fn new(executor: &'a Executor) -> Self {
        Self { executor }
    }

    pub fn fetch_data(
        &self,
        request: HttpRequest,
        on_success: impl FnOnce(HttpResponse) + Send + 'static,
        on_error: impl FnOnce(HttpResponse, FetchError) + Send + 'static,
    ) {
        self.executor
            .sum_type()
            .fetch_data(request, move |outcome| match outcome {
                Outcome::Success { response, .. } => on_success(response),
                Outcome::Failure { response, error } => on_error(response, error),
            });
    }

    pub fn fetch_json(
        &self,
        request: HttpRequest,
        on_success: impl FnOnce(HttpResponse, Value) + Send + 'static,
        on_error: impl FnOnce(HttpResponse, FetchError) + Send + 'static,
    ) {
        self.fetch_typed_json(request, JsonShape::Any, on_success, on_error);
    }

    pub fn fetch_typed_json<S>(
        &self,
        request: HttpRequest,
        shape: S,
        on_success: impl FnOnce(HttpResponse, S::Output) + Send + 'static,
        on_error: impl FnOnce(HttpResponse, FetchError) + Send + 'static,
    ) where
        S: Shape + 'static,
    {
        self.executor
            .sum_type()
            .fetch_typed_json(request, shape, move |outcome| match outcome {
                Outcome::Success { response, value } => on_success(response, value),
                Outcome::Failure { response, error } => on_error(response, error),
            });
    }
}
