//! Runs each callback style against one URL, then idles on the main queue.
//!
//! The URL comes from `FETCH_DEMO_URL`; `--mock` starts the bundled mock
//! server on a random port and uses its `/objects.json` instead.

use std::sync::Arc;

use anyhow::Context;
use fetch_core::{
    Executor, FetchError, HttpRequest, JsonShape, MainQueue, Outcome, TransportError,
    UreqTransport, WrappedError,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://seriot.ch/objects.json";

fn list_of_mappings() -> JsonShape {
    JsonShape::sequence_of(JsonShape::mapping_of(JsonShape::Any))
}

fn request_with_sum_type(executor: &Executor, url: &str) {
    let request = HttpRequest::get(url);

    executor
        .sum_type()
        .fetch_data(request.clone(), |outcome| match outcome {
            Outcome::Success { response, value } => println!("{} {} bytes", response.status, value.len()),
            Outcome::Failure { response, error } => println!("{} {error}", response.status),
        });

    executor
        .sum_type()
        .fetch_json(request.clone(), |outcome| match outcome {
            Outcome::Success { response, value } if response.is_success() => println!("{value}"),
            Outcome::Success { response, value } if response.status == 450 => println!("{value}"),
            Outcome::Success { response, value } => println!("{} {value}", response.status),
            Outcome::Failure { response, error } => println!("{} {error}", response.status),
        });

    executor
        .sum_type()
        .fetch_typed_json(request, list_of_mappings(), |outcome| match outcome {
            Outcome::Success { response, value } => println!("{} {value}", response.status),
            Outcome::Failure { response, error } => println!("{} {error}", response.status),
        });
}

fn request_with_deferred_result(executor: &Executor, url: &str) {
    let request = HttpRequest::get(url);

    executor.deferred().fetch_data(request.clone(), |result| match result() {
        Ok(response) => println!("{} {} bytes", response.status, response.bytes().len()),
        Err(e) => println!("{e}"),
    });

    executor.deferred().fetch_json(request.clone(), |result| match result() {
        Ok((response, json)) => println!("{} {json}", response.status),
        Err(e) => println!("{e}"),
    });

    executor
        .deferred()
        .fetch_typed_json(request.clone(), list_of_mappings(), |result| match result() {
            Ok((response, json)) => println!("{} {json}", response.status),
            Err(e) if e.is::<TransportError>() => println!("transport: {e}"),
            Err(e) => match e.downcast_ref::<WrappedError>() {
                Some(w) => println!("{} decode: {}", w.response.status, w.error),
                None => println!("{e}"),
            },
        });

    executor.deferred().fetch_data(request, |result| {
        if let Ok(response) = result() {
            println!("{} {} bytes", response.status, response.bytes().len());
        }
    });
}

fn request_with_deferred_wrapped(executor: &Executor, url: &str) {
    let request = HttpRequest::get(url);

    executor.deferred_wrapped().fetch_json(request.clone(), |result| match result() {
        Ok((response, json)) => println!("{} {json}", response.status),
        Err(e) => println!("{} {}", e.response.status, e.error),
    });

    executor
        .deferred_wrapped()
        .fetch_typed_json(request, list_of_mappings(), |result| match result() {
            Ok((response, json)) => println!("{} {json}", response.status),
            Err(e) if e.response.status == 400 => println!("bad request: {}", e.error),
            Err(e) => match e.error {
                FetchError::Transport(t) => println!("{} transport: {t}", e.response.status),
                FetchError::Decode(d) => println!("{} decode: {d}", e.response.status),
            },
        });
}

fn request_with_success_error(executor: &Executor, url: &str) {
    let request = HttpRequest::get(url);

    executor.split().fetch_data(
        request.clone(),
        |response| println!("{} {} bytes", response.status, response.bytes().len()),
        |response, error| println!("{} {error}", response.status),
    );

    executor.split().fetch_json(
        request.clone(),
        |_, json| println!("{json}"),
        |_, error| println!("{error}"),
    );

    executor.split().fetch_typed_json(
        request,
        list_of_mappings(),
        |_, json| println!("{json}"),
        |_, error| println!("{error}"),
    );
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fetch_core=debug,fetch_demo=info")),
        )
        .init();

    let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;

    let url = if std::env::args().any(|arg| arg == "--mock") {
        let listener = runtime
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .context("failed to bind mock server")?;
        let addr = listener.local_addr()?;
        runtime.spawn(async move {
            if let Err(e) = mock_server::run(listener).await {
                tracing::error!(error = %e, "mock server stopped");
            }
        });
        format!("http://{addr}/objects.json")
    } else {
        std::env::var("FETCH_DEMO_URL").unwrap_or_else(|_| DEFAULT_URL.to_string())
    };
    tracing::info!(%url, "running demo requests");

    let queue = MainQueue::new(runtime.handle().clone());
    let executor = Executor::new(
        Arc::new(UreqTransport::new()),
        runtime.handle().clone(),
        queue.handle(),
    );

    request_with_sum_type(&executor, &url);
    request_with_deferred_result(&executor, &url);
    request_with_deferred_wrapped(&executor, &url);
    request_with_success_error(&executor, &url);

    queue.run();
    Ok(())
}
