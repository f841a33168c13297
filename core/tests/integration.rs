//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every callback style
//! through the real ureq transport. Callbacks land on the test thread, which
//! drains the main queue until it goes idle.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fetch_core::{
    Credential, DecodeError, Executor, FetchError, HttpMethod, HttpRequest, JsonShape, MainQueue,
    Outcome, Typed, UreqTransport, WrappedError,
};
use serde::Deserialize;

const IDLE: Duration = Duration::from_millis(500);

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

/// A port nothing listens on.
fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/objects.json")
}

struct Harness {
    base: String,
    runtime: tokio::runtime::Runtime,
    queue: MainQueue,
    executor: Executor,
}

impl Harness {
    fn new() -> Self {
        let addr = start_server();
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let queue = MainQueue::new(runtime.handle().clone());
        let executor = Executor::new(
            Arc::new(UreqTransport::new()),
            runtime.handle().clone(),
            queue.handle(),
        );
        Self {
            base: format!("http://{addr}"),
            runtime,
            queue,
            executor,
        }
    }

    fn get(&self, path: &str) -> HttpRequest {
        HttpRequest::get(format!("{}{path}", self.base))
    }
}

fn list_of_mappings() -> JsonShape {
    JsonShape::sequence_of(JsonShape::mapping_of(JsonShape::Any))
}

/// Collects what a callback delivered so the test thread can inspect it.
fn slot<T>() -> Arc<Mutex<Option<T>>> {
    Arc::new(Mutex::new(None))
}

#[derive(Debug, Deserialize, PartialEq)]
struct Item {
    a: i64,
}

#[test]
fn sum_type_typed_json_matches_direct_parse() {
    let mut h = Harness::new();
    let got = slot();
    let g = got.clone();
    h.executor
        .sum_type()
        .fetch_typed_json(h.get("/objects.json"), list_of_mappings(), move |outcome| {
            *g.lock().unwrap() = Some(outcome);
        });
    assert_eq!(h.queue.run_until_idle(IDLE), 1);

    match got.lock().unwrap().take().unwrap() {
        Outcome::Success { response, value } => {
            assert_eq!(response.status, 200);
            let direct: serde_json::Value = serde_json::from_slice(response.bytes()).unwrap();
            assert_eq!(value, direct);
            assert_eq!(value, serde_json::json!([{"a": 1}]));
        }
        Outcome::Failure { error, .. } => panic!("unexpected failure: {error}"),
    };
}

#[test]
fn sum_type_wrong_shape_keeps_real_status() {
    let mut h = Harness::new();
    let got = slot();
    let g = got.clone();
    h.executor.sum_type().fetch_typed_json(
        h.get("/objects.json"),
        JsonShape::mapping_of(JsonShape::Any),
        move |outcome| {
            *g.lock().unwrap() = Some(outcome);
        },
    );
    h.queue.run_until_idle(IDLE);

    match got.lock().unwrap().take().unwrap() {
        Outcome::Failure { response, error } => {
            assert_eq!(response.status, 200);
            assert!(matches!(
                error,
                FetchError::Decode(DecodeError::UnexpectedType { .. })
            ));
        }
        Outcome::Success { .. } => panic!("expected a decode failure"),
    };
}

#[test]
fn connection_refused_reports_sentinel_response() {
    let mut h = Harness::new();
    let got = slot();
    let g = got.clone();
    h.executor
        .sum_type()
        .fetch_json(HttpRequest::get(refused_url()), move |outcome| {
            *g.lock().unwrap() = Some(outcome);
        });
    h.queue.run_until_idle(IDLE);

    match got.lock().unwrap().take().unwrap() {
        Outcome::Failure { response, error } => {
            assert!(response.is_empty_sentinel());
            assert!(error.is_transport(), "{error}");
        }
        Outcome::Success { .. } => panic!("expected a transport failure"),
    };
}

#[test]
fn non_success_status_is_still_a_response() {
    let mut h = Harness::new();
    let got = slot();
    let g = got.clone();
    h.executor.sum_type().fetch_json(h.get("/status/450"), move |outcome| {
        *g.lock().unwrap() = Some(outcome);
    });
    h.queue.run_until_idle(IDLE);

    match got.lock().unwrap().take().unwrap() {
        Outcome::Success { response, value } => {
            assert_eq!(response.status, 450);
            assert_eq!(value["status"], 450);
        }
        Outcome::Failure { error, .. } => panic!("unexpected failure: {error}"),
    };
}

#[test]
fn empty_body_is_no_data_and_text_is_invalid_json() {
    let mut h = Harness::new();
    let errors = Arc::new(Mutex::new(Vec::new()));
    for path in ["/empty", "/text"] {
        let errors = errors.clone();
        h.executor.split().fetch_json(
            h.get(path),
            |_, _| panic!("expected failure"),
            move |response, error| errors.lock().unwrap().push((response.status, error)),
        );
    }
    h.queue.run_until_idle(IDLE);

    let mut errors = std::mem::take(&mut *errors.lock().unwrap());
    errors.sort_by_key(|(status, _)| *status);
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].0, 200);
    assert!(matches!(errors[0].1, FetchError::Decode(DecodeError::InvalidJson(_))));
    assert_eq!(errors[1].0, 204);
    assert!(matches!(errors[1].1, FetchError::Decode(DecodeError::NoData)));
}

#[test]
fn deferred_good_and_bad_types() {
    let mut h = Harness::new();
    let statuses = Arc::new(Mutex::new(Vec::new()));
    let decode_errors = Arc::new(Mutex::new(0));

    let s = statuses.clone();
    h.executor
        .deferred()
        .fetch_typed_json(h.get("/objects.json"), Typed::<Vec<Item>>::new(), move |result| {
            let (response, items) = result().unwrap();
            assert_eq!(items, vec![Item { a: 1 }]);
            s.lock().unwrap().push(response.status);
        });

    let d = decode_errors.clone();
    h.executor
        .deferred()
        .fetch_typed_json(h.get("/objects.json"), Typed::<Item>::new(), move |result| {
            let err = result().unwrap_err();
            let wrapped = err.downcast_ref::<WrappedError>().unwrap();
            assert_eq!(wrapped.response.status, 200);
            assert!(wrapped.error.is_decode(), "{err}");
            assert!(matches!(
                wrapped.error,
                FetchError::Decode(DecodeError::UnexpectedType { .. })
            ));
            *d.lock().unwrap() += 1;
        });

    assert_eq!(h.queue.run_until_idle(IDLE), 2);
    assert_eq!(*statuses.lock().unwrap(), vec![200]);
    assert_eq!(*decode_errors.lock().unwrap(), 1);
}

#[test]
fn deferred_wrapped_attaches_response_to_every_error() {
    let mut h = Harness::new();
    let got: Arc<Mutex<Vec<WrappedError>>> = Arc::new(Mutex::new(Vec::new()));

    let g = got.clone();
    h.executor.deferred_wrapped().fetch_typed_json(
        h.get("/objects.json"),
        JsonShape::mapping_of(JsonShape::Any),
        move |result| g.lock().unwrap().push(result().unwrap_err()),
    );
    let g = got.clone();
    h.executor
        .deferred_wrapped()
        .fetch_data(HttpRequest::get(refused_url()), move |result| {
            g.lock().unwrap().push(result().unwrap_err())
        });
    h.queue.run_until_idle(IDLE);

    let mut errors = std::mem::take(&mut *got.lock().unwrap());
    errors.sort_by_key(|e| e.response.status);
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].response.status, 0);
    assert!(errors[0].error.is_transport());
    assert_eq!(errors[1].response.status, 200);
    assert!(errors[1].error.is_decode());
}

#[test]
fn post_sends_method_headers_body_and_credential() {
    let mut h = Harness::new();
    let request = HttpRequest::new(HttpMethod::Post, format!("{}/echo", h.base))
        .with_header("X-Test", "a\"b")
        .with_body("foo")
        .with_credential(Credential::new("user", "pass"));

    let description = h.executor.describer().describe(&request);
    assert!(description.contains("-u user:pass \\\n"));
    assert!(description.contains("-X POST \\\n"));

    let got = slot();
    let g = got.clone();
    h.executor.split().fetch_typed_json(
        request,
        Typed::<mock_server::Echo>::new(),
        move |response, echo| *g.lock().unwrap() = Some((response.status, echo)),
        |_, error| panic!("unexpected failure: {error}"),
    );
    h.queue.run_until_idle(IDLE);

    let (status, echo) = got.lock().unwrap().take().unwrap();
    assert_eq!(status, 200);
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.body, "foo");
    assert_eq!(echo.headers.get("x-test").map(String::as_str), Some("a\"b"));
    assert_eq!(
        echo.headers.get("authorization").map(String::as_str),
        Some("Basic dXNlcjpwYXNz")
    );
}

#[test]
fn async_api_can_be_awaited_directly() {
    let h = Harness::new();
    let outcome = h
        .runtime
        .block_on(h.executor.fetch_typed_json(&h.get("/object.json"), &Typed::<Item>::new()));
    let (response, item) = outcome.into_result().unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(item, Item { a: 1 });
    assert!(response
        .headers
        .get("content-type")
        .is_some_and(|v| v.starts_with("application/json")));
}

#[test]
fn body_above_ten_megabytes_is_read_whole() {
    let h = Harness::new();
    let outcome = h.runtime.block_on(h.executor.fetch_json(&h.get("/large")));
    let (response, value) = outcome.into_result().unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.bytes().len(), mock_server::LARGE_BODY_LEN + 2);
    assert_eq!(value.as_str().map(str::len), Some(mock_server::LARGE_BODY_LEN));
}
