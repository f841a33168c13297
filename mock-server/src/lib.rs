use std::collections::BTreeMap;

use axum::{
    extract::Path,
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Length of the JSON string served by `/large`; larger than ureq's default
/// 10 MB body limit.
pub const LARGE_BODY_LEN: usize = 11 * 1024 * 1024;

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/objects.json", get(objects))
        .route("/object.json", get(object))
        .route("/status/{code}", get(status))
        .route("/empty", get(empty))
        .route("/text", get(text))
        .route("/large", get(large))
        .route("/echo", any(echo))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn objects() -> Json<Value> {
    Json(json!([{ "a": 1 }]))
}

async fn object() -> Json<Value> {
    Json(json!({ "a": 1 }))
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, Json(json!({ "status": code }))))
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn text() -> &'static str {
    "plain text, not json"
}

async fn large() -> Json<Value> {
    Json(Value::String("x".repeat(LARGE_BODY_LEN)))
}

async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.as_str().to_string(),
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_serializes_to_json() {
        let echo = Echo {
            method: "POST".to_string(),
            headers: BTreeMap::from([("x".to_string(), "1".to_string())]),
            body: "foo".to_string(),
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["method"], "POST");
        assert_eq!(json["headers"]["x"], "1");
        assert_eq!(json["body"], "foo");
    }

    #[tokio::test]
    async fn fixtures_have_expected_shape() {
        assert!(objects().await.0.is_array());
        assert!(object().await.0.is_object());
    }
}
