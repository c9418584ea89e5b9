use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Thing {
    pub id: u64,
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateThing {
    pub name: String,
}

/// What `/echo` saw, returned verbatim so tests can assert on the wire request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Echo {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

/// Returned by `/tagged/{tag}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Tagged {
    pub tag: String,
    pub authorization: Option<String>,
}

#[derive(Default)]
pub struct Store {
    things: RwLock<HashMap<u64, Thing>>,
    next_id: AtomicU64,
}

pub type Db = Arc<Store>;

pub fn app() -> Router {
    let db: Db = Arc::new(Store::default());
    Router::new()
        .route("/ok", get(ok))
        .route("/fail", get(fail))
        .route("/malformed", get(malformed))
        .route("/text", get(text))
        .route("/moved", get(moved))
        .route("/large/{bytes}", get(large))
        .route("/status/{code}", get(status))
        .route("/slow/{ms}", get(slow))
        .route("/tagged/{tag}", get(tagged))
        .route("/echo", any(echo))
        .route("/things", post(create_thing))
        .route("/things/{id}", get(get_thing))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn ok() -> Json<Value> {
    Json(json!({ "id": 7 }))
}

/// The body must never surface as the client-side failure message.
async fn fail() -> (StatusCode, Json<Value>) {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "internal detail that must not leak" })),
    )
}

async fn malformed() -> &'static str {
    "{\"id\": not json"
}

async fn text() -> &'static str {
    "plain text body"
}

/// Points at `/ok`; a client that follows it would see a 200.
async fn moved() -> (StatusCode, [(header::HeaderName, &'static str); 1], Json<Value>) {
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, "/ok")],
        Json(json!({ "id": 301 })),
    )
}

/// `{"id":7,"pad":"aaa…"}` padded so the body is at least `bytes` long.
async fn large(Path(bytes): Path<usize>) -> ([(header::HeaderName, &'static str); 1], String) {
    let pad = "a".repeat(bytes);
    (
        [(header::CONTENT_TYPE, "application/json")],
        format!(r#"{{"id":7,"pad":"{pad}"}}"#),
    )
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, Json(json!({ "id": code }))))
}

async fn slow(Path(ms): Path<u64>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Json(json!({ "id": ms }))
}

async fn tagged(Path(tag): Path<String>, headers: HeaderMap) -> Json<Tagged> {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(Tagged { tag, authorization })
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect();
    let body = if body.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&body).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&body).into_owned())
        }))
    };
    Json(Echo {
        method: method.to_string(),
        headers,
        body,
    })
}

/// Answers 200 rather than 201: the client only treats 200 as success.
async fn create_thing(State(db): State<Db>, Json(input): Json<CreateThing>) -> Json<Thing> {
    let thing = Thing {
        id: db.next_id.fetch_add(1, Ordering::Relaxed) + 1,
        name: input.name,
    };
    db.things.write().await.insert(thing.id, thing.clone());
    Json(thing)
}

async fn get_thing(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Thing>, StatusCode> {
    let things = db.things.read().await;
    things.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thing_serializes_to_json() {
        let thing = Thing {
            id: 3,
            name: "Widget".to_string(),
        };
        let json = serde_json::to_value(&thing).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["name"], "Widget");
    }

    #[test]
    fn create_thing_rejects_missing_name() {
        let result: Result<CreateThing, _> = serde_json::from_str(r#"{"id":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn echo_omits_absent_body_as_null() {
        let echo = Echo {
            method: "GET".to_string(),
            headers: BTreeMap::new(),
            body: None,
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert!(json["body"].is_null());
    }
}
