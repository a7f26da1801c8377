//! HTTP event gateway for the Ritual conversation engine.
//!
//! Exposes an axum [`Router`] with one endpoint per inbound event kind.
//! Each request runs the engine against a buffering transport: the
//! engine's outgoing messaging instructions are collected and returned in
//! the response body for the caller to apply on its platform.

pub mod events;

use std::{
  path::PathBuf,
  sync::{Arc, atomic::AtomicI64},
};

use axum::{Router, routing::post};
use ritual_engine::Engine;
use ritual_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use events::{ApiError, BufferTransport, EventResponse, Outgoing};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:    String,
  pub port:    u16,
  pub db_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:    "127.0.0.1".to_owned(),
      port:    8080,
      db_path: PathBuf::from("ritual.db"),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState {
  pub engine:   Arc<Engine<SqliteStore>>,
  /// Message-id source shared by every request's buffering transport, so
  /// ids recorded in the store stay unique across requests.
  pub next_msg: Arc<AtomicI64>,
}

impl AppState {
  pub fn new(engine: Engine<SqliteStore>) -> Self {
    Self {
      engine:   Arc::new(engine),
      next_msg: Arc::new(AtomicI64::new(1)),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the event gateway.
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/events/text", post(events::text))
    .route("/events/action", post(events::action))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use ritual_engine::seed;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn make_state() -> AppState {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    seed::ensure_graph(store.as_ref()).await.unwrap();
    seed::validate_graph(store.as_ref()).await.unwrap();
    AppState::new(Engine::new(store))
  }

  async fn post_json(
    state: AppState,
    uri: &str,
    body: Value,
  ) -> axum::response::Response {
    let req = Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  #[tokio::test]
  async fn text_event_bootstraps_a_new_user() {
    let state = make_state().await;
    let resp = post_json(state, "/events/text", json!({
      "user_id":  7,
      "username": "alice",
      "text":     "hello",
    }))
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let outputs = body["outputs"].as_array().unwrap();
    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0]["op"], "send");
    assert_eq!(outputs[0]["text"], "Welcome to Ritual, a habit tracking app!");
    assert_eq!(outputs[1]["text"], "Main menu");
    assert_eq!(outputs[1]["markup"]["kind"], "choices");
  }

  #[tokio::test]
  async fn message_ids_stay_unique_across_requests() {
    let state = make_state().await;

    let first = body_json(
      post_json(state.clone(), "/events/text", json!({
        "user_id": 1,
        "text":    "hi",
      }))
      .await,
    )
    .await;
    let second = body_json(
      post_json(state, "/events/text", json!({
        "user_id": 2,
        "text":    "hi",
      }))
      .await,
    )
    .await;

    let ids: Vec<i64> = first["outputs"]
      .as_array()
      .unwrap()
      .iter()
      .chain(second["outputs"].as_array().unwrap())
      .map(|o| o["message_id"].as_i64().unwrap())
      .collect();
    assert_eq!(ids, [1, 2, 3, 4]);
  }

  #[tokio::test]
  async fn action_for_unknown_user_is_404() {
    let state = make_state().await;
    let resp = post_json(state, "/events/action", json!({
      "user_id": 99,
      "payload": "stats",
    }))
    .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("99"));
  }

  #[tokio::test]
  async fn unknown_action_payload_is_400() {
    let state = make_state().await;
    post_json(state.clone(), "/events/text", json!({
      "user_id": 7,
      "text":    "hi",
    }))
    .await;

    let resp = post_json(state, "/events/action", json!({
      "user_id": 7,
      "payload": "frobnicate|1",
    }))
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn missing_habit_is_404() {
    let state = make_state().await;
    post_json(state.clone(), "/events/text", json!({
      "user_id": 7,
      "text":    "hi",
    }))
    .await;

    let resp = post_json(state, "/events/action", json!({
      "user_id": 7,
      "payload": format!("info|{}", uuid::Uuid::new_v4()),
    }))
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn fixture_then_habit_list_renders_a_panel() {
    let state = make_state().await;
    post_json(state.clone(), "/events/text", json!({
      "user_id": 7,
      "text":    "hi",
    }))
    .await;
    post_json(state.clone(), "/events/action", json!({
      "user_id": 7,
      "payload": "fixture",
    }))
    .await;

    let body = body_json(
      post_json(state, "/events/text", json!({
        "user_id": 7,
        "text":    "My habits",
      }))
      .await,
    )
    .await;

    let outputs = body["outputs"].as_array().unwrap();
    // The screen prompt, then the habit-list panel.
    assert_eq!(outputs[0]["op"], "send");
    assert_eq!(outputs[0]["text"], "List of your habits:");
    assert_eq!(outputs[1]["op"], "send");
    assert_eq!(outputs[1]["text"], "Total: 5");
    let rows = outputs[1]["markup"]["data"].as_array().unwrap();
    assert_eq!(rows.len(), 5);
  }
}
