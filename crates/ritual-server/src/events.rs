//! Event handlers and the per-request buffering transport.

use std::sync::{
  Arc, Mutex,
  atomic::{AtomicI64, Ordering},
};

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use ritual_core::user::MessageId;
use ritual_engine::{
  ActionEvent, TextEvent,
  transport::{Markup, Transport},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::AppState;

// ─── Buffering transport ──────────────────────────────────────────────────────

/// One outgoing messaging instruction for the caller to apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Outgoing {
  Send {
    message_id: MessageId,
    text:       String,
    markup:     Markup,
  },
  Edit {
    message_id: MessageId,
    text:       String,
    markup:     Markup,
  },
  Delete { message_id: MessageId },
}

/// Collects the engine's outgoing instructions over one request. Message
/// ids are drawn from the process-wide counter in [`AppState`], so the
/// disposable panel id the engine records stays addressable later.
pub struct BufferTransport {
  next: Arc<AtomicI64>,
  log:  Mutex<Vec<Outgoing>>,
}

impl BufferTransport {
  pub fn new(next: Arc<AtomicI64>) -> Self {
    Self { next, log: Mutex::new(Vec::new()) }
  }

  fn push(&self, out: Outgoing) {
    if let Ok(mut log) = self.log.lock() {
      log.push(out);
    }
  }

  pub fn into_outputs(self) -> Vec<Outgoing> {
    self.log.into_inner().unwrap_or_default()
  }
}

impl Transport for BufferTransport {
  type Error = std::convert::Infallible;

  async fn send(
    &self,
    _user_id: i64,
    text: &str,
    markup: &Markup,
  ) -> Result<MessageId, Self::Error> {
    let message_id = self.next.fetch_add(1, Ordering::Relaxed);
    self.push(Outgoing::Send {
      message_id,
      text: text.to_owned(),
      markup: markup.clone(),
    });
    Ok(message_id)
  }

  async fn edit(
    &self,
    _user_id: i64,
    msg: MessageId,
    text: &str,
    markup: &Markup,
  ) -> Result<(), Self::Error> {
    self.push(Outgoing::Edit {
      message_id: msg,
      text:       text.to_owned(),
      markup:     markup.clone(),
    });
    Ok(())
  }

  async fn delete(
    &self,
    _user_id: i64,
    msg: MessageId,
  ) -> Result<(), Self::Error> {
    self.push(Outgoing::Delete { message_id: msg });
    Ok(())
  }
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

/// Response body of both event endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventResponse {
  pub outputs: Vec<Outgoing>,
}

/// POST /events/text — a typed user message.
pub async fn text(
  State(state): State<AppState>,
  Json(event): Json<TextEvent>,
) -> Result<Json<EventResponse>, ApiError> {
  let transport = BufferTransport::new(state.next_msg.clone());
  state.engine.handle_text(&transport, &event).await?;
  Ok(Json(EventResponse { outputs: transport.into_outputs() }))
}

/// POST /events/action — an out-of-band `action|args` invocation.
pub async fn action(
  State(state): State<AppState>,
  Json(event): Json<ActionEvent>,
) -> Result<Json<EventResponse>, ApiError> {
  let transport = BufferTransport::new(state.next_msg.clone());
  state.engine.handle_action(&transport, &event).await?;
  Ok(Json(EventResponse { outputs: transport.into_outputs() }))
}

// ─── Error mapping ────────────────────────────────────────────────────────────

/// An engine error surfaced over HTTP.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] ritual_engine::Error);

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    use ritual_core::Error as Core;
    use ritual_engine::Error as Engine;

    let (status, message) = match &self.0 {
      Engine::Core(Core::UserNotFound(_) | Core::HabitNotFound(_)) => {
        (StatusCode::NOT_FOUND, self.0.to_string())
      }
      Engine::Core(Core::UnknownAction(_) | Core::UnknownPeriod(_))
      | Engine::MissingArg { .. }
      | Engine::BadHabitId(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
      other => {
        tracing::error!(error = %other, "event handling failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
