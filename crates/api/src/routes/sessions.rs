//! Gateway message endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use gateway::{
    GatewayReply, GatewayRequest, SessionId, SessionState, StatementRecord, TransactionMode,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct GatewayConfigRequest {
    pub auto_transaction: bool,
}

// -- Response types --

#[derive(Serialize)]
pub struct SessionOpenedResponse {
    pub session_id: SessionId,
    pub mode: TransactionMode,
    pub state: SessionState,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: SessionId,
    pub mode: TransactionMode,
    pub state: SessionState,
    pub statements: Vec<StatementRecord>,
}

#[derive(Serialize)]
pub struct GatewayConfigResponse {
    pub auto_transaction: bool,
}

// -- Handlers --

/// POST /gateway/sessions — open an `Idle` session in the current mode.
pub async fn open(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SessionOpenedResponse>) {
    let session = state.gateway.open_session();
    let mode = session.mode();
    let session_id = state.sessions.insert(session).await;
    tracing::debug!(%session_id, ?mode, "session opened");

    (
        StatusCode::CREATED,
        Json(SessionOpenedResponse {
            session_id,
            mode,
            state: SessionState::Idle,
        }),
    )
}

/// POST /gateway/sessions/{id} — deliver one protocol message.
#[tracing::instrument(skip(state, request), fields(operation = %request.operation()))]
pub async fn send(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<GatewayRequest>,
) -> Result<Json<GatewayReply>, ApiError> {
    let session = lookup(&state, &id).await?;
    let reply = session.lock().await.handle(request).await?;
    Ok(Json(reply))
}

/// GET /gateway/sessions/{id} — session state and statement log.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = lookup(&state, &id).await?;
    let session = session.lock().await;

    Ok(Json(SessionResponse {
        session_id: session.id(),
        mode: session.mode(),
        state: session.state(),
        statements: session.statements().to_vec(),
    }))
}

/// DELETE /gateway/sessions/{id} — forget a session.
///
/// A session with an open transaction is rolled back first.
pub async fn close(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session = lookup(&state, &id).await?;
    let mut session = session.lock().await;
    if session.state() == SessionState::Started {
        session.rollback().await?;
    }
    state.sessions.remove(session.id()).await;
    tracing::debug!(session_id = %session.id(), "session closed");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /gateway/config
pub async fn config(State(state): State<Arc<AppState>>) -> Json<GatewayConfigResponse> {
    Json(GatewayConfigResponse {
        auto_transaction: state.gateway.auto_transaction(),
    })
}

/// PUT /gateway/config — toggle auto-transaction handling.
pub async fn set_config(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GatewayConfigRequest>,
) -> Json<GatewayConfigResponse> {
    state.gateway.set_auto_transaction(req.auto_transaction);
    Json(GatewayConfigResponse {
        auto_transaction: state.gateway.auto_transaction(),
    })
}

async fn lookup(
    state: &AppState,
    id: &str,
) -> Result<gateway::SharedSession<gateway::InMemoryBackend>, ApiError> {
    let session_id: SessionId = id
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid session id: {e}")))?;

    state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Session {session_id} not found")))
}
