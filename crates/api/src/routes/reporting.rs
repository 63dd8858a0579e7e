//! Order status endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use common::OrderId;
use reporting::{OrderStatus, StatusReport};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub id: u64,
}

#[derive(Serialize)]
pub struct StatusDetailResponse {
    pub id: u64,
    pub completed: bool,
    #[serde(flatten)]
    pub status: OrderStatus,
}

/// GET /reporting/order?id= — `{"status": bool}`.
#[tracing::instrument(skip(state))]
pub async fn status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> Json<StatusReport> {
    Json(state.reporting.status(OrderId::new(query.id)).await)
}

/// GET /reporting/order/detail?id= — the full status record.
pub async fn detail(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> Json<StatusDetailResponse> {
    let status = state.reporting.detail(OrderId::new(query.id)).await;
    Json(StatusDetailResponse {
        id: query.id,
        completed: status.is_completed(),
        status,
    })
}
