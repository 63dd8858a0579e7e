//! Pull endpoint for orders no bakery line accepts.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use channels::{Destination, Envelope};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct TakeQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct OutboxResponse {
    pub channel: &'static str,
    pub envelopes: Vec<Envelope>,
    /// Envelopes still parked after this batch.
    pub remaining: usize,
}

/// GET /channels/factory.unknown.inbound?limit= — hands out parked
/// envelopes oldest first. Each envelope is returned once.
#[tracing::instrument(skip(state))]
pub async fn take(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TakeQuery>,
) -> Json<OutboxResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let envelopes = state.outbox.take(limit).await;
    tracing::debug!(taken = envelopes.len(), "fallback envelopes handed out");

    Json(OutboxResponse {
        channel: Destination::Unknown.channel_name(),
        envelopes,
        remaining: state.outbox.len().await,
    })
}
