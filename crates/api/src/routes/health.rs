//! Health check endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use channels::{ChannelSet, Destination};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Whether each fulfillment channel accepts orders.
    pub channels: BTreeMap<&'static str, bool>,
    /// How status clients should poll `/reporting/order`.
    pub poll_policy: PollPolicyResponse,
    /// Unclaimed orders waiting for an external worker.
    pub fallback_outbox: usize,
}

#[derive(Serialize)]
pub struct PollPolicyResponse {
    pub max_attempts: u32,
    pub interval_ms: u64,
}

/// GET /health — returns system health status.
///
/// The process is `ok` while it serves requests; a closed channel only
/// shows up in the per-channel map because the router reports it per order.
pub async fn check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let mut channels = BTreeMap::new();
    for destination in Destination::all() {
        channels.insert(
            destination.channel_name(),
            state.channels.is_open(destination).await,
        );
    }
    let policy = state.poll_policy;
    Json(HealthResponse {
        status: "ok",
        channels,
        poll_policy: PollPolicyResponse {
            max_attempts: policy.max_attempts,
            interval_ms: policy.interval.as_millis() as u64,
        },
        fallback_outbox: state.outbox.len().await,
    })
}
