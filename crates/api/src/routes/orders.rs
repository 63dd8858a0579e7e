//! Order submission endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::OrderId;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct SubmitOrderRequest {
    pub order: OrderPayload,
}

#[derive(Debug, Deserialize)]
pub struct OrderPayload {
    #[serde(rename = "type")]
    pub product_type: String,
    pub id: u64,
    pub amount: u32,
}

// -- Handlers --

/// POST /order — route an order and acknowledge without waiting for it.
#[tracing::instrument(skip(state, req), fields(order_id = req.order.id))]
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitOrderRequest>,
) -> Result<StatusCode, ApiError> {
    let OrderPayload {
        product_type,
        id,
        amount,
    } = req.order;

    state
        .router
        .submit(OrderId::new(id), &product_type, amount)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
