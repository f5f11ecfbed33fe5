use axum::extract::{Extension, Json, State, rejection::JsonRejection};

use super::model::{OptionOrder, PlaceOptionTradeRequest, PlaceOptionTradeResponse};
use crate::{AppState, error::AppError, middleware::Identity};

#[axum::debug_handler]
pub async fn place_option_trade(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<PlaceOptionTradeRequest>, JsonRejection>,
) -> Result<Json<PlaceOptionTradeResponse>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let order = OptionOrder::try_from(req)?;

    tracing::info!(
        user_id = %identity.user_id,
        contract = %order.contract.display_name(),
        action = ?order.ticket.action,
        quantity = order.ticket.quantity,
        order_ref = %order.ticket.order_ref,
        "Placing option trade"
    );

    let qualified = state.gateway.qualify_contract(&order.contract).await?;
    let ack = state.gateway.place_order(&qualified, &order.ticket).await?;

    tracing::info!(order_id = ack.order_id, status = %ack.status, "Order acknowledged");
    Ok(Json(PlaceOptionTradeResponse {
        status: "Order placed".to_string(),
        order_id: ack.order_id,
        trade_status: ack.status,
    }))
}
