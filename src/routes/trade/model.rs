use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::infrastructure::brokerage::{
    OptionContract, OptionRight, OrderAction, OrderKind, OrderTicket,
};

const DEFAULT_EXCHANGE: &str = "SMART";
const DEFAULT_CURRENCY: &str = "USD";

/// Trade request as sent by the client. Enum-like fields stay strings here so
/// that bad values come back as a 400 with a readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOptionTradeRequest {
    pub symbol: String,
    pub expiry: String,
    pub strike: Decimal,
    pub right: String,
    pub quantity: i64,
    pub action: String,
    pub order_type: String,
    #[serde(default)]
    pub limit_price: Option<Decimal>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlaceOptionTradeResponse {
    pub status: String,
    pub order_id: i32,
    pub trade_status: String,
}

/// A validated trade, ready to hand to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionOrder {
    pub contract: OptionContract,
    pub ticket: OrderTicket,
}

impl TryFrom<PlaceOptionTradeRequest> for OptionOrder {
    type Error = AppError;

    fn try_from(req: PlaceOptionTradeRequest) -> Result<Self, Self::Error> {
        let symbol = req.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(bad_request("symbol must not be empty"));
        }

        let expiry = parse_expiry(&req.expiry)?;
        if req.strike <= Decimal::ZERO {
            return Err(bad_request("strike must be positive"));
        }
        let right = parse_right(&req.right)?;
        let action = parse_action(&req.action)?;

        let quantity = u32::try_from(req.quantity)
            .ok()
            .filter(|quantity| *quantity > 0)
            .ok_or_else(|| bad_request("quantity must be a positive integer"))?;

        let kind = match req.order_type.trim().to_ascii_uppercase().as_str() {
            "MKT" | "MARKET" => {
                if req.limit_price.is_some() {
                    tracing::debug!("Ignoring limit_price on market order");
                }
                OrderKind::Market
            }
            "LMT" | "LIMIT" => match req.limit_price {
                Some(price) if price > Decimal::ZERO => OrderKind::Limit { price },
                Some(_) => return Err(bad_request("limit_price must be positive")),
                None => return Err(bad_request("limit_price is required for limit orders")),
            },
            other => {
                return Err(bad_request(&format!(
                    "unsupported order_type {other:?}, expected MKT or LMT"
                )));
            }
        };

        Ok(OptionOrder {
            contract: OptionContract {
                symbol,
                expiry,
                strike: req.strike,
                right,
                exchange: non_empty_or(req.exchange, DEFAULT_EXCHANGE),
                currency: non_empty_or(req.currency, DEFAULT_CURRENCY),
            },
            ticket: OrderTicket {
                action,
                quantity,
                kind,
                order_ref: Uuid::new_v4().to_string(),
            },
        })
    }
}

fn bad_request(msg: &str) -> AppError {
    AppError::BadRequest(msg.to_string())
}

fn parse_expiry(value: &str) -> Result<NaiveDate, AppError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y%m%d"))
        .map_err(|_| bad_request("expiry must be a date in YYYY-MM-DD form"))
}

fn parse_right(value: &str) -> Result<OptionRight, AppError> {
    match value.trim().to_ascii_uppercase().as_str() {
        "C" | "CALL" => Ok(OptionRight::Call),
        "P" | "PUT" => Ok(OptionRight::Put),
        _ => Err(bad_request("right must be C or P")),
    }
}

fn parse_action(value: &str) -> Result<OrderAction, AppError> {
    match value.trim().to_ascii_uppercase().as_str() {
        "BUY" => Ok(OrderAction::Buy),
        "SELL" => Ok(OrderAction::Sell),
        _ => Err(bad_request("action must be BUY or SELL")),
    }
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
