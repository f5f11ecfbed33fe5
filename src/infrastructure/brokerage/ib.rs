//! Interactive Brokers TWS / IB Gateway connection.
//!
//! The `ibapi` client is blocking, so every call hops onto the blocking pool
//! and holds the connection lock for its whole request/response exchange.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ibapi::Client;
use ibapi::accounts::{AccountSummaries, AccountSummaryTags};
use ibapi::contracts::{Contract, SecurityType};
use ibapi::orders::{Action, PlaceOrder, order_builder};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, info, warn};

use super::{
    AccountSummaryRecord, BrokerageGateway, OptionContract, OrderAck, OrderAction, OrderKind,
    OrderTicket, QualifiedContract,
};
use crate::config::Config;
use crate::error::UpstreamError;

const ACCOUNT_GROUP: &str = "All";
const OPTION_MULTIPLIER: &str = "100";
const PENDING_SUBMIT: &str = "PendingSubmit";

pub struct IbGateway {
    client: Arc<Mutex<Client>>,
    ack_timeout: Duration,
}

impl IbGateway {
    pub async fn connect(config: &Config) -> Result<Self, UpstreamError> {
        let address = config.ib_address();
        let client_id = config.ib_client_id;
        info!(address = %address, client_id, "Connecting to IB Gateway");

        let client = tokio::task::spawn_blocking(move || Client::connect(&address, client_id))
            .await
            .map_err(|e| UpstreamError::Gateway(format!("connect task failed: {e}")))?
            .map_err(gateway_error)?;

        info!("Connected to IB Gateway");
        Ok(Self {
            client: Arc::new(Mutex::new(client)),
            ack_timeout: config.ib_order_ack_timeout(),
        })
    }

    async fn with_client<T, F>(&self, call: F) -> Result<T, UpstreamError>
    where
        T: Send + 'static,
        F: FnOnce(&Client) -> Result<T, UpstreamError> + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || {
            let guard = client
                .lock()
                .map_err(|_| UpstreamError::Gateway("connection lock poisoned".into()))?;
            call(&guard)
        })
        .await
        .map_err(|e| UpstreamError::Gateway(format!("gateway task failed: {e}")))?
    }
}

#[async_trait]
impl BrokerageGateway for IbGateway {
    async fn account_summary(&self) -> Result<Vec<AccountSummaryRecord>, UpstreamError> {
        self.with_client(|client| {
            let subscription = client
                .account_summary(ACCOUNT_GROUP, AccountSummaryTags::ALL)
                .map_err(gateway_error)?;

            let mut records = Vec::new();
            for update in &subscription {
                match update {
                    AccountSummaries::Summary(row) => records.push(AccountSummaryRecord {
                        account: row.account,
                        tag: row.tag,
                        value: row.value,
                        currency: row.currency,
                    }),
                    AccountSummaries::End => break,
                }
            }

            debug!(rows = records.len(), "Account summary retrieved");
            Ok(records)
        })
        .await
    }

    async fn qualify_contract(
        &self,
        contract: &OptionContract,
    ) -> Result<QualifiedContract, UpstreamError> {
        let requested = contract.clone();
        self.with_client(move |client| {
            let query = to_ib_contract(&requested)?;
            let details = client.contract_details(&query).map_err(gateway_error)?;

            let Some(first) = details.into_iter().next() else {
                return Err(UpstreamError::Gateway(format!(
                    "no contract matches {}",
                    requested.display_name()
                )));
            };

            debug!(
                contract_id = first.contract.contract_id,
                local_symbol = %first.contract.local_symbol,
                "Contract qualified"
            );
            Ok(QualifiedContract {
                contract_id: first.contract.contract_id,
                local_symbol: first.contract.local_symbol,
                contract: requested,
            })
        })
        .await
    }

    async fn place_order(
        &self,
        contract: &QualifiedContract,
        ticket: &OrderTicket,
    ) -> Result<OrderAck, UpstreamError> {
        let contract = contract.clone();
        let ticket = ticket.clone();
        let ack_timeout = self.ack_timeout;

        self.with_client(move |client| {
            let mut ib_contract = to_ib_contract(&contract.contract)?;
            ib_contract.contract_id = contract.contract_id;

            let action = match ticket.action {
                OrderAction::Buy => Action::Buy,
                OrderAction::Sell => Action::Sell,
            };
            let quantity = f64::from(ticket.quantity);
            let mut order = match &ticket.kind {
                OrderKind::Market => order_builder::market_order(action, quantity),
                OrderKind::Limit { price } => {
                    order_builder::limit_order(action, quantity, to_f64(price, "limit price")?)
                }
            };
            order.order_ref = ticket.order_ref.clone();

            let order_id = client.next_order_id();
            info!(
                order_id,
                order_ref = %ticket.order_ref,
                contract = %contract.contract.display_name(),
                "Submitting order"
            );
            let subscription = client
                .place_order(order_id, &ib_contract, &order)
                .map_err(gateway_error)?;

            let deadline = Instant::now() + ack_timeout;
            while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
                match subscription.next_timeout(remaining) {
                    Some(PlaceOrder::OrderStatus(status)) => {
                        return Ok(OrderAck {
                            order_id,
                            status: status.status,
                        });
                    }
                    Some(other) => debug!(order_id, event = ?other, "Order event"),
                    None => break,
                }
            }

            warn!(order_id, "No order status before timeout");
            Ok(OrderAck {
                order_id,
                status: PENDING_SUBMIT.to_string(),
            })
        })
        .await
    }
}

fn to_ib_contract(contract: &OptionContract) -> Result<Contract, UpstreamError> {
    Ok(Contract {
        symbol: contract.symbol.clone(),
        security_type: SecurityType::Option,
        last_trade_date_or_contract_month: contract.expiry.format("%Y%m%d").to_string(),
        strike: to_f64(&contract.strike, "strike")?,
        right: contract.right.code().to_string(),
        multiplier: OPTION_MULTIPLIER.to_string(),
        exchange: contract.exchange.clone(),
        currency: contract.currency.clone(),
        ..Default::default()
    })
}

fn to_f64(value: &Decimal, what: &str) -> Result<f64, UpstreamError> {
    value
        .to_f64()
        .ok_or_else(|| UpstreamError::Gateway(format!("{what} {value} is not representable")))
}

fn gateway_error(e: ibapi::Error) -> UpstreamError {
    UpstreamError::Gateway(e.to_string())
}
