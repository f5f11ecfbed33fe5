mod ib;
mod types;

use async_trait::async_trait;

use crate::error::UpstreamError;

pub use ib::IbGateway;
pub use types::{
    AccountSummaryRecord, OptionContract, OptionRight, OrderAck, OrderAction, OrderKind,
    OrderTicket, QualifiedContract,
};

/// The single long-lived connection to the trading desktop, shared by every
/// request handler.
#[async_trait]
pub trait BrokerageGateway: Send + Sync {
    async fn account_summary(&self) -> Result<Vec<AccountSummaryRecord>, UpstreamError>;

    /// Resolves the requested contract to exactly one gateway contract.
    async fn qualify_contract(
        &self,
        contract: &OptionContract,
    ) -> Result<QualifiedContract, UpstreamError>;

    /// Submits the order and reports the gateway's immediate order state.
    async fn place_order(
        &self,
        contract: &QualifiedContract,
        ticket: &OrderTicket,
    ) -> Result<OrderAck, UpstreamError>;
}
