use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::infrastructure::brokerage::AccountSummaryRecord;
use crate::middleware::Identity;

const NET_LIQUIDATION: &str = "NetLiquidation";
const BUYING_POWER: &str = "BuyingPower";
const AVAILABLE_FUNDS: &str = "AvailableFunds";

/// The caller's identity together with the headline figures of the
/// brokerage account.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountOverview {
    pub user_id: String,
    pub email: String,
    pub plan: String,
    pub account_id: Option<String>,
    pub net_liquidation: Option<Decimal>,
    pub buying_power: Option<Decimal>,
    pub available_funds: Option<Decimal>,
    pub currency: Option<String>,
}

impl AccountOverview {
    pub fn new(identity: Identity, summary: &[AccountSummaryRecord]) -> Self {
        let find = |tag: &str| summary.iter().find(|row| row.tag == tag);
        let amount = |tag: &str| find(tag).and_then(|row| row.value.parse::<Decimal>().ok());

        Self {
            account_id: summary.first().map(|row| row.account.clone()),
            net_liquidation: amount(NET_LIQUIDATION),
            buying_power: amount(BUYING_POWER),
            available_funds: amount(AVAILABLE_FUNDS),
            currency: find(NET_LIQUIDATION)
                .map(|row| row.currency.clone())
                .filter(|currency| !currency.is_empty()),
            user_id: identity.user_id,
            email: identity.email,
            plan: identity.plan,
        }
    }
}
