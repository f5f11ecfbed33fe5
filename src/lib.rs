use std::sync::Arc;

use config::Config;
use infrastructure::{BrokerageGateway, CredentialVerifier, ProfileStore};
use utils::TokenService;

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod utils;

/// Everything a handler needs. Built once at startup; the gateway
/// connection is released when the last clone is dropped after shutdown.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub tokens: TokenService,
    pub credentials: Arc<dyn CredentialVerifier>,
    pub profiles: Arc<dyn ProfileStore>,
    pub gateway: Arc<dyn BrokerageGateway>,
}
