//! Clients for the services this backend delegates to: the hosted identity
//! provider, the profile store, and the brokerage gateway.

pub mod brokerage;
pub mod supabase;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::UpstreamError;

pub use brokerage::{BrokerageGateway, IbGateway};
pub use supabase::SupabaseClient;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifiedUser {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    pub id: String,
    pub plan: Option<String>,
}

#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// `Ok(None)` means the provider rejected the email/password pair.
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<VerifiedUser>, UpstreamError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_profile(&self, user_id: &str) -> Result<Option<Profile>, UpstreamError>;
}
