use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{CredentialVerifier, Profile, ProfileStore, VerifiedUser};
use crate::config::Config;
use crate::error::UpstreamError;

/// Talks to the Supabase auth and PostgREST endpoints over HTTP.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct PasswordGrantResponse {
    user: Option<AuthUser>,
}

#[derive(Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
}

impl SupabaseClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.supabase_url, &config.supabase_key)
    }
}

#[async_trait]
impl CredentialVerifier for SupabaseClient {
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<VerifiedUser>, UpstreamError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&PasswordGrant { email, password })
            .send()
            .await
            .map_err(|e| UpstreamError::Identity(e.to_string()))?;

        let status = response.status();
        if matches!(
            status,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::UNPROCESSABLE_ENTITY
        ) {
            tracing::info!(%status, "Identity provider rejected credentials");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(UpstreamError::Identity(format!("unexpected status {status}")));
        }

        let body: PasswordGrantResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Identity(e.to_string()))?;

        Ok(body.user.map(|user| VerifiedUser {
            email: user.email.unwrap_or_else(|| email.to_string()),
            id: user.id,
        }))
    }
}

#[async_trait]
impl ProfileStore for SupabaseClient {
    async fn find_profile(&self, user_id: &str) -> Result<Option<Profile>, UpstreamError> {
        let url = format!("{}/rest/v1/profiles", self.base_url);
        let id_filter = format!("eq.{user_id}");
        let response = self
            .http
            .get(&url)
            .query(&[("select", "id,plan"), ("id", id_filter.as_str())])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| UpstreamError::ProfileStore(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::ProfileStore(format!(
                "unexpected status {status}"
            )));
        }

        let rows: Vec<Profile> = response
            .json()
            .await
            .map_err(|e| UpstreamError::ProfileStore(e.to_string()))?;

        Ok(rows.into_iter().next())
    }
}
