use std::env;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_key: String,
    pub jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    pub access_token_expire_minutes: u32,
    pub ib_host: String,
    pub ib_port: u16,
    pub ib_client_id: i32,
    pub ib_order_ack_timeout_secs: u64,
    pub cors_origin: String,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, so tests don't
    /// have to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());

        let jwt_algorithm = parse_algorithm(&or_default("ALGORITHM", "HS256"))?;

        Ok(Config {
            supabase_url: required("SUPABASE_URL")?.trim_end_matches('/').to_string(),
            supabase_key: required("SUPABASE_KEY")?,
            jwt_secret: required("SECRET_KEY")?,
            jwt_algorithm,
            access_token_expire_minutes: parse_ttl_minutes(or_default(
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                "15",
            ))?,
            ib_host: or_default("IB_HOST", "127.0.0.1"),
            ib_port: parse("IB_PORT", or_default("IB_PORT", "4002"))?,
            ib_client_id: parse("IB_CLIENT_ID", or_default("IB_CLIENT_ID", "1"))?,
            ib_order_ack_timeout_secs: parse(
                "IB_ORDER_ACK_TIMEOUT_SECS",
                or_default("IB_ORDER_ACK_TIMEOUT_SECS", "2"),
            )?,
            cors_origin: or_default("CORS_ORIGIN", "http://localhost:5173"),
            server_host: or_default("SERVER_HOST", "0.0.0.0"),
            server_port: parse("SERVER_PORT", or_default("SERVER_PORT", "8000"))?,
            api_base_uri: normalize_base_uri(&or_default("API_BASE_URI", "/api")),
        })
    }

    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.access_token_expire_minutes))
    }

    pub fn ib_order_ack_timeout(&self) -> Duration {
        Duration::from_secs(self.ib_order_ack_timeout_secs)
    }

    pub fn ib_address(&self) -> String {
        format!("{}:{}", self.ib_host, self.ib_port)
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

// A zero TTL would hand out tokens that are already expired.
fn parse_ttl_minutes(value: String) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(minutes) if minutes > 0 => Ok(minutes),
        _ => Err(ConfigError::Invalid {
            key: "ACCESS_TOKEN_EXPIRE_MINUTES",
            value,
        }),
    }
}

// Only symmetric algorithms make sense for a single shared secret.
fn parse_algorithm(value: &str) -> Result<Algorithm, ConfigError> {
    match value.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(ConfigError::Invalid {
            key: "ALGORITHM",
            value: value.to_string(),
        }),
    }
}

fn normalize_base_uri(value: &str) -> String {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("SUPABASE_URL", "https://project.supabase.co/"),
        ("SUPABASE_KEY", "anon-key"),
        ("SECRET_KEY", "secret"),
    ];

    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.supabase_url, "https://project.supabase.co");
        assert_eq!(config.jwt_algorithm, Algorithm::HS256);
        assert_eq!(config.access_token_ttl(), chrono::Duration::minutes(15));
        assert_eq!(config.ib_address(), "127.0.0.1:4002");
        assert_eq!(config.api_base_uri, "/api");
        assert_eq!(config.cors_origin, "http://localhost:5173");
    }

    #[test]
    fn missing_secret_is_reported_by_name() {
        let err = Config::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SECRET_KEY")));
    }

    #[test]
    fn rejects_asymmetric_algorithm() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ALGORITHM", "RS256"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "ALGORITHM", .. }));
    }

    #[test]
    fn parses_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("ALGORITHM", "hs512"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "30"),
            ("IB_PORT", "7497"),
            ("API_BASE_URI", "v1/"),
        ]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.jwt_algorithm, Algorithm::HS512);
        assert_eq!(config.access_token_expire_minutes, 30);
        assert_eq!(config.ib_port, 7497);
        assert_eq!(config.api_base_uri, "/v1");
    }

    #[test]
    fn rejects_out_of_range_token_ttl() {
        for value in ["18446744073709551615", "999999999999999", "0", "-5", "soon"] {
            let mut pairs = REQUIRED.to_vec();
            pairs.push(("ACCESS_TOKEN_EXPIRE_MINUTES", value));
            let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: "ACCESS_TOKEN_EXPIRE_MINUTES", .. }),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn largest_token_ttl_is_usable() {
        let max = u32::MAX.to_string();
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ACCESS_TOKEN_EXPIRE_MINUTES", max.as_str()));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(
            config.access_token_ttl(),
            chrono::Duration::minutes(i64::from(u32::MAX))
        );
    }

    #[test]
    fn rejects_non_numeric_port() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SERVER_PORT", "http"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SERVER_PORT", .. }));
    }
}
