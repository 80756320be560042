use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::register::Registration;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "http://20.244.56.144/test";
pub const DEFAULT_REGISTER_URL: &str = "http://20.244.56.144/test/register";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("missing required variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub listen_addr: SocketAddr,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationConfig {
    pub url: String,
    pub payload: Registration,
}

/// Loads `.env` if present. A missing file is not an error.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr = lookup("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = raw_addr.parse().map_err(|_| ConfigError::Invalid {
            key: "LISTEN_ADDR",
            value: raw_addr.clone(),
        })?;

        let base_url = lookup("UPSTREAM_BASE_URL")
            .unwrap_or_else(|| DEFAULT_UPSTREAM_BASE_URL.to_string());

        let timeout = match lookup("UPSTREAM_TIMEOUT_SECS") {
            None => None,
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    key: "UPSTREAM_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
                Some(Duration::from_secs(secs))
            }
        };

        Ok(Self {
            listen_addr,
            upstream: UpstreamConfig { base_url, timeout },
        })
    }
}

impl RegistrationConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("REGISTER_URL").unwrap_or_else(|| DEFAULT_REGISTER_URL.to_string());
        let payload = Registration {
            company_name: required(&lookup, "COMPANY_NAME")?,
            owner_name: required(&lookup, "OWNER_NAME")?,
            roll_no: required(&lookup, "ROLL_NO")?,
            owner_email: required(&lookup, "OWNER_EMAIL")?,
            access_code: required(&lookup, "ACCESS_CODE")?,
        };
        Ok(Self { url, payload })
    }
}
