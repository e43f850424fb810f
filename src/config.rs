//! Configuration management for Credit Throttle
//!
//! Configuration is loaded from environment variables once at startup and
//! passed explicitly to the client and routes.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::error::ApiError;

/// Production Windsurf API host
pub const DEFAULT_API_BASE_URL: &str = "https://server.codeium.com";

/// Defaults used when proposing and setting caps
#[derive(Debug, Clone, PartialEq)]
pub struct CapDefaults {
    /// Credits every user gets before add-on credits apply
    pub base_credits: i64,
    /// Suggested organization-wide add-on cap
    pub default_org_addon_cap: i64,
    /// Bulk import: only users above this usage get a cap
    pub threshold: i64,
    /// Bulk import: credits added on top of current add-on usage
    pub buffer: i64,
    /// Clamp negative proposed caps to zero
    pub clamp_negative_caps: bool,
}

impl Default for CapDefaults {
    fn default() -> Self {
        Self {
            base_credits: 500,
            default_org_addon_cap: 1000,
            threshold: 1000,
            buffer: 500,
            clamp_negative_caps: false,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind the admin API to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Windsurf API base URL
    pub api_base_url: String,
    /// Windsurf service key
    pub service_key: String,

    /// Timeout for usage config reads and writes
    pub request_timeout: Duration,
    /// Timeout for the team user listing
    pub list_timeout: Duration,

    pub caps: CapDefaults,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service_key = lookup("WINDSURF_SERVICE_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ApiError::MissingCredential)?;

        let api_base_url = lookup("WINDSURF_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let defaults = CapDefaults::default();

        Ok(Self {
            host: lookup("THROTTLE_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "THROTTLE_PORT", 8501)?,

            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            service_key,

            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "WINDSURF_REQUEST_TIMEOUT_SECS",
                30,
            )?),
            list_timeout: Duration::from_secs(parse_or(
                &lookup,
                "WINDSURF_LIST_TIMEOUT_SECS",
                60,
            )?),

            caps: CapDefaults {
                base_credits: parse_or(&lookup, "THROTTLE_BASE_CREDITS", defaults.base_credits)?,
                default_org_addon_cap: parse_or(
                    &lookup,
                    "THROTTLE_DEFAULT_ORG_CAP",
                    defaults.default_org_addon_cap,
                )?,
                threshold: parse_or(&lookup, "THROTTLE_CAP_THRESHOLD", defaults.threshold)?,
                buffer: parse_or(&lookup, "THROTTLE_CAP_BUFFER", defaults.buffer)?,
                clamp_negative_caps: lookup("THROTTLE_CLAMP_NEGATIVE_CAPS")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(defaults.clamp_negative_caps),
            },
        })
    }

    /// Config pointing at a given API with default settings otherwise
    pub fn for_api(api_base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            request_timeout: Duration::from_secs(30),
            list_timeout: Duration::from_secs(60),
            caps: CapDefaults::default(),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}", key)),
        None => Ok(default),
    }
}
