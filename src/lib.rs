//! Credit Throttle - admin backend for Windsurf add-on credit caps
//!
//! Wraps the Windsurf usage config API, proposes caps from usage exports
//! and exposes the cap management workflows over a small JSON API.

pub mod caps;
pub mod config;
pub mod error;
pub mod routes;
pub mod windsurf;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

pub use crate::config::Config;
pub use crate::error::{ApiError, AppError};
pub use crate::windsurf::{UsageCapApi, UsageCapClient};

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub start_time: Instant,
    /// Billing API used by every handler
    pub api: Arc<dyn UsageCapApi>,
}

impl AppState {
    /// Create application state backed by the live Windsurf API
    pub fn new(config: Config) -> Result<Self> {
        // Per-request timeouts are set by the client for each operation
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("credit-throttle/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let client = UsageCapClient::new(http_client, &config)?;

        Ok(Self::with_api(config, Arc::new(client)))
    }

    /// Create application state around any API implementation
    pub fn with_api(config: Config, api: Arc<dyn UsageCapApi>) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            api,
        }
    }
}
