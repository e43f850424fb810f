//! Windsurf API client
//!
//! HTTP client for the usage config endpoints of the Windsurf API. Every call
//! is a single POST with the service key in the body; there is no retry.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, instrument};

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    routes::metrics::record_api_call,
    windsurf::{
        api::UsageCapApi,
        models::{
            CapUpdate, GetUsageConfigRequest, SetUsageConfigRequest, TeamUserRecord,
            TeamUsersFilter, UsageConfig, UsageTarget, UserPageAnalyticsRequest,
            UserPageAnalyticsResponse,
        },
    },
};

/// The three endpoints the client calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetUsageConfig,
    ListTeamUsers,
    SetUsageConfig,
}

impl Operation {
    pub fn path(self) -> &'static str {
        match self {
            Operation::GetUsageConfig => "/api/v1/GetUsageConfig",
            Operation::ListTeamUsers => "/api/v1/UserPageAnalytics",
            Operation::SetUsageConfig => "/api/v1/UsageConfig",
        }
    }

    /// Phrase used in transport error messages
    pub fn describe(self) -> &'static str {
        match self {
            Operation::GetUsageConfig => "getting usage config",
            Operation::ListTeamUsers => "getting team users",
            Operation::SetUsageConfig => "setting usage config",
        }
    }

    /// Metrics label
    pub fn name(self) -> &'static str {
        match self {
            Operation::GetUsageConfig => "get_usage_config",
            Operation::ListTeamUsers => "list_team_users",
            Operation::SetUsageConfig => "set_usage_config",
        }
    }
}

/// Windsurf usage cap client
pub struct UsageCapClient {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    request_timeout: Duration,
    list_timeout: Duration,
}

impl UsageCapClient {
    /// Create a new client, failing if no service key is configured
    pub fn new(client: reqwest::Client, config: &Config) -> ApiResult<Self> {
        if config.service_key.trim().is_empty() {
            return Err(ApiError::MissingCredential);
        }

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
            request_timeout: config.request_timeout,
            list_timeout: config.list_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn timeout_for(&self, operation: Operation) -> Duration {
        match operation {
            Operation::ListTeamUsers => self.list_timeout,
            _ => self.request_timeout,
        }
    }

    /// POST a JSON body and decode the JSON response
    async fn post<B, R>(&self, operation: Operation, body: &B) -> ApiResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let started = Instant::now();
        let result = self.send(operation, body).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(ApiError::Http { .. }) => "http_error",
            Err(ApiError::Decode { .. }) => "decode_error",
            Err(_) => "transport_error",
        };
        record_api_call(operation.name(), outcome, started.elapsed().as_secs_f64());

        result
    }

    async fn send<B, R>(&self, operation: Operation, body: &B) -> ApiResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, operation.path());
        debug!(url = %url, "Sending request to Windsurf");

        let response = self
            .client
            .post(&url)
            .headers(json_headers())
            .timeout(self.timeout_for(operation))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send request to Windsurf");
                ApiError::transport(operation.describe(), &e)
            })?;

        let status = response.status();
        debug!(status = %status, "Windsurf response status");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(status = %status, body = %text, "Windsurf request failed");
            return Err(ApiError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::transport(operation.describe(), &e))?;

        serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, body = %text, "Failed to parse Windsurf response");
            ApiError::Decode {
                operation: operation.describe(),
                detail: e.to_string(),
            }
        })
    }
}

#[async_trait]
impl UsageCapApi for UsageCapClient {
    #[instrument(skip(self), fields(scope = target.scope()))]
    async fn get_usage_config(&self, target: &UsageTarget) -> ApiResult<UsageConfig> {
        let body = GetUsageConfigRequest {
            service_key: &self.service_key,
            target: target.into(),
        };

        let config: UsageConfig = self.post(Operation::GetUsageConfig, &body).await?;
        debug!(cap = ?config.add_on_credit_cap(), "Fetched usage config");
        Ok(config)
    }

    #[instrument(skip(self))]
    async fn list_team_users(&self, filter: &TeamUsersFilter) -> ApiResult<Vec<TeamUserRecord>> {
        let body = UserPageAnalyticsRequest::new(&self.service_key, filter);

        let response: UserPageAnalyticsResponse = self.post(Operation::ListTeamUsers, &body).await?;
        debug!(users = response.user_table_stats.len(), "Fetched team users");
        Ok(response.user_table_stats)
    }

    #[instrument(skip(self), fields(scope = target.scope()))]
    async fn set_usage_config(
        &self,
        update: CapUpdate,
        target: &UsageTarget,
    ) -> ApiResult<UsageConfig> {
        let body = SetUsageConfigRequest {
            service_key: &self.service_key,
            update: update.into(),
            target: target.into(),
        };

        let config: UsageConfig = self.post(Operation::SetUsageConfig, &body).await?;
        debug!("Updated usage config");
        Ok(config)
    }
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}
