//! Usage cap API abstraction
//!
//! Workflows and routes talk to this trait so they can run against a stub
//! instead of the live billing API.

use async_trait::async_trait;

use crate::{
    error::ApiResult,
    windsurf::models::{CapUpdate, TeamUserRecord, TeamUsersFilter, UsageConfig, UsageTarget},
};

/// Operations offered by the usage billing API
#[async_trait]
pub trait UsageCapApi: Send + Sync {
    /// Read the usage configuration at one scope
    async fn get_usage_config(&self, target: &UsageTarget) -> ApiResult<UsageConfig>;

    /// List team users, optionally narrowed to a group and time window
    async fn list_team_users(&self, filter: &TeamUsersFilter) -> ApiResult<Vec<TeamUserRecord>>;

    /// Set or clear the add-on credit cap at one scope
    async fn set_usage_config(
        &self,
        update: CapUpdate,
        target: &UsageTarget,
    ) -> ApiResult<UsageConfig>;
}
