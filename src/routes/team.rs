//! Team-level cap endpoints

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    windsurf::{CapUpdate, UsageConfig, UsageTarget},
    AppState,
};

/// Largest cap accepted from the admin API
pub const MAX_CAP: i64 = 100_000;

/// Body of cap set requests
#[derive(Debug, Deserialize)]
pub struct CapBody {
    pub cap: i64,
}

impl CapBody {
    pub fn validated(&self) -> AppResult<i64> {
        if (0..=MAX_CAP).contains(&self.cap) {
            Ok(self.cap)
        } else {
            Err(AppError::BadRequest(format!(
                "Cap must be between 0 and {}",
                MAX_CAP
            )))
        }
    }
}

/// Team config with the cap pulled out
#[derive(Debug, Serialize)]
pub struct TeamConfigResponse {
    pub add_on_credit_cap: Option<i64>,
    pub base_credits: i64,
    /// Base plus add-on credits, when a cap is set
    pub total_credits: Option<i64>,
    pub config: UsageConfig,
}

/// Result of a set or clear call
#[derive(Debug, Serialize)]
pub struct CapChangeResponse {
    pub scope: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New cap, or `None` after a clear
    pub add_on_credit_cap: Option<i64>,
    pub response: UsageConfig,
}

impl CapChangeResponse {
    pub(crate) fn new(target: &UsageTarget, update: CapUpdate, response: UsageConfig) -> Self {
        Self {
            scope: target.scope(),
            email: match target {
                UsageTarget::User(email) => Some(email.clone()),
                _ => None,
            },
            add_on_credit_cap: match update {
                CapUpdate::Set(cap) => Some(cap),
                CapUpdate::Clear => None,
            },
            response,
        }
    }
}

/// Get the team-level configuration
pub async fn get_team_config(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<TeamConfigResponse>> {
    let config = state.api.get_usage_config(&UsageTarget::TeamLevel).await?;
    let cap = config.add_on_credit_cap();
    let base_credits = state.config.caps.base_credits;

    Ok(Json(TeamConfigResponse {
        add_on_credit_cap: cap,
        base_credits,
        total_credits: cap.map(|c| base_credits + c),
        config,
    }))
}

/// Set the organization-wide add-on cap
pub async fn set_team_cap(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CapBody>,
) -> AppResult<Json<CapChangeResponse>> {
    let update = CapUpdate::Set(body.validated()?);
    let target = UsageTarget::TeamLevel;

    let response = state.api.set_usage_config(update, &target).await?;
    info!(cap = body.cap, "Team cap set");
    Ok(Json(CapChangeResponse::new(&target, update, response)))
}

/// Clear the organization-wide add-on cap
pub async fn clear_team_cap(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<CapChangeResponse>> {
    let target = UsageTarget::TeamLevel;

    let response = state.api.set_usage_config(CapUpdate::Clear, &target).await?;
    info!("Team cap cleared");
    Ok(Json(CapChangeResponse::new(&target, CapUpdate::Clear, response)))
}
