//! Raw usage config endpoints
//!
//! Accept the keyword-style fields of the Windsurf API directly and return
//! its response untouched.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    windsurf::{SetUsageConfigParams, TargetParams, UsageConfig},
    AppState,
};

/// Read a usage config for `team_level`, `group_id` or `user_email`
pub async fn get_usage_config(
    State(state): State<Arc<AppState>>,
    Json(params): Json<TargetParams>,
) -> AppResult<Json<UsageConfig>> {
    let target = params.into_target()?;
    let config = state.api.get_usage_config(&target).await?;
    Ok(Json(config))
}

/// Set or clear a cap given keyword-style update and target fields
pub async fn set_usage_config(
    State(state): State<Arc<AppState>>,
    Json(params): Json<SetUsageConfigParams>,
) -> AppResult<Json<UsageConfig>> {
    let (update, target) = params.into_parts()?;
    let config = state.api.set_usage_config(update, &target).await?;
    Ok(Json(config))
}
