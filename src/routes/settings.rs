//! Configured cap defaults

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{routes::team::MAX_CAP, AppState};

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub base_credits: i64,
    pub default_org_addon_cap: i64,
    pub default_threshold: i64,
    pub default_buffer: i64,
    pub clamp_negative_caps: bool,
    pub max_cap: i64,
}

pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<SettingsResponse> {
    let caps = &state.config.caps;
    Json(SettingsResponse {
        base_credits: caps.base_credits,
        default_org_addon_cap: caps.default_org_addon_cap,
        default_threshold: caps.threshold,
        default_buffer: caps.buffer,
        clamp_negative_caps: caps.clamp_negative_caps,
        max_cap: MAX_CAP,
    })
}
