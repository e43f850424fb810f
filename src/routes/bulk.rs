//! CSV bulk cap endpoints
//!
//! The request body is the raw CSV text. Threshold and buffer come from the
//! query string and fall back to the configured defaults.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    caps::{
        parse_usage_csv, propose_caps,
        workflows::{apply_caps, ApplyResult, ApplyStatus},
        CapPolicy, ProposedCap,
    },
    error::{AppError, AppResult},
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct BulkParams {
    pub threshold: Option<i64>,
    pub buffer: Option<i64>,
    pub clamp_negative: Option<bool>,
    /// Defaults to true; caps are only written when explicitly false
    pub dry_run: Option<bool>,
}

impl BulkParams {
    fn policy(&self, state: &AppState) -> AppResult<CapPolicy> {
        let defaults = CapPolicy::from(&state.config.caps);
        let policy = CapPolicy {
            base_credits: defaults.base_credits,
            threshold: self.threshold.unwrap_or(defaults.threshold),
            buffer: self.buffer.unwrap_or(defaults.buffer),
            clamp_negative: self.clamp_negative.unwrap_or(defaults.clamp_negative),
        };
        if policy.threshold < 0 || policy.buffer < 0 {
            return Err(AppError::BadRequest(
                "threshold and buffer must not be negative".to_string(),
            ));
        }
        Ok(policy)
    }
}

#[derive(Debug, Serialize)]
pub struct PolicySummary {
    pub base_credits: i64,
    pub threshold: i64,
    pub buffer: i64,
    pub clamp_negative: bool,
}

impl From<&CapPolicy> for PolicySummary {
    fn from(policy: &CapPolicy) -> Self {
        Self {
            base_credits: policy.base_credits,
            threshold: policy.threshold,
            buffer: policy.buffer,
            clamp_negative: policy.clamp_negative,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BulkPreviewResponse {
    pub policy: PolicySummary,
    pub rows_read: usize,
    pub negative_caps: usize,
    pub proposals: Vec<ProposedCap>,
}

#[derive(Debug, Serialize)]
pub struct BulkApplyResponse {
    pub dry_run: bool,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<ApplyResult>,
}

fn preview(policy: &CapPolicy, csv: &str) -> AppResult<BulkPreviewResponse> {
    let rows = parse_usage_csv(csv.as_bytes())?;
    let proposals = propose_caps(&rows, policy);

    let negative_caps = proposals.iter().filter(|p| p.is_negative()).count();
    if negative_caps > 0 {
        warn!(negative_caps, "Some proposed caps are negative");
    }

    Ok(BulkPreviewResponse {
        policy: policy.into(),
        rows_read: rows.len(),
        negative_caps,
        proposals,
    })
}

/// Show the caps a CSV would produce
pub async fn preview_caps(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BulkParams>,
    body: String,
) -> AppResult<Json<BulkPreviewResponse>> {
    let policy = params.policy(&state)?;
    Ok(Json(preview(&policy, &body)?))
}

/// Apply the caps a CSV produces, one user at a time
pub async fn apply_bulk_caps(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BulkParams>,
    body: String,
) -> AppResult<Json<BulkApplyResponse>> {
    let policy = params.policy(&state)?;
    let dry_run = params.dry_run.unwrap_or(true);
    let plan = preview(&policy, &body)?;

    let results = apply_caps(state.api.as_ref(), &plan.proposals, dry_run).await;
    let failed = results
        .iter()
        .filter(|r| matches!(r.status, ApplyStatus::Failed(_)))
        .count();
    let succeeded = results.len() - failed;

    info!(dry_run, succeeded, failed, "Bulk cap run complete");
    Ok(Json(BulkApplyResponse {
        dry_run,
        succeeded,
        failed,
        results,
    }))
}
