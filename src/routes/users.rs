//! User-level cap endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    caps::workflows::{self, normalize_emails, BatchOutcome, CustomCapReport, UserCapStatus},
    error::{AppError, AppResult},
    routes::team::{CapBody, CapChangeResponse},
    windsurf::{CapUpdate, TeamUserRecord, TeamUsersFilter, UsageTarget},
    AppState,
};

/// A list of emails, each entry may hold several newline-separated addresses
#[derive(Debug, Deserialize)]
pub struct EmailsBody {
    pub emails: Vec<String>,
}

impl EmailsBody {
    fn normalized(&self) -> AppResult<Vec<String>> {
        let emails = normalize_emails(&self.emails);
        if emails.is_empty() {
            return Err(AppError::BadRequest(
                "Please enter at least one email address".to_string(),
            ));
        }
        Ok(emails)
    }
}

#[derive(Debug, Serialize)]
pub struct TeamUsersResponse {
    pub count: usize,
    pub users: Vec<TeamUserRecord>,
}

/// List team users, optionally filtered by group and time window
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<TeamUsersFilter>,
) -> AppResult<Json<TeamUsersResponse>> {
    let users = state.api.list_team_users(&filter).await?;
    Ok(Json(TeamUsersResponse {
        count: users.len(),
        users,
    }))
}

/// Look up the cap of each given email
pub async fn check_users(
    State(state): State<Arc<AppState>>,
    Json(body): Json<EmailsBody>,
) -> AppResult<Json<Vec<UserCapStatus>>> {
    let emails = body.normalized()?;
    Ok(Json(workflows::check_users(state.api.as_ref(), &emails).await))
}

/// Find users whose cap differs from the team default
pub async fn custom_caps(State(state): State<Arc<AppState>>) -> AppResult<Json<CustomCapReport>> {
    let report = workflows::find_custom_caps(state.api.as_ref()).await?;
    Ok(Json(report))
}

/// Reset the given users to the team default
pub async fn clear_custom_caps(
    State(state): State<Arc<AppState>>,
    Json(body): Json<EmailsBody>,
) -> AppResult<Json<BatchOutcome>> {
    let emails = body.normalized()?;
    Ok(Json(workflows::clear_user_caps(state.api.as_ref(), &emails).await))
}

/// Set the add-on cap of one user
pub async fn set_user_cap(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
    Json(body): Json<CapBody>,
) -> AppResult<Json<CapChangeResponse>> {
    let update = CapUpdate::Set(body.validated()?);
    let target = user_target(email)?;

    let response = state.api.set_usage_config(update, &target).await?;
    info!(scope = target.scope(), cap = body.cap, "User cap set");
    Ok(Json(CapChangeResponse::new(&target, update, response)))
}

/// Clear the add-on cap of one user
pub async fn clear_user_cap(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> AppResult<Json<CapChangeResponse>> {
    let target = user_target(email)?;

    let response = state.api.set_usage_config(CapUpdate::Clear, &target).await?;
    info!(scope = target.scope(), "User cap cleared");
    Ok(Json(CapChangeResponse::new(&target, CapUpdate::Clear, response)))
}

fn user_target(email: String) -> AppResult<UsageTarget> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::BadRequest(
            "Please enter an email address".to_string(),
        ));
    }
    Ok(UsageTarget::user(email))
}
