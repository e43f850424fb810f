//! Multi-call cap workflows
//!
//! Each workflow issues its API calls one at a time and reports a result per
//! item, so one failing user does not abort the rest of a batch.

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    caps::calculator::ProposedCap,
    error::ApiResult,
    windsurf::{CapUpdate, TeamUsersFilter, UsageCapApi, UsageTarget},
};

/// Add-on cap of one user, or why it could not be read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserCapStatus {
    pub email: String,
    /// `None` means the user falls back to the team default
    pub add_on_credit_cap: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UserCapStatus {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// A user whose own cap differs from the team cap
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomCapUser {
    pub name: String,
    pub email: String,
    pub user_cap: i64,
    pub team_cap: Option<i64>,
}

/// Result of scanning the team for custom caps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomCapReport {
    pub team_cap: Option<i64>,
    pub users_checked: usize,
    pub lookup_failures: usize,
    pub users: Vec<CustomCapUser>,
}

/// Outcome for one email of a batch update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemOutcome {
    pub email: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of a batch update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<ItemOutcome>,
}

impl BatchOutcome {
    fn from_results(results: Vec<ItemOutcome>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }
}

/// State of one proposed cap after an apply run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "message")]
pub enum ApplyStatus {
    WouldSet,
    Set,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyResult {
    pub email: String,
    pub cap: i64,
    #[serde(flatten)]
    pub status: ApplyStatus,
}

/// Split pasted text into trimmed, non-empty emails
pub fn normalize_emails<I, S>(emails: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    emails
        .into_iter()
        .flat_map(|chunk| {
            chunk
                .as_ref()
                .lines()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Read the cap of each email in turn
#[instrument(skip(api, emails), fields(count = emails.len()))]
pub async fn check_users(api: &dyn UsageCapApi, emails: &[String]) -> Vec<UserCapStatus> {
    let mut statuses = Vec::with_capacity(emails.len());
    for email in emails {
        let status = match api.get_usage_config(&UsageTarget::user(email.as_str())).await {
            Ok(config) => UserCapStatus {
                email: email.clone(),
                add_on_credit_cap: config.add_on_credit_cap(),
                error: None,
            },
            Err(e) => UserCapStatus {
                email: email.clone(),
                add_on_credit_cap: None,
                error: Some(e.to_string()),
            },
        };
        statuses.push(status);
    }
    statuses
}

/// Find every user whose configured cap differs from the team cap
///
/// Fails if the team config or the user list cannot be fetched. Individual
/// lookup failures are logged and counted, not reported as custom caps.
#[instrument(skip(api))]
pub async fn find_custom_caps(api: &dyn UsageCapApi) -> ApiResult<CustomCapReport> {
    let team_cap = api
        .get_usage_config(&UsageTarget::TeamLevel)
        .await?
        .add_on_credit_cap();

    let users = api.list_team_users(&TeamUsersFilter::default()).await?;
    info!(team_cap = ?team_cap, users = users.len(), "Checking users for custom caps");

    let mut report = CustomCapReport {
        team_cap,
        users_checked: 0,
        lookup_failures: 0,
        users: Vec::new(),
    };

    for user in users {
        if user.email.is_empty() {
            continue;
        }
        report.users_checked += 1;

        match api.get_usage_config(&UsageTarget::user(user.email.as_str())).await {
            Ok(config) => {
                if let Some(user_cap) = config.add_on_credit_cap() {
                    if Some(user_cap) != team_cap {
                        report.users.push(CustomCapUser {
                            name: user.name,
                            email: user.email,
                            user_cap,
                            team_cap,
                        });
                    }
                }
            }
            Err(e) => {
                warn!(email = %user.email, error = %e, "Skipping user after failed lookup");
                report.lookup_failures += 1;
            }
        }
    }

    info!(custom = report.users.len(), "Custom cap scan complete");
    Ok(report)
}

/// Clear the individual cap of each email so it uses the team default
#[instrument(skip(api, emails), fields(count = emails.len()))]
pub async fn clear_user_caps(api: &dyn UsageCapApi, emails: &[String]) -> BatchOutcome {
    let mut results = Vec::with_capacity(emails.len());
    for email in emails {
        let outcome = match api
            .set_usage_config(CapUpdate::Clear, &UsageTarget::user(email.as_str()))
            .await
        {
            Ok(_) => ItemOutcome {
                email: email.clone(),
                success: true,
                error: None,
            },
            Err(e) => {
                warn!(email = %email, error = %e, "Failed to clear cap");
                ItemOutcome {
                    email: email.clone(),
                    success: false,
                    error: Some(e.to_string()),
                }
            }
        };
        results.push(outcome);
    }

    let outcome = BatchOutcome::from_results(results);
    info!(succeeded = outcome.succeeded, failed = outcome.failed, "Cleared user caps");
    outcome
}

/// Set each proposed cap, or only report what would be set on a dry run
#[instrument(skip(api, proposals), fields(count = proposals.len()))]
pub async fn apply_caps(
    api: &dyn UsageCapApi,
    proposals: &[ProposedCap],
    dry_run: bool,
) -> Vec<ApplyResult> {
    let mut results = Vec::with_capacity(proposals.len());
    for proposal in proposals {
        let status = if dry_run {
            ApplyStatus::WouldSet
        } else {
            match api
                .set_usage_config(
                    CapUpdate::Set(proposal.proposed_cap),
                    &UsageTarget::user(proposal.email.as_str()),
                )
                .await
            {
                Ok(_) => ApplyStatus::Set,
                Err(e) => {
                    warn!(email = %proposal.email, error = %e, "Failed to set cap");
                    ApplyStatus::Failed(e.to_string())
                }
            }
        };

        results.push(ApplyResult {
            email: proposal.email.clone(),
            cap: proposal.proposed_cap,
            status,
        });
    }
    results
}
