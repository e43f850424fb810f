//! Windsurf API data models
//!
//! Domain types for usage config requests plus the wire payloads they are
//! flattened into. Optional keys are omitted rather than sent as null.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};

/// Response key holding the add-on credit cap
pub const ADD_ON_CREDIT_CAP_KEY: &str = "addOnCreditCap";

const TARGET_REQUIRED: &str = "Must specify one of: team_level, group_id, or user_email";
const TARGET_AMBIGUOUS: &str = "Must specify only one of: team_level, group_id, or user_email";
const UPDATE_REQUIRED: &str =
    "Must specify either set_add_on_credit_cap or clear_add_on_credit_cap";
const UPDATE_AMBIGUOUS: &str =
    "Cannot specify both set_add_on_credit_cap and clear_add_on_credit_cap";

/// Scope a usage config is read from or written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageTarget {
    TeamLevel,
    Group(String),
    User(String),
}

impl UsageTarget {
    pub fn group(id: impl Into<String>) -> Self {
        UsageTarget::Group(id.into())
    }

    pub fn user(email: impl Into<String>) -> Self {
        UsageTarget::User(email.into())
    }

    /// Short label for logs and metrics
    pub fn scope(&self) -> &'static str {
        match self {
            UsageTarget::TeamLevel => "team",
            UsageTarget::Group(_) => "group",
            UsageTarget::User(_) => "user",
        }
    }
}

/// Change applied to the add-on credit cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapUpdate {
    Set(i64),
    Clear,
}

/// Usage configuration returned by the API, kept opaque
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageConfig(pub Map<String, Value>);

impl UsageConfig {
    /// The add-on credit cap, if one is configured at this scope
    pub fn add_on_credit_cap(&self) -> Option<i64> {
        let value = self.0.get(ADD_ON_CREDIT_CAP_KEY)?;
        // int64 fields may arrive as JSON strings
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f as i64))
            .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// One row of the team user listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamUserRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    /// Remaining per-user statistics, passed through untouched
    #[serde(flatten)]
    pub stats: Map<String, Value>,
}

/// Optional filters for the team user listing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TeamUsersFilter {
    pub group_name: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl TeamUsersFilter {
    pub fn group(mut self, name: impl Into<String>) -> Self {
        self.group_name = Some(name.into());
        self
    }

    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }
}

// ===========================================
// Loose parameters (keyword-style inputs)
// ===========================================

/// Target given as independent optional fields
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TargetParams {
    #[serde(default)]
    pub team_level: bool,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

impl TargetParams {
    /// Convert into a target, requiring exactly one populated field
    pub fn into_target(self) -> ApiResult<UsageTarget> {
        let group = non_blank(self.group_id);
        let user = non_blank(self.user_email);

        match (self.team_level, group, user) {
            (true, None, None) => Ok(UsageTarget::TeamLevel),
            (false, Some(id), None) => Ok(UsageTarget::Group(id)),
            (false, None, Some(email)) => Ok(UsageTarget::User(email)),
            (false, None, None) => Err(ApiError::invalid(TARGET_REQUIRED)),
            _ => Err(ApiError::invalid(TARGET_AMBIGUOUS)),
        }
    }
}

/// Cap update given as independent optional fields
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CapUpdateParams {
    #[serde(default)]
    pub set_add_on_credit_cap: Option<i64>,
    #[serde(default)]
    pub clear_add_on_credit_cap: bool,
}

impl CapUpdateParams {
    pub fn into_update(self) -> ApiResult<CapUpdate> {
        match (self.set_add_on_credit_cap, self.clear_add_on_credit_cap) {
            (Some(_), true) => Err(ApiError::invalid(UPDATE_AMBIGUOUS)),
            (Some(cap), false) => Ok(CapUpdate::Set(cap)),
            (None, true) => Ok(CapUpdate::Clear),
            (None, false) => Err(ApiError::invalid(UPDATE_REQUIRED)),
        }
    }
}

/// Full set request in keyword form
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SetUsageConfigParams {
    #[serde(flatten)]
    pub update: CapUpdateParams,
    #[serde(flatten)]
    pub target: TargetParams,
}

impl SetUsageConfigParams {
    /// Validate the update shape first, then the target
    pub fn into_parts(self) -> ApiResult<(CapUpdate, UsageTarget)> {
        let update = self.update.into_update()?;
        let target = self.target.into_target()?;
        Ok((update, target))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ===========================================
// Wire payloads
// ===========================================

#[derive(Debug, Serialize)]
pub(crate) struct TargetFields<'a> {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    team_level: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    group_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_email: Option<&'a str>,
}

impl<'a> From<&'a UsageTarget> for TargetFields<'a> {
    fn from(target: &'a UsageTarget) -> Self {
        let mut fields = TargetFields {
            team_level: false,
            group_id: None,
            user_email: None,
        };
        match target {
            UsageTarget::TeamLevel => fields.team_level = true,
            UsageTarget::Group(id) => fields.group_id = Some(id),
            UsageTarget::User(email) => fields.user_email = Some(email),
        }
        fields
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateFields {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    clear_add_on_credit_cap: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    set_add_on_credit_cap: Option<i64>,
}

impl From<CapUpdate> for UpdateFields {
    fn from(update: CapUpdate) -> Self {
        match update {
            CapUpdate::Set(cap) => UpdateFields {
                clear_add_on_credit_cap: false,
                set_add_on_credit_cap: Some(cap),
            },
            CapUpdate::Clear => UpdateFields {
                clear_add_on_credit_cap: true,
                set_add_on_credit_cap: None,
            },
        }
    }
}

/// Body of `GetUsageConfig`
#[derive(Debug, Serialize)]
pub(crate) struct GetUsageConfigRequest<'a> {
    pub service_key: &'a str,
    #[serde(flatten)]
    pub target: TargetFields<'a>,
}

/// Body of `UsageConfig`
#[derive(Debug, Serialize)]
pub(crate) struct SetUsageConfigRequest<'a> {
    pub service_key: &'a str,
    #[serde(flatten)]
    pub update: UpdateFields,
    #[serde(flatten)]
    pub target: TargetFields<'a>,
}

/// Body of `UserPageAnalytics`
#[derive(Debug, Serialize)]
pub(crate) struct UserPageAnalyticsRequest<'a> {
    pub service_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<String>,
}

impl<'a> UserPageAnalyticsRequest<'a> {
    pub fn new(service_key: &'a str, filter: &'a TeamUsersFilter) -> Self {
        Self {
            service_key,
            group_name: filter
                .group_name
                .as_deref()
                .map(str::trim)
                .filter(|g| !g.is_empty()),
            start_timestamp: filter.start_time.map(|t| t.to_rfc3339()),
            end_timestamp: filter.end_time.map(|t| t.to_rfc3339()),
        }
    }
}

/// Response of `UserPageAnalytics`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct UserPageAnalyticsResponse {
    #[serde(default, rename = "userTableStats", deserialize_with = "null_as_default")]
    pub user_table_stats: Vec<TeamUserRecord>,
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
