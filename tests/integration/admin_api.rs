//! Admin API tests
//!
//! Drive the router end to end with `axum-test`, backed by a mock Windsurf API.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{constants::*, test_server};
use crate::mocks::windsurf::*;

// =============================================================================
// Raw usage config
// =============================================================================

#[tokio::test]
async fn test_get_without_target_makes_no_call() {
    let mock = MockWindsurfServer::start().await;
    let server = test_server(&mock.uri());

    let response = server.post("/api/usage-config/get").json(&json!({})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(
        body["error"]["message"],
        "Must specify one of: team_level, group_id, or user_email"
    );
    assert!(mock.received_requests().await.is_empty());
}

#[tokio::test]
async fn test_get_with_two_targets_rejected() {
    let mock = MockWindsurfServer::start().await;
    let server = test_server(&mock.uri());

    let response = server
        .post("/api/usage-config/get")
        .json(&json!({ "team_level": true, "user_email": USER_A }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(mock.received_requests().await.is_empty());
}

#[tokio::test]
async fn test_get_returns_config_untouched() {
    let mock = MockWindsurfServer::start().await;
    mock.mock_usage_config(
        json!({ "group_id": "grp-1" }),
        json!({ "addOnCreditCap": 250, "extra": "kept" }),
    )
    .await;
    let server = test_server(&mock.uri());

    let response = server
        .post("/api/usage-config/get")
        .json(&json!({ "group_id": "grp-1" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({ "addOnCreditCap": 250, "extra": "kept" }));
}

#[tokio::test]
async fn test_set_without_update_checks_update_first() {
    let mock = MockWindsurfServer::start().await;
    let server = test_server(&mock.uri());

    let response = server
        .post("/api/usage-config/set")
        .json(&json!({ "team_level": true }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["error"]["message"],
        "Must specify either set_add_on_credit_cap or clear_add_on_credit_cap"
    );
    assert!(mock.received_requests().await.is_empty());
}

#[tokio::test]
async fn test_set_forwards_keyword_fields() {
    let mock = MockWindsurfServer::start().await;
    mock.mock_set_usage_config_success().await;
    let server = test_server(&mock.uri());

    server
        .post("/api/usage-config/set")
        .json(&json!({ "set_add_on_credit_cap": 900, "group_id": "grp-1" }))
        .await
        .assert_status_ok();

    assert_eq!(
        mock.bodies_for(SET_USAGE_CONFIG_PATH).await,
        vec![json!({
            "service_key": TEST_SERVICE_KEY,
            "set_add_on_credit_cap": 900,
            "group_id": "grp-1"
        })]
    );
}

// =============================================================================
// Team cap
// =============================================================================

#[tokio::test]
async fn test_team_config_includes_total() {
    let mock = MockWindsurfServer::start().await;
    mock.mock_team_config(Some(1000)).await;
    let server = test_server(&mock.uri());

    let response = server.get("/api/team/config").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["add_on_credit_cap"], 1000);
    assert_eq!(body["base_credits"], 500);
    assert_eq!(body["total_credits"], 1500);
}

#[tokio::test]
async fn test_team_config_without_cap() {
    let mock = MockWindsurfServer::start().await;
    mock.mock_team_config(None).await;
    let server = test_server(&mock.uri());

    let body: Value = server.get("/api/team/config").await.json();

    assert_eq!(body["add_on_credit_cap"], Value::Null);
    assert_eq!(body["total_credits"], Value::Null);
}

#[tokio::test]
async fn test_team_cap_out_of_range() {
    let mock = MockWindsurfServer::start().await;
    let server = test_server(&mock.uri());

    for cap in [-1, 100_001] {
        server
            .put("/api/team/cap")
            .json(&json!({ "cap": cap }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
    assert!(mock.received_requests().await.is_empty());
}

#[tokio::test]
async fn test_set_and_clear_team_cap() {
    let mock = MockWindsurfServer::start().await;
    mock.mock_set_usage_config_success().await;
    let server = test_server(&mock.uri());

    let set: Value = server
        .put("/api/team/cap")
        .json(&json!({ "cap": 2000 }))
        .await
        .json();
    let cleared: Value = server.delete("/api/team/cap").await.json();

    assert_eq!(set["scope"], "team");
    assert_eq!(set["add_on_credit_cap"], 2000);
    assert_eq!(cleared["add_on_credit_cap"], Value::Null);
    assert_eq!(
        mock.bodies_for(SET_USAGE_CONFIG_PATH).await,
        vec![
            json!({
                "service_key": TEST_SERVICE_KEY,
                "set_add_on_credit_cap": 2000,
                "team_level": true
            }),
            json!({
                "service_key": TEST_SERVICE_KEY,
                "clear_add_on_credit_cap": true,
                "team_level": true
            }),
        ]
    );
}

#[tokio::test]
async fn test_upstream_failure_maps_to_bad_gateway() {
    let mock = MockWindsurfServer::start().await;
    mock.mock_error(GET_USAGE_CONFIG_PATH, 500, "boom").await;
    let server = test_server(&mock.uri());

    let response = server.get("/api/team/config").await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
    assert_eq!(body["error"]["message"], "HTTP error: 500 - boom");
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_list_users_passes_filters() {
    let mock = MockWindsurfServer::start().await;
    mock.mock_team_users(vec![user_row("Ada", USER_A)]).await;
    let server = test_server(&mock.uri());

    let response = server
        .get("/api/users")
        .add_query_param("group_name", "engineering")
        .add_query_param("start_time", "2024-01-01T00:00:00Z")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["count"], 1);
    assert_eq!(body["users"][0]["email"], USER_A);
    assert_eq!(
        mock.bodies_for(USER_PAGE_ANALYTICS_PATH).await,
        vec![json!({
            "service_key": TEST_SERVICE_KEY,
            "group_name": "engineering",
            "start_timestamp": "2024-01-01T00:00:00+00:00"
        })]
    );
}

#[tokio::test]
async fn test_check_users_reports_each_email() {
    let mock = MockWindsurfServer::start().await;
    mock.mock_user_config(USER_A, Some(700)).await;
    mock.mock_user_config(USER_B, None).await;
    let server = test_server(&mock.uri());

    let response = server
        .post("/api/users/check")
        .json(&json!({ "emails": [format!("{}\n\n  {}  ", USER_A, USER_B)] }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body,
        json!([
            { "email": USER_A, "add_on_credit_cap": 700 },
            { "email": USER_B, "add_on_credit_cap": null },
        ])
    );
}

#[tokio::test]
async fn test_check_users_requires_an_email() {
    let mock = MockWindsurfServer::start().await;
    let server = test_server(&mock.uri());

    let response = server
        .post("/api/users/check")
        .json(&json!({ "emails": ["   \n"] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Please enter at least one email address");
}

#[tokio::test]
async fn test_custom_caps_flow() {
    let mock = MockWindsurfServer::start().await;
    mock.mock_team_config(Some(1000)).await;
    mock.mock_team_users(vec![
        user_row("Ada", USER_A),
        user_row("Bob", USER_B),
        user_row("Cy", USER_C),
    ])
    .await;
    mock.mock_user_config(USER_A, Some(2500)).await;
    mock.mock_user_config(USER_B, Some(1000)).await;
    mock.mock_user_config(USER_C, None).await;
    let server = test_server(&mock.uri());

    let response = server.get("/api/users/custom-caps").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["team_cap"], 1000);
    assert_eq!(body["users_checked"], 3);
    assert_eq!(body["lookup_failures"], 0);
    assert_eq!(
        body["users"],
        json!([{ "name": "Ada", "email": USER_A, "user_cap": 2500, "team_cap": 1000 }])
    );
}

#[tokio::test]
async fn test_clear_custom_caps_reports_failures() {
    let mock = MockWindsurfServer::start().await;
    mock.mock_set_usage_config_success().await;
    mock.mock_set_usage_config_failure(USER_B, 404, "no such user")
        .await;
    let server = test_server(&mock.uri());

    let response = server
        .post("/api/users/custom-caps/clear")
        .json(&json!({ "emails": [USER_A, USER_B] }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["succeeded"], 1);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["results"][1]["error"], "HTTP error: 404 - no such user");
}

#[tokio::test]
async fn test_user_cap_set_and_clear() {
    let mock = MockWindsurfServer::start().await;
    mock.mock_set_usage_config_success().await;
    let server = test_server(&mock.uri());

    let set: Value = server
        .put(&format!("/api/users/{}/cap", USER_A))
        .json(&json!({ "cap": 1200 }))
        .await
        .json();
    server
        .delete(&format!("/api/users/{}/cap", USER_A))
        .await
        .assert_status_ok();

    assert_eq!(set["scope"], "user");
    assert_eq!(set["email"], USER_A);
    assert_eq!(
        mock.bodies_for(SET_USAGE_CONFIG_PATH).await,
        vec![
            json!({
                "service_key": TEST_SERVICE_KEY,
                "set_add_on_credit_cap": 1200,
                "user_email": USER_A
            }),
            json!({
                "service_key": TEST_SERVICE_KEY,
                "clear_add_on_credit_cap": true,
                "user_email": USER_A
            }),
        ]
    );
}

// =============================================================================
// Bulk CSV
// =============================================================================

const USAGE_CSV: &str = "email,credits_used
a@example.com,1500
b@example.com,800
c@example.com,2000
";

#[tokio::test]
async fn test_bulk_preview() {
    let mock = MockWindsurfServer::start().await;
    let server = test_server(&mock.uri());

    let response = server.post("/api/bulk/preview").text(USAGE_CSV).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["rows_read"], 3);
    assert_eq!(body["negative_caps"], 0);
    assert_eq!(
        body["proposals"],
        json!([
            {
                "email": USER_A,
                "credits_used": 1500,
                "addon_used": 1000,
                "proposed_cap": 1500,
                "total_available": 2000
            },
            {
                "email": USER_C,
                "credits_used": 2000,
                "addon_used": 1500,
                "proposed_cap": 2000,
                "total_available": 2500
            },
        ])
    );
    assert!(mock.received_requests().await.is_empty());
}

#[tokio::test]
async fn test_bulk_preview_overrides_policy() {
    let mock = MockWindsurfServer::start().await;
    let server = test_server(&mock.uri());

    let body: Value = server
        .post("/api/bulk/preview")
        .add_query_param("threshold", 1800)
        .add_query_param("buffer", 0)
        .text(USAGE_CSV)
        .await
        .json();

    assert_eq!(body["policy"]["threshold"], 1800);
    assert_eq!(body["proposals"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["proposals"][0]["proposed_cap"], 1500);
}

#[tokio::test]
async fn test_bulk_apply_defaults_to_dry_run() {
    let mock = MockWindsurfServer::start().await;
    let server = test_server(&mock.uri());

    let response = server.post("/api/bulk/apply").text(USAGE_CSV).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["dry_run"], true);
    assert_eq!(body["results"][0]["status"], "would_set");
    assert!(mock.received_requests().await.is_empty());
}

#[tokio::test]
async fn test_bulk_apply_writes_caps() {
    let mock = MockWindsurfServer::start().await;
    mock.mock_set_usage_config_success().await;
    mock.mock_set_usage_config_failure(USER_C, 500, "down").await;
    let server = test_server(&mock.uri());

    let response = server
        .post("/api/bulk/apply")
        .add_query_param("dry_run", false)
        .text(USAGE_CSV)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["succeeded"], 1);
    assert_eq!(body["failed"], 1);
    assert_eq!(
        body["results"],
        json!([
            { "email": USER_A, "cap": 1500, "status": "set" },
            {
                "email": USER_C,
                "cap": 2000,
                "status": "failed",
                "message": "HTTP error: 500 - down"
            },
        ])
    );
    assert_eq!(mock.bodies_for(SET_USAGE_CONFIG_PATH).await.len(), 2);
}

#[tokio::test]
async fn test_bulk_preview_accepts_large_upload() {
    let mock = MockWindsurfServer::start().await;
    let server = test_server(&mock.uri());

    // Well past axum's 2 MB default extractor limit
    let mut csv = String::from("email,credits_used\n");
    let mut rows = 0;
    while csv.len() < 3 * 1024 * 1024 {
        csv.push_str(&format!("user{rows}@example.com,1500\n"));
        rows += 1;
    }

    let response = server.post("/api/bulk/preview").text(csv).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["rows_read"], rows);
    assert_eq!(body["proposals"].as_array().map(Vec::len), Some(rows));
}

#[tokio::test]
async fn test_bulk_rejects_bad_csv() {
    let mock = MockWindsurfServer::start().await;
    let server = test_server(&mock.uri());

    let response = server
        .post("/api/bulk/preview")
        .text("user,credits\nx,1\n")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_CSV");
}

// =============================================================================
// Settings and health
// =============================================================================

#[tokio::test]
async fn test_settings_reflect_config() {
    let mock = MockWindsurfServer::start().await;
    let server = test_server(&mock.uri());

    let body: Value = server.get("/api/settings").await.json();

    assert_eq!(body["base_credits"], 500);
    assert_eq!(body["default_org_addon_cap"], 1000);
    assert_eq!(body["default_threshold"], 1000);
    assert_eq!(body["default_buffer"], 500);
    assert_eq!(body["max_cap"], 100_000);
}

#[tokio::test]
async fn test_health_reports_api_base_url() {
    let mock = MockWindsurfServer::start().await;
    let server = test_server(&mock.uri());

    let body: Value = server.get("/health").await.json();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["api_base_url"], mock.uri());
}
