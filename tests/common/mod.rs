//! Common test utilities for Credit Throttle
//!
//! Shared fixtures wiring the real client and router to a mock Windsurf API.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;

use credit_throttle::{routes::create_router, AppState, Config, UsageCapClient};

/// Test configuration constants
pub mod constants {
    /// Service key sent in every request body
    pub const TEST_SERVICE_KEY: &str = "test-service-key";
    pub const USER_A: &str = "a@example.com";
    pub const USER_B: &str = "b@example.com";
    pub const USER_C: &str = "c@example.com";
}

/// Config pointing at the given mock server
pub fn test_config(api_base_url: &str) -> Config {
    Config::for_api(api_base_url, constants::TEST_SERVICE_KEY)
}

/// Real client pointed at `api_base_url`
pub fn test_client(api_base_url: &str) -> UsageCapClient {
    client_with_config(&test_config(api_base_url))
}

pub fn client_with_config(config: &Config) -> UsageCapClient {
    UsageCapClient::new(reqwest::Client::new(), config).expect("Failed to create client")
}

/// Client whose config calls give up after `timeout`
pub fn client_with_timeout(api_base_url: &str, timeout: Duration) -> UsageCapClient {
    let mut config = test_config(api_base_url);
    config.request_timeout = timeout;
    config.list_timeout = timeout;
    client_with_config(&config)
}

/// Admin API test server backed by the real client
pub fn test_server(api_base_url: &str) -> TestServer {
    let config = test_config(api_base_url);
    let client = client_with_config(&config);
    let state = Arc::new(AppState::with_api(config, Arc::new(client)));
    TestServer::new(create_router(state)).expect("Failed to create test server")
}

/// A base URL nothing is listening on
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
