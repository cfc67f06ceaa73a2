//! End-to-end tests for the pokitdok binary
//!
//! These tests validate the full command workflow including:
//! - Endpoint listing
//! - Calling GET and POST endpoints against a mock server
//! - Exit codes for unsupported endpoints and failures

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::{
    matchers::{body_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

/// Helper to mount a token endpoint on the mock server
async fn mount_token(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v3/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "cli-token",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .mount(mock_server)
        .await;
}

/// Helper to build a command with credentials and the mock server URL
fn pokitdok_cmd(mock_server: &MockServer) -> Command {
    let mut cmd = Command::cargo_bin("pokitdok").unwrap();
    cmd.env_remove("LOG_LEVEL")
        .env_remove("POKITDOK_TOKEN_PATH")
        .arg("--client-id")
        .arg("client-id")
        .arg("--client-secret")
        .arg("client-secret")
        .arg("--base-url")
        .arg(format!("{}/api/v3", mock_server.uri()));
    cmd
}

#[test]
fn test_endpoints_listing() {
    let mut cmd = Command::cargo_bin("pokitdok").unwrap();
    cmd.arg("endpoints");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("activities"))
        .stdout(predicate::str::contains("prices/insurance"))
        .stdout(predicate::str::contains("claims/status/"))
        .stdout(predicate::str::contains("not supported"));
}

#[tokio::test]
async fn test_call_get_endpoint() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/v3/providers"))
        .and(query_param("zipcode", "94401"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "name": "Example Clinic", "npi": "1467560003" }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut cmd = pokitdok_cmd(&mock_server);
    cmd.arg("call")
        .arg("providers")
        .arg("--params")
        .arg(r#"{"zipcode": "94401"}"#)
        .arg("--compact");

    cmd.assert().success().stdout(predicate::str::contains(
        r#"{"data":[{"name":"Example Clinic","npi":"1467560003"}]}"#,
    ));
}

#[tokio::test]
async fn test_call_post_endpoint() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/api/v3/eligibility/"))
        .and(body_json(json!({ "trading_partner_id": "MOCKPAYER" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "coverage": { "active": true } }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut cmd = pokitdok_cmd(&mock_server);
    cmd.arg("call")
        .arg("eligibility")
        .arg("--params")
        .arg(r#"{"trading_partner_id": "MOCKPAYER"}"#);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"coverage\""))
        .stdout(predicate::str::contains("\"active\": true"));
}

#[tokio::test]
async fn test_call_unsupported_endpoint_exit_code() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    let mut cmd = pokitdok_cmd(&mock_server);
    cmd.arg("call").arg("deductible");

    cmd.assert()
        .code(3)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("does not currently support"));
}

#[tokio::test]
async fn test_call_fails_when_token_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v3/oauth2/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "invalid_client" })))
        .mount(&mock_server)
        .await;

    let mut cmd = pokitdok_cmd(&mock_server);
    cmd.arg("call").arg("payers");

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Authentication failed"));
}

#[tokio::test]
async fn test_call_uses_token_path_from_env() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v3/oauth2/access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "cli-token",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/payers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut cmd = pokitdok_cmd(&mock_server);
    cmd.env("POKITDOK_TOKEN_PATH", "/oauth2/access")
        .arg("call")
        .arg("payers")
        .arg("--compact");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#"{"data":[]}"#));
}

#[test]
fn test_call_requires_credentials() {
    let mut cmd = Command::cargo_bin("pokitdok").unwrap();
    cmd.env_remove("POKITDOK_CLIENT_ID")
        .env_remove("POKITDOK_CLIENT_SECRET")
        .arg("call")
        .arg("payers");

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Missing credentials"));
}

#[test]
fn test_call_rejects_non_object_params() {
    let mut cmd = Command::cargo_bin("pokitdok").unwrap();
    cmd.arg("call").arg("payers").arg("--params").arg("[1, 2, 3]");

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("must be a JSON object"));
}

#[test]
fn test_call_rejects_unknown_endpoint() {
    let mut cmd = Command::cargo_bin("pokitdok").unwrap();
    cmd.arg("call").arg("pharmacies");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown endpoint"));
}
