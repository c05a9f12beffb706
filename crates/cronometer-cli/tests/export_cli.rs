//! CLI tests against a mock service.
//!
//! These run the built binary with `--url` pointed at a wiremock server, so
//! they need no credentials or network access.

use std::process::Output;

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOGIN_PAGE: &str = r#"<form method="post" action="/login">
<input type="hidden" name="anticsrf" value="T1"></form>"#;

const CSV: &str = "Date,Energy (kcal)\n2024-01-01,2100\n2024-01-02,1950\n";

async fn mount_service(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "redirect": "/" })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cronometer/app"))
        .and(body_string_contains("|authenticate|"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("//OK[42,\"x\",0,7]")
                .insert_header("set-cookie", "sesnonce=N1; Path=/"),
        )
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cronometer/app"))
        .and(body_string_contains("|generateAuthorizationToken|"))
        .respond_with(ResponseTemplate::new(200).set_body_string("//OK[0,\"tok-cli\"]"))
        .mount(server)
        .await;
}

/// Run the CLI binary against `server`.
async fn run_cli(server: &MockServer, args: &[&str]) -> Output {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_cronometer"))
        .args(args)
        .env_remove("CRONOMETER_USERNAME")
        .env_remove("CRONOMETER_PASSWORD")
        .env("CRONOMETER_URL", server.uri())
        .env("NO_COLOR", "1")
        .output()
        .await
        .expect("Failed to execute CLI")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[tokio::test]
async fn test_export_to_file() {
    let server = MockServer::start().await;
    mount_service(&server).await;
    Mock::given(method("GET"))
        .and(path("/export"))
        .and(query_param("nonce", "tok-cli"))
        .and(query_param("generate", "dailySummary"))
        .and(query_param("start", "2024-01-01"))
        .and(query_param("end", "2024-01-02"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(CSV, "text/csv"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("summary.csv");

    let output = run_cli(
        &server,
        &[
            "export",
            "--username",
            "alice",
            "--password",
            "secret123",
            "--generate",
            "daily-summary",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-02",
            "--output",
            out.to_str().unwrap(),
        ],
    )
    .await;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(std::fs::read_to_string(&out).unwrap(), CSV);
    assert!(output.stdout.is_empty());
}

#[tokio::test]
async fn test_export_to_stdout() {
    let server = MockServer::start().await;
    mount_service(&server).await;
    Mock::given(method("GET"))
        .and(path("/export"))
        .and(query_param("generate", "servings"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CSV))
        .mount(&server)
        .await;

    let output = run_cli(
        &server,
        &[
            "export",
            "--username",
            "alice",
            "--password",
            "secret123",
            "--generate",
            "servings",
        ],
    )
    .await;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), CSV);
}

#[tokio::test]
async fn test_token_json() {
    let server = MockServer::start().await;
    mount_service(&server).await;

    let output = run_cli(
        &server,
        &["token", "--username", "alice", "--password", "secret123", "--json"],
    )
    .await;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value, json!({ "user_id": 42, "token": "tok-cli" }));
}

#[tokio::test]
async fn test_export_rejected_login_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "Bad password" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/export"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_cli(
        &server,
        &[
            "export",
            "--username",
            "alice",
            "--password",
            "wrong",
            "--generate",
            "notes",
        ],
    )
    .await;

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Bad password"), "stderr: {}", stderr(&output));
}
