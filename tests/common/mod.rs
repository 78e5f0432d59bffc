// Common test utilities and fixtures

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::Command;

use anyhow::Result;
use serde_json::Value;
use tempfile::TempDir;

pub mod fixture_app;

/// Run the cardpulse binary and parse stdout as JSON
pub fn run_command(args: &[&str]) -> Result<(Value, i32)> {
    let output = Command::new(env!("CARGO_BIN_EXE_cardpulse"))
        .args(args)
        .env("RUST_LOG", "cardpulse=warn")
        .output()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let exit_code = output.status.code().unwrap_or(-1);

    let json = match serde_json::from_str(&stdout) {
        Ok(json) => json,
        Err(_) => {
            let message = if !stdout.is_empty() {
                stdout.to_string()
            } else {
                stderr.to_string()
            };
            serde_json::json!({
                "error": exit_code != 0,
                "message": message,
                "exit_code": exit_code
            })
        }
    };

    Ok((json, exit_code))
}

/// Write `html` into a fresh temp dir; keep the dir alive while the file is used
pub fn write_fixture(html: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("page.html");
    std::fs::write(&path, html).expect("Failed to write fixture");
    (dir, path)
}

/// Empty config file so a developer's ~/.cardpulse/config.json never leaks in
pub fn empty_config() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{}").expect("Failed to write config");
    (dir, path)
}

/// Browser for live tests, from `CARDPULSE_TEST_BROWSER` (default firefox)
pub fn get_test_browser() -> String {
    std::env::var("CARDPULSE_TEST_BROWSER").unwrap_or_else(|_| "firefox".to_string())
}

/// Serve the fixture pages on an ephemeral port
pub async fn spawn_fixture_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, fixture_app::create_app()).await;
    });
    format!("http://{}", addr)
}

/// HTML snapshots
pub mod fixtures {
    pub const ATTRIBUTE_CARDS: &str = r#"
    <!DOCTYPE html>
    <html>
    <head><title>Hub</title></head>
    <body>
        <div data-ps-scope="input_hub">
            <div class="ps-card" data-ps-start-needed="true"><b>🚨 지금 시작하세요</b></div>
            <div class="ps-card" data-ps-start-needed="true"><b>🚨 지금 시작하세요</b></div>
            <div class="ps-card">✅ 진행 중</div>
        </div>
    </body>
    </html>
    "#;

    pub const TEXT_ONLY: &str = r#"
    <!DOCTYPE html>
    <html>
    <head><title>Hub</title><script>var label = "시작 필요";</script></head>
    <body>
        <div class="tile"><span>⚠️</span> <span>시작 필요</span></div>
        <div class="tile"><p>시작 필요</p><p>지금 시작하세요</p></div>
    </body>
    </html>
    "#;

    pub const NO_CARDS: &str = r#"
    <!DOCTYPE html>
    <html>
    <head><title>Hub</title></head>
    <body>
        <div class="ps-card" data-ps-start-needed="false">완료</div>
        <div class="summary">Nothing to start</div>
    </body>
    </html>
    "#;
}
