// CLI tests that need no browser: audit, strategies, version and error output

use anyhow::Result;
use pretty_assertions::assert_eq;
use std::process::Command;

mod common;
use common::{empty_config, fixtures, run_command, write_fixture};

#[test]
fn test_audit_attribute_cards() -> Result<()> {
    let (_dir, page) = write_fixture(fixtures::ATTRIBUTE_CARDS);
    let (_cfg, config) = empty_config();

    let (report, code) = run_command(&[
        "audit",
        page.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ])?;

    assert_eq!(code, 0);
    assert_eq!(report["outcome"], "animated");
    assert_eq!(report["matched_by"]["kind"], "attribute");
    assert_eq!(report["matched_by"]["name"], "data-ps-start-needed");
    assert_eq!(report["style_blocks"], 1);
    assert_eq!(report["applied"], 2);
    assert_eq!(report["cards"].as_array().unwrap().len(), 2);
    assert_eq!(report["cards"][0]["verdict"]["status"], "running");
    assert_eq!(report["cards"][0]["element"]["class_name"], "ps-card");
    Ok(())
}

#[test]
fn test_audit_text_scan_ignores_scripts() -> Result<()> {
    let (_dir, page) = write_fixture(fixtures::TEXT_ONLY);
    let (_cfg, config) = empty_config();

    let (report, code) = run_command(&[
        "audit",
        page.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ])?;

    assert_eq!(code, 0);
    assert_eq!(report["outcome"], "animated");
    assert_eq!(report["matched_by"]["kind"], "text_scan");
    // Both tiles, each once, and never <html>, <body> or the script
    let cards = report["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 2);
    assert!(cards.iter().all(|c| c["element"]["tag"] == "div"));
    Ok(())
}

#[test]
fn test_audit_not_found_is_not_an_error() -> Result<()> {
    let (_dir, page) = write_fixture(fixtures::NO_CARDS);
    let (_cfg, config) = empty_config();

    let (report, code) = run_command(&[
        "audit",
        page.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ])?;

    assert_eq!(code, 0);
    assert_eq!(report["outcome"], "not_found");
    assert!(report.get("matched_by").is_none());
    assert_eq!(report["hints"][0]["class_name"], "ps-card");
    Ok(())
}

#[test]
fn test_audit_custom_attribute_and_markers() -> Result<()> {
    let (_dir, page) = write_fixture(
        r#"<html><body>
            <div data-x-start-needed="true">A</div>
            <div class="row"><em>Start now</em></div>
        </body></html>"#,
    );
    let (_cfg, config) = empty_config();

    let (report, _) = run_command(&[
        "audit",
        page.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--attribute",
        "data-x-start-needed",
    ])?;
    assert_eq!(report["matched_by"]["name"], "data-x-start-needed");
    assert_eq!(report["cards"].as_array().unwrap().len(), 1);

    let (report, _) = run_command(&[
        "audit",
        page.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--marker",
        "Start now",
    ])?;
    assert_eq!(report["matched_by"]["kind"], "text_scan");
    assert_eq!(report["cards"][0]["element"]["class_name"], "row");
    Ok(())
}

#[test]
fn test_audit_simple_format() -> Result<()> {
    let (_dir, page) = write_fixture(fixtures::ATTRIBUTE_CARDS);
    let (_cfg, config) = empty_config();

    let output = Command::new(env!("CARGO_BIN_EXE_cardpulse"))
        .args([
            "audit",
            page.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--format",
            "simple",
        ])
        .output()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains(": animated"));
    assert!(stdout.contains("Matched by selector [data-ps-start-needed=\"true\"]"));
    assert!(stdout.contains("[2] <div class=\"ps-card\">"));
    Ok(())
}

#[test]
fn test_invalid_config_exit_code() -> Result<()> {
    let (_dir, page) = write_fixture(fixtures::ATTRIBUTE_CARDS);
    let (cfg_dir, _) = empty_config();
    let config = cfg_dir.path().join("bad.json");
    std::fs::write(&config, r#"{ "poll_interval_ms": 0 }"#)?;

    let (result, code) = run_command(&[
        "audit",
        page.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ])?;

    assert_eq!(code, 2);
    assert_eq!(result["error"], true);
    assert_eq!(result["kind"], "invalid_config");
    assert!(result["message"].as_str().unwrap().contains("poll_interval_ms"));
    Ok(())
}

#[test]
fn test_blank_marker_exit_code() -> Result<()> {
    let (_dir, page) = write_fixture(fixtures::NO_CARDS);
    let (_cfg, config) = empty_config();

    let (result, code) = run_command(&[
        "audit",
        page.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--marker",
        "",
        "--marker",
        "Start now",
    ])?;

    assert_eq!(code, 2);
    assert_eq!(result["kind"], "invalid_config");
    Ok(())
}

#[test]
fn test_missing_config_file_exit_code() -> Result<()> {
    let (result, code) = run_command(&["strategies", "--config", "/nonexistent/cardpulse.json"])?;
    assert_eq!(code, 2);
    assert_eq!(result["kind"], "invalid_config");
    Ok(())
}

#[test]
fn test_missing_snapshot_is_generic_error() -> Result<()> {
    let (_cfg, config) = empty_config();
    let (result, code) = run_command(&[
        "audit",
        "/nonexistent/page.html",
        "--config",
        config.to_str().unwrap(),
    ])?;
    assert_eq!(code, 1);
    assert_eq!(result["error"], true);
    Ok(())
}

#[test]
fn test_run_rejects_bad_url_before_browser() -> Result<()> {
    let (result, code) = run_command(&["run", "not-a-url"])?;
    assert_eq!(code, 1);
    assert!(result["message"].as_str().unwrap().contains("Invalid URL"));
    Ok(())
}

#[test]
fn test_strategies_listing() -> Result<()> {
    let (_cfg, config) = empty_config();
    let (result, code) = run_command(&[
        "strategies",
        "--config",
        config.to_str().unwrap(),
        "--scope",
        "input_hub",
    ])?;

    assert_eq!(code, 0);
    let lines = result.as_array().unwrap();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0]["selector"],
        "[data-ps-scope=\"input_hub\"] [data-ps-start-needed=\"true\"]"
    );
    assert_eq!(lines[3]["kind"], "text_scan");
    assert!(lines[3].get("selector").is_none());
    Ok(())
}

#[test]
fn test_version() -> Result<()> {
    let output = Command::new(env!("CARGO_BIN_EXE_cardpulse"))
        .arg("version")
        .output()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.starts_with("cardpulse v"));
    assert!(stdout.contains("ps-animation-fix"));
    Ok(())
}
