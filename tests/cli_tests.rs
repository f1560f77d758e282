//! Failures on every command path are reported the same way.

use std::process::{Command, Output};

use tempfile::TempDir;

fn catalog_llm(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_catalog-llm"))
        .args(args)
        .env_remove("OPENAI_API_KEY")
        .output()
        .unwrap()
}

fn assert_reported_failure(output: &Output, needle: &str) {
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1), "stderr: {}", stderr);
    assert!(stderr.contains("Error during processing"), "stderr: {}", stderr);
    assert!(stderr.contains(needle), "stderr: {}", stderr);
}

#[test]
fn template_write_failure_uses_error_status() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("missing-dir").join("template.xlsx");

    let output = catalog_llm(&["template", target.to_str().unwrap()]);
    assert_reported_failure(&output, "Failed to save workbook");
}

#[test]
fn bad_config_uses_error_status() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[llm\nmodel = ").unwrap();

    let output = catalog_llm(&[
        "translate",
        "catalog.xlsx",
        "--config",
        config.to_str().unwrap(),
    ]);
    assert_reported_failure(&output, "Configuration error");
}

#[test]
fn invalid_key_uses_error_status() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("catalog.xlsx");

    let output = catalog_llm(&[
        "translate",
        input.to_str().unwrap(),
        "--api-key",
        "sk-live-abc",
    ]);
    assert_reported_failure(&output, "Invalid API key");
}
