//! Integration tests for retrieve, route and config commands
//!
//! The LLM service is unreachable, so these exercise the degraded paths:
//! retrieval falls back to keyword search and every model stage is skipped.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_fast_retrieve_falls_back_to_keyword_search() {
    let env = TestEnv::seeded();

    env.cmd()
        .args(["retrieve", "--mode", "fast", "BSCS", "fee"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[Document 1] Source: fees.pdf"))
        .stdout(predicate::str::contains("PKR 171,350"));
}

#[test]
fn test_smart_retrieve_with_report() {
    let env = TestEnv::seeded();

    env.cmd()
        .args(["retrieve", "--report", "NET", "Series-4", "schedule", "Karachi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Series-4 Karachi"))
        .stdout(predicate::str::contains("Mode:             smart (FACTUAL)"))
        .stdout(predicate::str::contains("Queries:          1"));
}

#[test]
fn test_custom_retrieve_json() {
    let env = TestEnv::seeded();

    env.cmd()
        .args([
            "--format",
            "json",
            "retrieve",
            "--mode",
            "custom",
            "--top-k",
            "3",
            "--no-rerank",
            "--report",
            "hostel",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"query\": \"hostel\""))
        .stdout(predicate::str::contains("\"mode\": \"custom\""))
        .stdout(predicate::str::contains("\"top_k\": 3"));
}

#[test]
fn test_empty_database_returns_not_found() {
    let env = TestEnv::new();

    env.cmd()
        .args(["retrieve", "--mode", "fast", "BSCS", "fee"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No relevant information found"));
}

#[test]
fn test_strategy_flags_require_custom_mode() {
    let env = TestEnv::seeded();

    env.cmd()
        .args(["retrieve", "--mode", "fast", "--top-k", "3", "fee"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("--mode custom"));
}

#[test]
fn test_invalid_compression_ratio() {
    let env = TestEnv::seeded();

    env.cmd()
        .args(["retrieve", "--mode", "custom", "--compression", "1.5", "fee"])
        .assert()
        .code(3);
}

#[test]
fn test_oversized_top_k_is_rejected() {
    let env = TestEnv::seeded();

    env.cmd()
        .args([
            "retrieve",
            "--mode",
            "custom",
            "--top-k",
            "18446744073709551615",
            "BSCS fee",
        ])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("--top-k must be within"));
}

#[test]
fn test_route_defaults_when_service_unavailable() {
    let env = TestEnv::new();

    env.cmd()
        .args(["route", "How", "do", "I", "apply"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Intent: FACTUAL (default)"))
        .stdout(predicate::str::contains("top_k:            10"));
}

#[test]
fn test_config_show_and_init() {
    let env = TestEnv::new();

    env.cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("similarity_floor: 0.3"));

    env.cmd()
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote configuration"));
    assert!(fs::read_to_string(env.config_path())
        .unwrap()
        .contains("rerank_limit: 20"));

    env.cmd().args(["config", "init"]).assert().failure();
    env.cmd().args(["config", "init", "--force"]).assert().success();
}

#[test]
fn test_invalid_config_is_rejected() {
    let env = TestEnv::new();
    fs::create_dir_all(env.config_path().parent().unwrap()).unwrap();
    fs::write(env.config_path(), "retrieval:\n  mmr_lambda: 1.5\n").unwrap();

    env.cmd().args(["config", "show"]).assert().code(3);
}

#[test]
fn test_zero_fallback_count_is_rejected() {
    let env = TestEnv::new();
    fs::create_dir_all(env.config_path().parent().unwrap()).unwrap();
    fs::write(env.config_path(), "retrieval:\n  filter_fallback_count: 0\n").unwrap();

    env.cmd()
        .args(["config", "show"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("filter_fallback_count"));
}
