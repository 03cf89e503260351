//! Integration tests for import and status commands

mod common;

use common::{TestEnv, FRAGMENTS};
use predicates::prelude::*;

#[test]
fn test_import_without_embedding_service_still_stores() {
    let env = TestEnv::new();
    let file = env.write_fragments(FRAGMENTS);

    env.cmd()
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Inserted:       3"))
        .stdout(predicate::str::contains("Not embedded:   3"))
        .stderr(predicate::str::contains("without embeddings"));
}

#[test]
fn test_import_require_embeddings_fails() {
    let env = TestEnv::new();
    let file = env.write_fragments(FRAGMENTS);

    env.cmd()
        .arg("import")
        .arg(&file)
        .arg("--require-embeddings")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_reimport_counts_duplicates() {
    let env = TestEnv::seeded();
    let file = env.write_fragments(FRAGMENTS);

    env.cmd()
        .args(["--format", "json", "import"])
        .arg(&file)
        .arg("--skip-embeddings")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"duplicates\": 3"))
        .stdout(predicate::str::contains("\"inserted\": 0"));
}

#[test]
fn test_import_malformed_line_is_invalid_input() {
    let env = TestEnv::new();
    let file = env.write_fragments("{\"content\": \"ok\", \"source\": \"a\"}\n{broken\n");

    env.cmd()
        .arg("import")
        .arg(&file)
        .arg("--skip-embeddings")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_status_reports_counts() {
    let env = TestEnv::seeded();

    env.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fragments:       3"))
        .stdout(predicate::str::contains("Pending:       3"))
        .stdout(predicate::str::contains("fees.pdf"));

    env.cmd()
        .args(["--format", "json", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"fragments\": 3"))
        .stdout(predicate::str::contains("\"embeddings\": 0"));
}

#[test]
fn test_status_on_empty_database() {
    let env = TestEnv::new();

    env.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fragments:       0"));
}
