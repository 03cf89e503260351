//! Shared setup for CLI integration tests

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Nothing listens here; every LLM call fails fast
pub const UNREACHABLE_SERVICE: &str = "http://127.0.0.1:9";

pub const FRAGMENTS: &str = r#"{"content": "Fee structure for BSCS: PKR 171,350 per semester for national students", "source": "fees.pdf"}
{"content": "NET TEST SCHEDULE TABLE Series-3 Islamabad April 2026, Series-4 Karachi June 2026", "source": "net.html", "metadata": {"section": "schedule"}}
{"content": "Hostel accommodation is available for outstation students on merit", "source": "hostel.pdf"}
"#;

/// Isolated database, config path and service endpoints
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("knowledge.sqlite")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config").join("config.yml")
    }

    pub fn write_fragments(&self, content: &str) -> PathBuf {
        let path = self.dir.path().join("fragments.jsonl");
        fs::write(&path, content).unwrap();
        path
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("campusrag").unwrap();
        cmd.env("CAMPUSRAG_DB", self.db_path())
            .env("CAMPUSRAG_CONFIG", self.config_path())
            .env("CAMPUSRAG_LLM_URL", UNREACHABLE_SERVICE)
            .env("CAMPUSRAG_EMBEDDING_URL", UNREACHABLE_SERVICE)
            .env_remove("RUST_LOG");
        cmd
    }

    /// Environment with `FRAGMENTS` imported without embeddings
    pub fn seeded() -> Self {
        let env = Self::new();
        let file = env.write_fragments(FRAGMENTS);
        env.cmd()
            .arg("import")
            .arg(&file)
            .arg("--skip-embeddings")
            .assert()
            .success();
        env
    }
}
