//! Status command

use crate::app::OutputFormat;
use crate::output::format_status;
use anyhow::Result;
use campusrag_core::KnowledgeBase;
use serde::Serialize;
use std::path::Path;

/// Knowledge base overview
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub database: String,
    pub schema_version: Option<i32>,
    pub fragments: usize,
    pub embeddings: usize,
    pub missing_embeddings: usize,
    pub sources: Vec<(String, usize)>,
}

pub fn run(db: &KnowledgeBase, db_path: &Path, format: OutputFormat) -> Result<()> {
    let report = StatusReport {
        database: db_path.display().to_string(),
        schema_version: db.schema_version()?,
        fragments: db.count_fragments()?,
        embeddings: db.count_embeddings()?,
        missing_embeddings: db.fragments_missing_embeddings()?.len(),
        sources: db.sources()?,
    };

    print!("{}", format_status(&report, format));
    Ok(())
}
