//! Import command

use super::Services;
use crate::app::{ImportArgs, OutputFormat};
use crate::output::format_import;
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use campusrag_core::{CampusRagError, Config, Embedder, KnowledgeBase, NewFragment};
use serde::Serialize;

/// Counts for one import
#[derive(Debug, Default, Serialize)]
pub struct ImportSummary {
    pub file: String,
    pub read: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub embedded: usize,
    pub embedding_failures: usize,
}

/// Parse JSONL fragments, skipping blank lines
pub fn parse_fragments(content: &str) -> Result<Vec<NewFragment>> {
    let mut fragments = Vec::new();

    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fragment: NewFragment = serde_json::from_str(line).map_err(|e| {
            CampusRagError::InvalidInput(format!("line {}: {}", number + 1, e))
        })?;
        if fragment.content.trim().is_empty() {
            return Err(CampusRagError::InvalidInput(format!(
                "line {}: fragment content is empty",
                number + 1
            ))
            .into());
        }
        fragments.push(fragment);
    }

    Ok(fragments)
}

pub async fn run(
    args: ImportArgs,
    db: &KnowledgeBase,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let fragments = parse_fragments(&content)?;

    let services = if args.skip_embeddings {
        None
    } else {
        Some(Services::connect(config)?)
    };

    let mut summary = ImportSummary {
        file: args.file.display().to_string(),
        read: fragments.len(),
        ..ImportSummary::default()
    };
    let mut progress = ProgressReporter::new(fragments.len());

    for fragment in fragments {
        progress.set_message(&format!("Importing {}", fragment.source));

        if db.contains_content(&fragment.content)? {
            summary.duplicates += 1;
            progress.increment();
            continue;
        }

        let embedding = match &services {
            Some(services) => match services.embedder.embed(&fragment.content).await {
                Ok(vector) => Some(vector),
                Err(e) if args.require_embeddings => {
                    progress.finish();
                    return Err(e).context(format!("embedding fragment from {}", fragment.source));
                }
                Err(e) => {
                    tracing::warn!("Embedding failed for fragment from {}: {}", fragment.source, e);
                    summary.embedding_failures += 1;
                    None
                }
            },
            None => None,
        };

        let inserted = db.insert_fragment(fragment, embedding.as_deref())?;
        if inserted.created {
            summary.inserted += 1;
            if embedding.is_some() {
                summary.embedded += 1;
            }
        } else {
            summary.duplicates += 1;
        }
        progress.increment();
    }
    progress.finish();

    if summary.embedding_failures > 0 {
        eprintln!(
            "Warning: {} fragments stored without embeddings; they are only reachable by keyword search",
            summary.embedding_failures
        );
    }

    print!("{}", format_import(&summary, format));
    Ok(())
}
