//! Compare command

use super::Services;
use crate::app::{OutputFormat, QueryArgs};
use crate::output::format_comparison;
use anyhow::{bail, Result};
use campusrag_core::{
    Config, ContextEvaluator, KnowledgeBase, RetrievalMetrics, RetrievalMode, Strategy,
};
use serde::Serialize;
use std::time::Instant;

/// Outcome of one mode
#[derive(Debug, Clone, Serialize)]
pub struct ModeRun {
    pub mode: String,
    pub elapsed_ms: u64,
    pub context_chars: usize,
    pub metrics: RetrievalMetrics,
}

/// Mode names that won each criterion
#[derive(Debug, Clone, Serialize)]
pub struct Winners {
    pub fastest: String,
    pub shortest: String,
    pub best_relevance: String,
    pub best_overall: String,
}

/// All runs plus per-criterion winners
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub query: String,
    pub runs: Vec<ModeRun>,
    /// Modes whose retrieval failed, with the error
    pub failures: Vec<(String, String)>,
    pub winners: Winners,
}

pub async fn run(
    args: QueryArgs,
    db: KnowledgeBase,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let query = args.query.join(" ");

    let services = Services::connect(config)?;
    let pipeline = services.pipeline(db, config)?;
    let evaluator = ContextEvaluator::new(services.completer.clone());

    let modes = [
        ("fast", RetrievalMode::Fast),
        ("balanced", RetrievalMode::Custom(Strategy::balanced())),
        ("smart", RetrievalMode::Smart),
    ];

    let mut runs = Vec::new();
    let mut failures = Vec::new();

    for (name, mode) in modes {
        let start = Instant::now();
        match pipeline.retrieve_context(&query, mode).await {
            Ok(context) => {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                let metrics = evaluator.evaluate(&query, &context, None).await;
                runs.push(ModeRun {
                    mode: name.to_string(),
                    elapsed_ms,
                    context_chars: context.chars().count(),
                    metrics,
                });
            }
            Err(e) => {
                tracing::warn!("{} mode failed: {}", name, e);
                failures.push((name.to_string(), e.to_string()));
            }
        }
    }
    services.log_metrics();

    let Some(winners) = pick_winners(&runs) else {
        bail!("not enough successful modes to compare ({} of 3)", runs.len());
    };

    let comparison = Comparison {
        query,
        runs,
        failures,
        winners,
    };
    print!("{}", format_comparison(&comparison, format));
    Ok(())
}

/// Winner per criterion; None with fewer than two runs
///
/// Ties go to the earlier mode.
pub fn pick_winners(runs: &[ModeRun]) -> Option<Winners> {
    if runs.len() < 2 {
        return None;
    }

    Some(Winners {
        fastest: best_by(runs, |a, b| a.elapsed_ms < b.elapsed_ms),
        shortest: best_by(runs, |a, b| a.context_chars < b.context_chars),
        best_relevance: best_by(runs, |a, b| a.metrics.relevance > b.metrics.relevance),
        best_overall: best_by(runs, |a, b| a.metrics.overall > b.metrics.overall),
    })
}

fn best_by(runs: &[ModeRun], better: impl Fn(&ModeRun, &ModeRun) -> bool) -> String {
    let mut best = &runs[0];
    for run in &runs[1..] {
        if better(run, best) {
            best = run;
        }
    }
    best.mode.clone()
}
