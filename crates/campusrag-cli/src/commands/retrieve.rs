//! Retrieve command

use super::Services;
use crate::app::{ModeArg, OutputFormat, RetrieveArgs};
use crate::output::format_retrieval;
use anyhow::Result;
use campusrag_core::search::MAX_TOP_K;
use campusrag_core::{CampusRagError, Config, KnowledgeBase, RetrievalMode, Strategy};

pub async fn run(
    args: RetrieveArgs,
    db: KnowledgeBase,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let query = args.query.join(" ");
    let mode = retrieval_mode(&args)?;

    let services = Services::connect(config)?;
    let pipeline = services.pipeline(db, config)?;

    let (context, report) = pipeline.retrieve_with_report(&query, mode).await?;
    services.log_metrics();

    let report = args.report.then_some(&report);
    print!("{}", format_retrieval(&query, &context, report, format));
    Ok(())
}

fn has_strategy_flags(args: &RetrieveArgs) -> bool {
    args.top_k.is_some()
        || args.min_score.is_some()
        || args.compression.is_some()
        || args.no_expansion
        || args.no_hybrid
        || args.no_rerank
        || args.no_diversity
        || args.hyde
}

/// Mode for the run; strategy flags are only accepted in custom mode
pub fn retrieval_mode(args: &RetrieveArgs) -> Result<RetrievalMode> {
    match args.mode {
        ModeArg::Fast | ModeArg::Smart if has_strategy_flags(args) => {
            Err(CampusRagError::InvalidInput(
                "strategy flags require --mode custom".to_string(),
            )
            .into())
        }
        ModeArg::Fast => Ok(RetrievalMode::Fast),
        ModeArg::Smart => Ok(RetrievalMode::Smart),
        ModeArg::Custom => Ok(RetrievalMode::Custom(custom_strategy(args)?)),
    }
}

fn custom_strategy(args: &RetrieveArgs) -> Result<Strategy> {
    let mut strategy = Strategy::default();

    if let Some(top_k) = args.top_k {
        if !(1..=MAX_TOP_K).contains(&top_k) {
            return Err(CampusRagError::InvalidInput(format!(
                "--top-k must be within [1, {}], got {}",
                MAX_TOP_K, top_k
            ))
            .into());
        }
        strategy.top_k = top_k;
    }
    if let Some(min_score) = args.min_score {
        if !(0.0..=1.0).contains(&min_score) {
            return Err(CampusRagError::InvalidInput(format!(
                "--min-score must be within [0, 1], got {}",
                min_score
            ))
            .into());
        }
        strategy.min_relevance_score = min_score;
    }
    if let Some(ratio) = args.compression {
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(CampusRagError::InvalidInput(format!(
                "--compression must be within (0, 1], got {}",
                ratio
            ))
            .into());
        }
        strategy.compression_target_ratio = ratio;
    }

    strategy.use_query_expansion = !args.no_expansion;
    strategy.use_hybrid_search = !args.no_hybrid;
    strategy.use_reranking = !args.no_rerank;
    strategy.enable_diversity_selection = !args.no_diversity;
    strategy.use_hyde = args.hyde;

    Ok(strategy)
}
