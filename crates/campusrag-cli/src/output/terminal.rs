//! Terminal output formatter

use crate::commands::compare::Comparison;
use crate::commands::import::ImportSummary;
use crate::commands::status::StatusReport;
use campusrag_core::llm::RouteDecision;
use campusrag_core::{PipelineReport, Strategy};

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn format_strategy(strategy: &Strategy) -> String {
    let mut output = String::new();
    output.push_str(&format!("  top_k:            {}\n", strategy.top_k));
    output.push_str(&format!("  min_relevance:    {:.2}\n", strategy.min_relevance_score));
    output.push_str(&format!("  compression:      {:.2}\n", strategy.compression_target_ratio));
    output.push_str(&format!("  expansion:        {}\n", on_off(strategy.use_query_expansion)));
    output.push_str(&format!("  hybrid:           {}\n", on_off(strategy.use_hybrid_search)));
    output.push_str(&format!("  reranking:        {}\n", on_off(strategy.use_reranking)));
    output.push_str(&format!("  diversity:        {}\n", on_off(strategy.enable_diversity_selection)));
    output.push_str(&format!("  hyde:             {}\n", on_off(strategy.use_hyde)));
    output
}

pub fn format_retrieval(context: &str, report: Option<&PipelineReport>) -> String {
    let mut output = format!("{}\n", context);

    if let Some(report) = report {
        output.push_str("\n---\n");
        output.push_str(&format!("Mode:             {}", report.mode));
        if let Some(intent) = report.intent {
            output.push_str(&format!(" ({})", intent));
        }
        output.push('\n');
        output.push_str(&format!("Queries:          {}\n", report.queries.len()));
        for query in &report.queries {
            output.push_str(&format!("  - {}\n", query));
        }
        output.push_str(&format!("Retrieved:        {}\n", report.retrieved));
        output.push_str(&format!("Unique:           {}\n", report.deduplicated));
        output.push_str(&format!("Ranked:           {}\n", report.ranked));
        output.push_str(&format!(
            "Kept:             {}{}\n",
            report.filtered,
            if report.used_filter_fallback { " (fallback)" } else { "" }
        ));
        output.push_str(&format!("Selected:         {}\n", report.selected));
        if let Some(kind) = report.compressed {
            output.push_str(&format!("Compression:      {:?}\n", kind));
        }
        output.push_str(&format!("Context:          {} chars\n", report.context_chars));
        output.push_str(&format!("Elapsed:          {} ms\n", report.elapsed_ms));
        output.push_str("Strategy:\n");
        output.push_str(&format_strategy(&report.strategy));
    }

    output
}

pub fn format_route(decision: &RouteDecision) -> String {
    let mut output = format!(
        "Intent: {}{}\n",
        decision.intent,
        if decision.defaulted { " (default)" } else { "" }
    );
    output.push_str("Strategy:\n");
    output.push_str(&format_strategy(&decision.strategy));
    output
}

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

pub fn format_comparison(comparison: &Comparison) -> String {
    let mut output = format!("Query: \"{}\"\n\n", comparison.query);

    output.push_str(&format!(
        "{:<10} {:>8} {:>9} {:>10} {:>13} {:>12} {:>9}\n",
        "MODE", "TIME", "LENGTH", "RELEVANCE", "COMPLETENESS", "CONCISENESS", "OVERALL"
    ));
    for run in &comparison.runs {
        output.push_str(&format!(
            "{:<10} {:>6}ms {:>9} {:>10} {:>13} {:>12} {:>9}\n",
            run.mode,
            run.elapsed_ms,
            run.context_chars,
            percent(run.metrics.relevance),
            percent(run.metrics.completeness),
            percent(run.metrics.conciseness),
            percent(run.metrics.overall)
        ));
    }
    for (mode, error) in &comparison.failures {
        output.push_str(&format!("{:<10} failed: {}\n", mode, error));
    }

    let winners = &comparison.winners;
    output.push('\n');
    output.push_str(&format!("Fastest:          {}\n", winners.fastest));
    output.push_str(&format!("Most concise:     {}\n", winners.shortest));
    output.push_str(&format!("Best relevance:   {}\n", winners.best_relevance));
    output.push_str(&format!("Best overall:     {}\n", winners.best_overall));
    output
}

pub fn format_import(summary: &ImportSummary) -> String {
    let mut output = format!("Imported {}\n", summary.file);
    output.push_str(&format!("  Read:           {}\n", summary.read));
    output.push_str(&format!("  Inserted:       {}\n", summary.inserted));
    output.push_str(&format!("  Duplicates:     {}\n", summary.duplicates));
    output.push_str(&format!("  Embedded:       {}\n", summary.embedded));
    if summary.embedding_failures > 0 {
        output.push_str(&format!("  Not embedded:   {}\n", summary.embedding_failures));
    }
    output
}

pub fn format_status(report: &StatusReport) -> String {
    let mut output = format!("Database:        {}\n", report.database);
    if let Some(version) = report.schema_version {
        output.push_str(&format!("Schema version:  {}\n", version));
    }
    output.push_str(&format!("Fragments:       {}\n", report.fragments));
    output.push('\n');
    output.push_str("Embeddings:\n");
    output.push_str(&format!("  Embedded:      {}\n", report.embeddings));
    output.push_str(&format!("  Pending:       {}\n", report.missing_embeddings));

    if !report.sources.is_empty() {
        output.push('\n');
        output.push_str("Sources:\n");
        for (source, count) in &report.sources {
            output.push_str(&format!("  {:<30} {}\n", source, count));
        }
    }
    output
}
