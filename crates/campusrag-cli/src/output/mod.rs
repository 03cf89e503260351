//! Output formatters

pub mod json;
pub mod terminal;

use crate::app::OutputFormat;
use crate::commands::compare::Comparison;
use crate::commands::import::ImportSummary;
use crate::commands::status::StatusReport;
use campusrag_core::llm::RouteDecision;
use campusrag_core::PipelineReport;

/// Format retrieved context, optionally with its pipeline report
pub fn format_retrieval(
    query: &str,
    context: &str,
    report: Option<&PipelineReport>,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Json => json::format_retrieval(query, context, report),
        OutputFormat::Text => terminal::format_retrieval(context, report),
    }
}

pub fn format_route(query: &str, decision: &RouteDecision, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_route(query, decision),
        OutputFormat::Text => terminal::format_route(decision),
    }
}

pub fn format_comparison(comparison: &Comparison, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::to_pretty(comparison),
        OutputFormat::Text => terminal::format_comparison(comparison),
    }
}

pub fn format_import(summary: &ImportSummary, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::to_pretty(summary),
        OutputFormat::Text => terminal::format_import(summary),
    }
}

pub fn format_status(report: &StatusReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::to_pretty(report),
        OutputFormat::Text => terminal::format_status(report),
    }
}
