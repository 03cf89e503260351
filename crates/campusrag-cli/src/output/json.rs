//! JSON output formatter

use campusrag_core::llm::RouteDecision;
use campusrag_core::PipelineReport;
use serde::Serialize;

pub fn to_pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string()) + "\n"
}

pub fn format_retrieval(query: &str, context: &str, report: Option<&PipelineReport>) -> String {
    let mut output = serde_json::json!({
        "query": query,
        "context": context,
    });
    if let Some(report) = report {
        output["report"] = serde_json::to_value(report).unwrap_or(serde_json::Value::Null);
    }
    to_pretty(&output)
}

pub fn format_route(query: &str, decision: &RouteDecision) -> String {
    to_pretty(&serde_json::json!({
        "query": query,
        "intent": decision.intent,
        "defaulted": decision.defaulted,
        "strategy": decision.strategy,
    }))
}
