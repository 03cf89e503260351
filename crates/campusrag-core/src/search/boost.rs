//! Domain query-pattern boosting
//!
//! Short factual content (schedules, fee tables) is lexically distinctive but
//! semantically diffuse, so queries that look like they target it are steered
//! toward keyword search and backed up with literal probe phrases.

use crate::config::{BoostConfig, BoostRule, ProgramRule};
use crate::error::Result;
use regex::{Regex, RegexBuilder};

struct CompiledRule {
    name: String,
    pattern: Regex,
    guard: Option<Regex>,
    probes: Vec<String>,
}

struct CompiledProgram {
    name: String,
    pattern: Regex,
    fee_category: Option<String>,
}

/// What boosting decided for one query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoostPlan {
    /// Names of matched categories
    pub categories: Vec<String>,
    /// Literal probes to issue, in category order, already capped
    pub probes: Vec<String>,
}

impl BoostPlan {
    /// Whether any category matched
    pub fn is_boosted(&self) -> bool {
        !self.categories.is_empty()
    }
}

/// Compiled boost rules
pub struct QueryBooster {
    rules: Vec<CompiledRule>,
    programs: Vec<CompiledProgram>,
    fee_rule: String,
    default_fee_category: String,
    max_probes: usize,
}

fn case_insensitive(pattern: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

impl QueryBooster {
    /// Compile rules; fails on an invalid pattern
    pub fn new(config: &BoostConfig, max_probes: usize) -> Result<Self> {
        let rules = config
            .rules
            .iter()
            .map(|rule: &BoostRule| {
                Ok(CompiledRule {
                    name: rule.name.clone(),
                    pattern: case_insensitive(&rule.pattern)?,
                    guard: rule.guard.as_deref().map(case_insensitive).transpose()?,
                    probes: rule.probes.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let programs = config
            .programs
            .iter()
            .map(|program: &ProgramRule| {
                Ok(CompiledProgram {
                    name: program.name.clone(),
                    pattern: case_insensitive(&program.pattern)?,
                    fee_category: program.fee_category.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            rules,
            programs,
            fee_rule: config.fee_rule.clone(),
            default_fee_category: config.default_fee_category.clone(),
            max_probes,
        })
    }

    /// Match the query against every category and collect probes
    pub fn plan(&self, query: &str) -> BoostPlan {
        let mut plan = BoostPlan::default();

        for rule in &self.rules {
            if !rule.pattern.is_match(query) {
                continue;
            }
            plan.categories.push(rule.name.clone());

            let guarded = rule.guard.as_ref().map_or(true, |g| g.is_match(query));
            if guarded {
                for probe in &rule.probes {
                    if plan.probes.len() < self.max_probes && !plan.probes.contains(probe) {
                        plan.probes.push(probe.clone());
                    }
                }
            }
        }

        if plan.is_boosted() {
            tracing::debug!(
                "Boosted query '{}': categories={:?}, probes={}",
                query,
                plan.categories,
                plan.probes.len()
            );
        }

        plan
    }

    /// First program named in the query, most specific rule first
    pub fn detect_program(&self, query: &str) -> Option<&str> {
        self.programs
            .iter()
            .find(|p| p.pattern.is_match(query))
            .map(|p| p.name.as_str())
    }

    /// Text to embed for the semantic branch
    ///
    /// Fee queries naming a program are rewritten into the vocabulary fee
    /// tables use; every other query is embedded as-is.
    pub fn semantic_query(&self, query: &str, plan: &BoostPlan) -> String {
        if !plan.categories.iter().any(|c| *c == self.fee_rule) {
            return query.to_string();
        }

        match self.programs.iter().find(|p| p.pattern.is_match(query)) {
            Some(program) => {
                let category = program
                    .fee_category
                    .as_deref()
                    .unwrap_or(&self.default_fee_category);
                format!(
                    "{} {} fee structure cost tuition semester PKR national students undergraduate",
                    program.name, category
                )
            }
            None => query.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booster() -> QueryBooster {
        QueryBooster::new(&BoostConfig::default(), 8).unwrap()
    }

    #[test]
    fn test_schedule_query_is_boosted_with_probe() {
        let plan = booster().plan("NET Series-4 schedule Karachi");
        assert!(plan.is_boosted());
        assert!(plan.categories.contains(&"schedule".to_string()));
        assert!(plan.probes.contains(&"NET TEST SCHEDULE TABLE Series".to_string()));
    }

    #[test]
    fn test_guard_blocks_probe_but_not_boost() {
        let plan = booster().plan("when are results announced for MBA");
        assert!(plan.categories.contains(&"result".to_string()));
        assert!(!plan
            .probes
            .iter()
            .any(|p| p.starts_with("Result NET-2026")));
    }

    #[test]
    fn test_unmatched_query_not_boosted() {
        let plan = booster().plan("tell me about campus life");
        assert!(!plan.is_boosted());
        assert!(plan.probes.is_empty());
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert!(booster().plan("TUITION for bba").is_boosted());
    }

    #[test]
    fn test_probe_cap() {
        let booster = QueryBooster::new(&BoostConfig::default(), 1).unwrap();
        let plan = booster.plan("admission fee and eligibility criteria");
        assert!(plan.categories.len() >= 2);
        assert_eq!(plan.probes.len(), 1);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let mut config = BoostConfig::default();
        config.rules[0].pattern = "(unclosed".to_string();
        assert!(QueryBooster::new(&config, 8).is_err());
    }

    #[test]
    fn test_detect_program_prefers_specific() {
        let booster = booster();
        assert_eq!(booster.detect_program("What is NUST admission fee for BSCS?"), Some("bscs"));
        assert_eq!(booster.detect_program("bachelor of science programs"), Some("bs"));
        assert_eq!(booster.detect_program("campus map"), None);
    }

    #[test]
    fn test_semantic_query_enriches_fee_queries() {
        let booster = booster();
        let query = "What is NUST admission fee for BSCS?";
        let plan = booster.plan(query);
        let enriched = booster.semantic_query(query, &plan);
        assert!(enriched.starts_with("bscs Engineering Computing"));
        assert!(enriched.ends_with("national students undergraduate"));

        let phd = "PhD tuition fee";
        let enriched = booster.semantic_query(phd, &booster.plan(phd));
        assert!(enriched.contains("Geoinformatics HND"));
    }

    #[test]
    fn test_semantic_query_leaves_other_queries() {
        let booster = booster();
        let query = "BSCS eligibility criteria";
        let plan = booster.plan(query);
        assert_eq!(booster.semantic_query(query, &plan), query);
    }
}
