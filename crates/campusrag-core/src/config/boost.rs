//! Query-pattern boosting data
//!
//! Boost categories and program rules are hand-tuned for one institution's
//! content. They live in configuration so another deployment can replace
//! them without touching retrieval code.

use serde::{Deserialize, Serialize};

/// A query category that shifts hybrid search toward keyword matching
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoostRule {
    /// Category name used in logs
    pub name: String,
    /// Case-insensitive regex tested against the query
    pub pattern: String,
    /// Extra regex that must also match before probes are issued
    #[serde(default)]
    pub guard: Option<String>,
    /// Literal keyword probes issued when the category matches
    #[serde(default)]
    pub probes: Vec<String>,
}

/// Maps a program mention to the fee category that documents use for it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgramRule {
    /// Short program code (e.g. "bscs")
    pub name: String,
    /// Case-insensitive regex recognising the program in a query
    pub pattern: String,
    /// Fee category wording used in the enriched embedding query
    #[serde(default)]
    pub fee_category: Option<String>,
}

/// Boost rules plus program-aware fee enrichment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoostConfig {
    /// Categories, tested in order
    pub rules: Vec<BoostRule>,
    /// Program rules, most specific first
    pub programs: Vec<ProgramRule>,
    /// Name of the rule that marks fee queries for program enrichment
    pub fee_rule: String,
    /// Fee category used when a matched program carries none
    pub default_fee_category: String,
}

const ENGINEERING_FEES: &str = "Engineering Computing Natural Sciences Applied Sciences Geoinformatics";
const BUSINESS_FEES: &str = "Architecture Social Sciences Business Studies";

fn rule(name: &str, pattern: &str, guard: Option<&str>, probes: &[&str]) -> BoostRule {
    BoostRule {
        name: name.to_string(),
        pattern: pattern.to_string(),
        guard: guard.map(str::to_string),
        probes: probes.iter().map(|p| p.to_string()).collect(),
    }
}

fn program(name: &str, pattern: &str, fee_category: Option<&str>) -> ProgramRule {
    ProgramRule {
        name: name.to_string(),
        pattern: pattern.to_string(),
        fee_category: fee_category.map(str::to_string),
    }
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                rule(
                    "schedule",
                    r"series|schedule|dates|when.*conducted|test.*schedule",
                    Some(r"series|NET"),
                    &["NET TEST SCHEDULE TABLE Series"],
                ),
                rule(
                    "maths_course",
                    r"math.*course|mathematics.*course|pre.*medical.*course",
                    None,
                    &["Mathematics course Pre Medical connected.nust.edu.pk"],
                ),
                rule(
                    "net_test",
                    r"NET.*test|engineering.*NET|NET.*engineering|subjects.*NET|NET.*subjects|weightings",
                    None,
                    &["SUBJECTS INCLUDED IN NET WITH WEIGHTINGS Engineering Mathematics Physics"],
                ),
                rule(
                    "fee",
                    r"fee|fees|tuition|cost|charges|price|payment|financial",
                    None,
                    &["Fee Structure National Students Tuition Admission Processing Security Deposit"],
                ),
                rule(
                    "pre_med_eligibility",
                    r"pre.*med|pre.*medical.*engineering|pre.*medical.*apply",
                    None,
                    &["Pre-Medical group equivalent qualification applying Engineering mandatory Mathematics course 8 weeks"],
                ),
                rule(
                    "result",
                    r"result|results|announcement|announced|upload",
                    Some(r"NET|series"),
                    &["Result NET-2026 Series uploaded login account"],
                ),
                rule(
                    "bioinformatics",
                    r"bioinformatics|bioinformatic",
                    None,
                    &["BS Bioinformatics NET-Engineering additional registration fee separate"],
                ),
                rule(
                    "eligibility",
                    r"eligibility|eligible|apply|admission|FSc.*arts|ICS|pre.*engineering|criteria",
                    None,
                    &[
                        "NET-Engineering HSSC Pre-Engineering Pre-Medical ICS group candidates seeking admission",
                        "standard defined streams academic background Mathematics Physics Chemistry Biology Computer Science",
                    ],
                ),
            ],
            programs: vec![
                program("bscs", r"b\.?s\.?c\.?s|computer\s+science|cs\s+program|computing\s+science", Some(ENGINEERING_FEES)),
                program("bsse", r"b\.?s\.?s\.?e|software\s+engineering|se\s+program|software\s+engineer", Some(ENGINEERING_FEES)),
                program("beee", r"b\.?e\.?e\.?e|electrical\s+engineering|ee\s+program|electrical\s+engineer", Some(ENGINEERING_FEES)),
                program("bba", r"b\.?b\.?a|business\s+administration|business\s+admin", Some(BUSINESS_FEES)),
                program("mba", r"m\.?b\.?a|master.*business", None),
                program("ms", r"m\.?s\.?\s|master\s+of\s+science", None),
                program("phd", r"ph\.?d|doctorate", None),
                program("be", r"\bb\.?e\b|bachelor.*engineering", Some(ENGINEERING_FEES)),
                program("bs", r"\bb\.?s\b|bachelor.*science", Some(ENGINEERING_FEES)),
                program("ba", r"\bb\.?a\b|bachelor.*arts", Some(BUSINESS_FEES)),
            ],
            fee_rule: "fee".to_string(),
            default_fee_category: format!("{} HND", ENGINEERING_FEES),
        }
    }
}
