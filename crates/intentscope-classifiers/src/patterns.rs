//! Ordered intent pattern table
//!
//! Labels are kept in declaration order and so are the rules of each
//! label. The rules backend walks the table in exactly this order, so when
//! a query matches rules of two labels the label declared first wins.
//! Declaration order is the only tie-break: rule specificity and match
//! length are never consulted.

use intentscope_core::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rules of the reference chart/data-query domain, in precedence order
const DEFAULT_RULES: &[(&str, &[&str])] = &[
    (
        "line_chart",
        &[
            r"\bline chart\b",
            r"\btrend\b",
            r"over time",
            r"\bby year\b",
            r"\bevolution\b",
        ],
    ),
    (
        "bar_chart",
        &[
            r"\bbar chart\b",
            r"\bcompare\b",
            r"\bby category\b",
            r"\bhistogram\b",
        ],
    ),
    (
        "pie_chart",
        &[
            r"\bpie\b",
            r"\bshare\b",
            r"\bpercentage\b",
            r"\bdistribution\b",
        ],
    ),
    ("show_table", &[r"\b(show|display|list)\b.*\b(table|rows|all)\b"]),
    (
        "max_value",
        &[
            r"\bmax(imum)?\b",
            r"\bhighest\b",
            r"\bmost (expensive|price|rent)\b",
        ],
    ),
    ("min_value", &[r"\bmin(imum)?\b", r"\blowest\b", r"\bcheapest\b"]),
    (
        "value_frequency",
        &[
            r"\bhow many\b",
            r"\bcount\b",
            r"\bfreq(uency)?\b",
            r"\bnumber of\b",
        ],
    ),
    (
        "value1_vs_value2",
        &[r"\b(vs|versus)\b", r"\bcompare\b.*\b(and|vs|versus)\b"],
    ),
    (
        "select_fields_with_conditions",
        &[r"\b(sum|total|average|mean)\b", r"\bfilter\b", r"\bwhere\b"],
    ),
];

/// Rules declared for one intent
#[derive(Debug, Clone)]
pub struct IntentRules {
    label: String,
    patterns: Vec<Regex>,
}

impl IntentRules {
    /// Compile the rules of one intent
    pub fn new<S: AsRef<str>>(label: impl Into<String>, patterns: &[S]) -> Result<Self> {
        let label = label.into();
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|e| {
                    Error::config(format!(
                        "invalid pattern '{}' for intent '{}': {}",
                        p.as_ref(),
                        label,
                        e
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { label, patterns })
    }

    /// Intent label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Compiled patterns in declaration order
    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    /// Whether any rule matches the (already normalized) text
    pub fn matches(&self, normalized: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(normalized))
    }
}

/// Pattern table entry as written in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentRulesSpec {
    /// Intent label
    pub label: String,

    /// Regular expressions, matched against lower-cased trimmed text
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Ordered mapping from intent label to its rules
#[derive(Debug, Clone)]
pub struct PatternTable {
    intents: Vec<IntentRules>,
}

impl PatternTable {
    /// Build a table; labels must be unique
    pub fn new(intents: Vec<IntentRules>) -> Result<Self> {
        for (i, rules) in intents.iter().enumerate() {
            if intents[..i].iter().any(|r| r.label == rules.label) {
                return Err(Error::config(format!(
                    "intent '{}' declared more than once",
                    rules.label
                )));
            }
        }

        Ok(Self { intents })
    }

    /// Build a table from `(label, patterns)` pairs
    pub fn from_rules<S: AsRef<str>>(rules: &[(&str, &[S])]) -> Result<Self> {
        let intents = rules
            .iter()
            .map(|(label, patterns)| IntentRules::new(*label, *patterns))
            .collect::<Result<Vec<_>>>()?;
        Self::new(intents)
    }

    /// Build a table from its YAML entries
    pub fn from_specs(specs: &[IntentRulesSpec]) -> Result<Self> {
        let intents = specs
            .iter()
            .map(|s| IntentRules::new(s.label.clone(), s.patterns.as_slice()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(intents)
    }

    /// Parse from YAML (a sequence of `{label, patterns}` entries)
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let specs: Vec<IntentRulesSpec> = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("failed to parse pattern table: {}", e)))?;
        Self::from_specs(&specs)
    }

    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Intents in precedence order
    pub fn intents(&self) -> &[IntentRules] {
        &self.intents
    }

    /// Declared labels in precedence order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.intents.iter().map(|r| r.label.as_str())
    }

    /// Total number of compiled rules
    pub fn rule_count(&self) -> usize {
        self.intents.iter().map(|r| r.patterns.len()).sum()
    }
}

impl Default for PatternTable {
    fn default() -> Self {
        let intents = DEFAULT_RULES
            .iter()
            .map(|(label, patterns)| IntentRules {
                label: (*label).to_string(),
                patterns: patterns
                    .iter()
                    .filter_map(|p| Regex::new(p).ok())
                    .collect(),
            })
            .collect();

        Self { intents }
    }
}
