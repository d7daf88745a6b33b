// 🏷️ Pattern Catalog - Detection Rules as Data
// Regex and keyword rules for financial data, PII and safety violations

use crate::analyzer::Priority;
use anyhow::{Context as AnyhowContext, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

// ============================================================================
// BUILT-IN PATTERNS
// ============================================================================

/// 16 digits in groups of four, separators optional (`-` or whitespace)
pub const CREDIT_CARD_PATTERN: &str = r"\b(?:\d{4}[-\s]?){3}\d{4}\b";

/// 12 digits in groups of four, single optional whitespace separator
pub const AADHAAR_PATTERN: &str = r"\b\d{4}\s?\d{4}\s?\d{4}\b";

/// Optional +91 prefix, then a 10-digit mobile number starting with 6-9
pub const PHONE_PATTERN: &str = r"(\+91[\-\s]?)?[6789]\d{9}";

pub const DEFAULT_BANNED_KEYWORDS: [&str; 5] = ["scam", "fraud", "hate", "kill", "attack"];

pub const FLAG_FINANCIAL_DATA_LEAK: &str = "FINANCIAL_DATA_LEAK";
pub const FLAG_PII_AADHAAR: &str = "PII_EXPOSURE_AADHAAR";
pub const FLAG_PII_PHONE: &str = "PII_PHONE_NUMBER";
pub const FLAG_SAFETY_PREFIX: &str = "SAFETY_VIOLATION";
pub const FLAG_NEGATIVE_SENTIMENT: &str = "NEGATIVE_SENTIMENT";

/// Card numbers and Aadhaar numbers share digit shapes; only one may fire.
const GROUP_SENSITIVE_NUMBER: &str = "sensitive_number";

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleCategory {
    /// Payment card data
    Financial,

    /// Personally identifiable information (national ID, phone)
    Pii,

    /// Abusive or dangerous language
    Safety,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Financial => "Financial",
            RuleCategory::Pii => "PII",
            RuleCategory::Safety => "Safety",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Matcher {
    Regex(Regex),
    /// Lowercase keyword, matched as a substring of the lowercased text
    Keyword(String),
}

#[derive(Debug, Clone)]
pub struct DetectionRule {
    /// Rule ID for tracking
    pub id: String,

    /// Label appended to the verdict when the rule fires
    pub flag: String,

    pub matcher: Matcher,

    pub category: RuleCategory,

    /// Minimum priority of any verdict this rule fires on
    pub severity: Priority,

    /// Rules sharing a group are checked in order and at most one fires
    pub exclusive_group: Option<&'static str>,
}

impl DetectionRule {
    pub fn regex(
        id: &str,
        flag: &str,
        pattern: &str,
        category: RuleCategory,
        severity: Priority,
    ) -> Result<Self> {
        let regex = Regex::new(pattern)
            .with_context(|| format!("Invalid pattern for rule '{}': {}", id, pattern))?;

        Ok(DetectionRule {
            id: id.to_string(),
            flag: flag.to_string(),
            matcher: Matcher::Regex(regex),
            category,
            severity,
            exclusive_group: None,
        })
    }

    pub fn keyword(word: &str) -> Self {
        let word = word.trim().to_lowercase();
        DetectionRule {
            id: format!("keyword_{}", word),
            flag: format!("{}: {}", FLAG_SAFETY_PREFIX, word),
            matcher: Matcher::Keyword(word),
            category: RuleCategory::Safety,
            severity: Priority::Medium,
            exclusive_group: None,
        }
    }

    pub fn in_group(mut self, group: &'static str) -> Self {
        self.exclusive_group = Some(group);
        self
    }

    /// Check the rule against the raw text and its lowercased form
    pub fn matches(&self, text: &str, text_lower: &str) -> bool {
        match &self.matcher {
            Matcher::Regex(regex) => regex.is_match(text),
            Matcher::Keyword(word) => text_lower.contains(word.as_str()),
        }
    }
}

// ============================================================================
// PATTERN CATALOG
// ============================================================================

/// Ordered, immutable set of detection rules.
///
/// Order is significant: rules are evaluated top to bottom and flags are
/// emitted in that order.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    rules: Vec<DetectionRule>,
}

impl PatternCatalog {
    /// Built-in catalog with the default banned keyword list
    pub fn builtin() -> Result<Self> {
        Self::with_keywords(&DEFAULT_BANNED_KEYWORDS)
    }

    /// Built-in regex rules followed by one rule per keyword, in list order
    pub fn with_keywords<S: AsRef<str>>(keywords: &[S]) -> Result<Self> {
        let mut rules = vec![
            DetectionRule::regex(
                "credit_card",
                FLAG_FINANCIAL_DATA_LEAK,
                CREDIT_CARD_PATTERN,
                RuleCategory::Financial,
                Priority::Critical,
            )?
            .in_group(GROUP_SENSITIVE_NUMBER),
            DetectionRule::regex(
                "aadhaar",
                FLAG_PII_AADHAAR,
                AADHAAR_PATTERN,
                RuleCategory::Pii,
                Priority::Critical,
            )?
            .in_group(GROUP_SENSITIVE_NUMBER),
            DetectionRule::regex(
                "mobile_phone",
                FLAG_PII_PHONE,
                PHONE_PATTERN,
                RuleCategory::Pii,
                Priority::High,
            )?,
        ];

        rules.extend(
            keywords
                .iter()
                .map(|k| k.as_ref())
                .filter(|k| !k.trim().is_empty())
                .map(DetectionRule::keyword),
        );

        Ok(PatternCatalog { rules })
    }

    pub fn rules(&self) -> &[DetectionRule] {
        &self.rules
    }

    /// Get number of rules loaded
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Rules that fire on `text`, in catalog order, honoring exclusive groups
    pub fn matching_rules<'a>(&'a self, text: &str) -> Vec<&'a DetectionRule> {
        let text_lower = text.to_lowercase();
        let mut fired_groups: Vec<&'static str> = Vec::new();
        let mut matched = Vec::new();

        for rule in &self.rules {
            if let Some(group) = rule.exclusive_group {
                if fired_groups.contains(&group) {
                    continue;
                }
            }

            if rule.matches(text, &text_lower) {
                if let Some(group) = rule.exclusive_group {
                    fired_groups.push(group);
                }
                matched.push(rule);
            }
        }

        matched
    }
}

// ============================================================================
// TESTS
// ============================================================================
