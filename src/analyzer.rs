// 🛡️ Content Analyzer - One text in, one Verdict out
// Applies the pattern catalog and the sentiment gate to a single text unit

use crate::patterns::{PatternCatalog, FLAG_NEGATIVE_SENTIMENT};
use crate::sentiment::{LexiconSentiment, SentimentScorer};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// Scores strictly below this add `NEGATIVE_SENTIMENT`
pub const NEGATIVE_SENTIMENT_THRESHOLD: f64 = -0.5;

// ============================================================================
// PRIORITY
// ============================================================================

/// Ordinal severity of a verdict: Low < Medium < High < Critical
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = anyhow::Error;

    /// Case-insensitive, so legacy `CRITICAL` labels parse too
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            other => Err(anyhow!("Unknown priority label: '{}'", other)),
        }
    }
}

// ============================================================================
// VERDICT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Labels in detection order
    pub flags: Vec<String>,
    pub priority: Priority,
    /// Polarity in [-1.0, 1.0], rounded to 2 decimals
    pub sentiment: f64,
}

impl Verdict {
    pub fn is_clean(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn flag_count(&self) -> usize {
        self.flags.len()
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }
}

// ============================================================================
// CONTENT ANALYZER
// ============================================================================

/// Stateless analyzer. Holds only the read-only catalog and the scorer, so
/// one instance can be shared across threads.
pub struct ContentAnalyzer<S: SentimentScorer = LexiconSentiment> {
    catalog: PatternCatalog,
    scorer: S,
}

impl ContentAnalyzer<LexiconSentiment> {
    /// Built-in catalog with the lexicon scorer
    pub fn new() -> Result<Self> {
        Ok(Self::with_catalog(PatternCatalog::builtin()?))
    }

    pub fn with_catalog(catalog: PatternCatalog) -> Self {
        ContentAnalyzer {
            catalog,
            scorer: LexiconSentiment::new(),
        }
    }
}

impl<S: SentimentScorer> ContentAnalyzer<S> {
    pub fn with_scorer(catalog: PatternCatalog, scorer: S) -> Self {
        ContentAnalyzer { catalog, scorer }
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    /// Analyze one text unit.
    ///
    /// Flags are appended in catalog order (card or Aadhaar, phone, keywords)
    /// and the priority only ever moves up. Sentiment adds a flag but never
    /// changes priority.
    pub fn analyze(&self, text: &str) -> Verdict {
        let mut flags = Vec::new();
        let mut priority = Priority::Low;

        for rule in self.catalog.matching_rules(text) {
            trace!(rule = %rule.id, category = rule.category.as_str(), "Rule matched");
            flags.push(rule.flag.clone());
            priority = priority.max(rule.severity);
        }

        let polarity = self.scorer.polarity(text);
        let sentiment = if polarity.is_finite() {
            polarity.clamp(-1.0, 1.0)
        } else {
            0.0
        };

        if sentiment < NEGATIVE_SENTIMENT_THRESHOLD {
            flags.push(FLAG_NEGATIVE_SENTIMENT.to_string());
        }

        Verdict {
            flags,
            priority,
            sentiment: round2(sentiment),
        }
    }

    /// Analyze several texts, results in input order
    pub fn analyze_many(&self, texts: &[&str]) -> Vec<Verdict> {
        texts.iter().map(|t| self.analyze(t)).collect()
    }
}

fn round2(value: f64) -> f64 {
    // + 0.0 turns -0.0 into 0.0
    (value * 100.0).round() / 100.0 + 0.0
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> ContentAnalyzer {
        ContentAnalyzer::new().unwrap()
    }

    struct FixedScore(f64);

    impl SentimentScorer for FixedScore {
        fn polarity(&self, _text: &str) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_credit_card_is_critical() {
        let verdict = analyzer().analyze("1234-5678-9012-3456");

        assert_eq!(verdict.flags, vec!["FINANCIAL_DATA_LEAK"]);
        assert_eq!(verdict.priority, Priority::Critical);
    }

    #[test]
    fn test_credit_card_wins_over_everything() {
        let verdict = analyzer().analyze("my card 1234 5678 9012 3456, call 9876543210, scam");

        assert_eq!(
            verdict.flags,
            vec!["FINANCIAL_DATA_LEAK", "PII_PHONE_NUMBER", "SAFETY_VIOLATION: scam"]
        );
        assert_eq!(verdict.priority, Priority::Critical);
    }

    #[test]
    fn test_aadhaar_is_critical() {
        let verdict = analyzer().analyze("my aadhaar is 1234 5678 9012");

        assert_eq!(verdict.flags, vec!["PII_EXPOSURE_AADHAAR"]);
        assert_eq!(verdict.priority, Priority::Critical);
    }

    #[test]
    fn test_card_and_aadhaar_never_both() {
        let verdict = analyzer().analyze("1234567890123456 and 1111 2222 3333");

        assert!(verdict.has_flag("FINANCIAL_DATA_LEAK"));
        assert!(!verdict.has_flag("PII_EXPOSURE_AADHAAR"));
    }

    #[test]
    fn test_phone_is_high() {
        let verdict = analyzer().analyze("reach me on +91 9123456789");

        assert_eq!(verdict.flags, vec!["PII_PHONE_NUMBER"]);
        assert_eq!(verdict.priority, Priority::High);
    }

    #[test]
    fn test_phone_and_scam_scenario() {
        let verdict = analyzer().analyze("Call me at 9876543210 about a scam");

        assert!(verdict.has_flag("PII_PHONE_NUMBER"));
        assert!(verdict.has_flag("SAFETY_VIOLATION: scam"));
        assert_eq!(verdict.flags[0], "PII_PHONE_NUMBER");
        assert_eq!(verdict.priority, Priority::High);
    }

    #[test]
    fn test_single_keyword_is_medium() {
        let verdict = analyzer().analyze("This looks like FRAUD to me");

        let safety: Vec<&String> = verdict
            .flags
            .iter()
            .filter(|f| f.starts_with("SAFETY_VIOLATION:"))
            .collect();
        assert_eq!(safety, vec!["SAFETY_VIOLATION: fraud"]);
        assert_eq!(verdict.priority, Priority::Medium);
    }

    #[test]
    fn test_multiple_keywords_stay_medium() {
        let verdict = analyzer().analyze("attack, kill, scam");

        // Flags follow keyword list order, not text order
        let safety: Vec<&str> = verdict
            .flags
            .iter()
            .filter(|f| f.starts_with("SAFETY_VIOLATION:"))
            .map(|f| f.as_str())
            .collect();
        assert_eq!(
            safety,
            vec![
                "SAFETY_VIOLATION: scam",
                "SAFETY_VIOLATION: kill",
                "SAFETY_VIOLATION: attack",
            ]
        );
        assert_eq!(verdict.priority, Priority::Medium);
    }

    #[test]
    fn test_clean_text_is_low() {
        let verdict = analyzer().analyze("Lovely weather in the park today");

        assert!(verdict.is_clean());
        assert_eq!(verdict.priority, Priority::Low);
        assert!(verdict.sentiment >= 0.0);
    }

    #[test]
    fn test_empty_and_whitespace() {
        for text in ["", "   ", "\n\t"] {
            let verdict = analyzer().analyze(text);
            assert!(verdict.flags.is_empty());
            assert_eq!(verdict.priority, Priority::Low);
            assert_eq!(verdict.sentiment, 0.0);
        }
    }

    #[test]
    fn test_non_ascii_input() {
        let verdict = analyzer().analyze("यह एक परीक्षण है 🙂 ñandú");
        assert_eq!(verdict.priority, Priority::Low);
    }

    #[test]
    fn test_negative_sentiment_does_not_change_priority() {
        let analyzer = ContentAnalyzer::with_scorer(PatternCatalog::builtin().unwrap(), FixedScore(-0.8));
        let verdict = analyzer.analyze("nothing to see");

        assert_eq!(verdict.flags, vec!["NEGATIVE_SENTIMENT"]);
        assert_eq!(verdict.priority, Priority::Low);
        assert_eq!(verdict.sentiment, -0.8);
    }

    #[test]
    fn test_threshold_is_strict() {
        let analyzer = ContentAnalyzer::with_scorer(PatternCatalog::builtin().unwrap(), FixedScore(-0.5));
        let verdict = analyzer.analyze("borderline");

        assert!(verdict.flags.is_empty());
        assert_eq!(verdict.sentiment, -0.5);
    }

    #[test]
    fn test_negative_flag_comes_last() {
        let verdict = analyzer().analyze("I hate this terrible scam");

        assert_eq!(verdict.flags.last().unwrap(), "NEGATIVE_SENTIMENT");
        assert_eq!(verdict.flags[0], "SAFETY_VIOLATION: scam");
        assert_eq!(verdict.priority, Priority::Medium);
    }

    #[test]
    fn test_sentiment_rounded_and_bounded() {
        let analyzer = ContentAnalyzer::with_scorer(PatternCatalog::builtin().unwrap(), FixedScore(0.123456));
        assert_eq!(analyzer.analyze("x").sentiment, 0.12);

        let wild = ContentAnalyzer::with_scorer(PatternCatalog::builtin().unwrap(), FixedScore(f64::NAN));
        assert_eq!(wild.analyze("x").sentiment, 0.0);

        let high = ContentAnalyzer::with_scorer(PatternCatalog::builtin().unwrap(), FixedScore(7.0));
        assert_eq!(high.analyze("x").sentiment, 1.0);
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let analyzer = analyzer();
        let text = "Call 9876543210, this fraud is awful";
        assert_eq!(analyzer.analyze(text), analyzer.analyze(text));
    }

    #[test]
    fn test_analyze_many_keeps_order() {
        let verdicts = analyzer().analyze_many(&["hello", "scam", "1234-5678-9012-3456"]);

        let priorities: Vec<Priority> = verdicts.iter().map(|v| v.priority).collect();
        assert_eq!(priorities, vec![Priority::Low, Priority::Medium, Priority::Critical]);
    }

    #[test]
    fn test_priority_ordering_and_labels() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);

        assert_eq!("CRITICAL".parse::<Priority>().unwrap(), Priority::Critical);
        assert_eq!("medium".parse::<Priority>().unwrap(), Priority::Medium);
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(Priority::Critical.to_string(), "Critical");
    }
}
