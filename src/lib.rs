// Content Guard - Core Library
// Exposes the screening engine for the CLI, the API server, and tests

pub mod patterns;   // Pattern Catalog - detection rules
pub mod sentiment;  // Lexicon polarity scorer
pub mod analyzer;   // Content Analyzer - text → Verdict
pub mod ledger;     // Decision Ledger - append-only CSV
pub mod batch;      // Batch Runner - CSV in, CSV out
pub mod analytics;  // Analytics Aggregator
pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use patterns::{
    DetectionRule, Matcher, PatternCatalog, RuleCategory, DEFAULT_BANNED_KEYWORDS,
};
pub use sentiment::{LexiconSentiment, SentimentScorer};
pub use analyzer::{ContentAnalyzer, Priority, Verdict, NEGATIVE_SENTIMENT_THRESHOLD};
pub use ledger::{DecisionLedger, Decision, LedgerEntry, parse_flags, serialize_flags};
pub use batch::{
    BatchReport, BatchRunner, BatchTable,
    read_table, read_table_from_path, write_table, write_table_to_path, table_to_csv_string,
    DEFAULT_TEXT_COLUMN,
};
pub use analytics::{dashboard, summarize, Dashboard, DecisionSummary, DEFAULT_RECENT_LIMIT};
pub use config::Config;
pub use error::SchemaError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Analyzer built from a config's keyword list
pub fn analyzer_from_config(config: &Config) -> anyhow::Result<ContentAnalyzer> {
    let catalog = PatternCatalog::with_keywords(&config.banned_keywords)?;
    Ok(ContentAnalyzer::with_catalog(catalog))
}
