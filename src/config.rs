// ⚙️ Runtime configuration
// Defaults, overridable through CONTENT_GUARD_* environment variables

use crate::analytics::DEFAULT_RECENT_LIMIT;
use crate::batch::DEFAULT_TEXT_COLUMN;
use crate::patterns::DEFAULT_BANNED_KEYWORDS;
use std::env;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_LEDGER_PATH: &str = "moderation_logs.csv";

pub const ENV_LEDGER: &str = "CONTENT_GUARD_LEDGER";
pub const ENV_TEXT_COLUMN: &str = "CONTENT_GUARD_TEXT_COLUMN";
pub const ENV_KEYWORDS: &str = "CONTENT_GUARD_KEYWORDS";
pub const ENV_RECENT: &str = "CONTENT_GUARD_RECENT";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Decision ledger CSV file
    pub ledger_path: PathBuf,

    /// Column analyzed by batch runs
    pub text_column: String,

    /// Banned keywords, checked in this order
    pub banned_keywords: Vec<String>,

    /// Entries shown in the recent activity list
    pub recent_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            text_column: DEFAULT_TEXT_COLUMN.to_string(),
            banned_keywords: DEFAULT_BANNED_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

impl Config {
    /// Defaults overlaid with whatever is set in the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, with an explicit variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = lookup(ENV_LEDGER).filter(|v| !v.trim().is_empty()) {
            config.ledger_path = PathBuf::from(path);
        }

        if let Some(column) = lookup(ENV_TEXT_COLUMN).filter(|v| !v.is_empty()) {
            config.text_column = column;
        }

        if let Some(raw) = lookup(ENV_KEYWORDS) {
            let keywords: Vec<String> = raw
                .split(',')
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();
            if !keywords.is_empty() {
                config.banned_keywords = keywords;
            }
        }

        if let Some(raw) = lookup(ENV_RECENT) {
            match raw.trim().parse::<usize>() {
                Ok(limit) => config.recent_limit = limit,
                Err(_) => warn!(value = %raw, "Ignoring invalid {}", ENV_RECENT),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.ledger_path, PathBuf::from("moderation_logs.csv"));
        assert_eq!(config.text_column, "Comment");
        assert_eq!(config.banned_keywords, vec!["scam", "fraud", "hate", "kill", "attack"]);
        assert_eq!(config.recent_limit, 10);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_LEDGER, "/tmp/decisions.csv"),
            (ENV_TEXT_COLUMN, "Body"),
            (ENV_KEYWORDS, " Spam, ,Phish "),
            (ENV_RECENT, "25"),
        ]);
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.ledger_path, PathBuf::from("/tmp/decisions.csv"));
        assert_eq!(config.text_column, "Body");
        assert_eq!(config.banned_keywords, vec!["spam", "phish"]);
        assert_eq!(config.recent_limit, 25);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_LEDGER, "  "),
            (ENV_KEYWORDS, ", ,"),
            (ENV_RECENT, "many"),
        ]);
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config, Config::default());
    }
}
