// 📒 Decision Ledger - Append-only CSV log of human moderation decisions
// One row per decision; rows are never updated or deleted

use crate::analyzer::Priority;
use anyhow::{anyhow, Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub const LEDGER_HEADER: [&str; 5] = ["Timestamp", "Original_Text", "Flags", "Priority", "Decision"];
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// DECISION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "SAFE")]
    Safe,
    #[serde(rename = "VIOLATION")]
    Violation,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Safe => "SAFE",
            Decision::Violation => "VIOLATION",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = anyhow::Error;

    /// Accepts the stored labels plus the approve/reject wording of reviewers
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "safe" | "approve" | "approved" => Ok(Decision::Safe),
            "violation" | "reject" | "rejected" => Ok(Decision::Violation),
            other => Err(anyhow!("Unknown decision: '{}'", other)),
        }
    }
}

// ============================================================================
// LEDGER ENTRY
// ============================================================================

/// One ledger row, exactly as stored.
///
/// Fields stay as text so rows written by other tools (or by hand) still
/// load; the typed accessors interpret them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,

    #[serde(rename = "Original_Text")]
    pub original_text: String,

    #[serde(rename = "Flags")]
    pub flags: String,

    #[serde(rename = "Priority")]
    pub priority: String,

    #[serde(rename = "Decision")]
    pub decision: String,
}

impl LedgerEntry {
    pub fn new(text: &str, flags: &[String], priority: Priority, decision: Decision) -> Self {
        LedgerEntry {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            original_text: text.to_string(),
            flags: serialize_flags(flags),
            priority: priority.as_str().to_string(),
            decision: decision.as_str().to_string(),
        }
    }

    /// Flag list, decoded from either storage format
    pub fn flags(&self) -> Vec<String> {
        parse_flags(&self.flags)
    }

    pub fn priority(&self) -> Option<Priority> {
        if self.priority == "CRITICAL" {
            warn!("Legacy priority label 'CRITICAL' read from ledger");
        }
        self.priority.parse().ok()
    }

    /// `None` for anything other than an exact `SAFE` / `VIOLATION`
    pub fn decision(&self) -> Option<Decision> {
        match self.decision.as_str() {
            "SAFE" => Some(Decision::Safe),
            "VIOLATION" => Some(Decision::Violation),
            _ => None,
        }
    }
}

// ============================================================================
// FLAG SERIALIZATION
// ============================================================================

/// Flags are stored as one JSON list field, e.g. `["A","B"]`
pub fn serialize_flags(flags: &[String]) -> String {
    serde_json::Value::from(flags.to_vec()).to_string()
}

/// Decode a stored flag list.
///
/// Accepts the JSON list written by this crate and the single-quoted
/// `['A', 'B']` form found in older logs.
pub fn parse_flags(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();

    if let Ok(flags) = serde_json::from_str::<Vec<String>>(trimmed) {
        return flags;
    }

    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    inner
        .split(',')
        .map(|part| part.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// CSV bytes for one entry, optionally preceded by the header row
fn encode_row(entry: &LedgerEntry, with_header: bool) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    if with_header {
        writer
            .write_record(LEDGER_HEADER)
            .context("Failed to encode ledger header")?;
    }
    writer
        .serialize(entry)
        .context("Failed to encode ledger entry")?;

    writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to finish ledger row: {}", e.error()))
}

// ============================================================================
// DECISION LEDGER
// ============================================================================

/// Handle on the ledger file. Each call opens, writes and closes the file.
///
/// Clones share one write lock, so appends from the same process never
/// interleave. Separate processes are not coordinated.
#[derive(Debug, Clone)]
pub struct DecisionLedger {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl DecisionLedger {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        DecisionLedger {
            path: path.as_ref().to_path_buf(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one decision. The row is flushed and synced before returning.
    pub fn append(
        &self,
        text: &str,
        flags: &[String],
        priority: Priority,
        decision: Decision,
    ) -> Result<LedgerEntry> {
        let entry = LedgerEntry::new(text, flags, priority, decision);
        self.append_entry(&entry)?;
        Ok(entry)
    }

    /// Append a prepared entry (header written first on a new or empty file)
    pub fn append_entry(&self, entry: &LedgerEntry) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow!("Ledger write lock poisoned: {:?}", self.path))?;

        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };

        // Whole row is encoded up front and written with a single call
        let row = encode_row(entry, needs_header)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open ledger: {:?}", self.path))?;

        file.write_all(&row)
            .with_context(|| format!("Failed to write ledger entry: {:?}", self.path))?;
        file.flush().context("Failed to flush ledger file")?;
        file.sync_data()
            .with_context(|| format!("Failed to sync ledger: {:?}", self.path))?;

        debug!(
            path = ?self.path,
            priority = %entry.priority,
            decision = %entry.decision,
            "Ledger entry appended"
        );

        Ok(())
    }

    /// All entries in file order; empty when the file is missing or empty
    pub fn read_all(&self) -> Result<Vec<LedgerEntry>> {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.len() > 0 => {}
            _ => return Ok(Vec::new()),
        }

        let mut rdr = csv::Reader::from_path(&self.path)
            .with_context(|| format!("Failed to open ledger: {:?}", self.path))?;

        let mut entries = Vec::new();
        for (index, result) in rdr.deserialize().enumerate() {
            let entry: LedgerEntry = result
                .with_context(|| format!("Failed to read ledger row {}", index + 1))?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Last `limit` entries, oldest first
    pub fn recent(&self, limit: usize) -> Result<Vec<LedgerEntry>> {
        let mut entries = self.read_all()?;
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.split_off(skip))
    }

    /// Number of recorded decisions
    pub fn count(&self) -> Result<usize> {
        Ok(self.read_all()?.len())
    }
}

// ============================================================================
// TESTS
// ============================================================================
