// 📂 Batch Runner - Analyze a whole CSV column and merge the verdicts back
// Output keeps every input row and column, in input order, plus
// Flags / Priority / Sentiment

use crate::analyzer::{ContentAnalyzer, Priority, Verdict};
use crate::error::SchemaError;
use crate::ledger::serialize_flags;
use crate::sentiment::{LexiconSentiment, SentimentScorer};
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

pub const DEFAULT_TEXT_COLUMN: &str = "Comment";
pub const FLAGS_COLUMN: &str = "Flags";
pub const PRIORITY_COLUMN: &str = "Priority";
pub const SENTIMENT_COLUMN: &str = "Sentiment";

// ============================================================================
// BATCH TABLE
// ============================================================================

/// In-memory CSV table: one header row and string cells
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl BatchTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        BatchTable { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell value, empty when the row is short
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        let row = self.rows.get(row)?;
        Some(row.get(index).map(String::as_str).unwrap_or(""))
    }

    /// Index of `name`, appending the column if it is not present yet
    fn ensure_column(&mut self, name: &str) -> usize {
        match self.column_index(name) {
            Some(index) => index,
            None => {
                self.headers.push(name.to_string());
                self.headers.len() - 1
            }
        }
    }
}

// ============================================================================
// CSV I/O
// ============================================================================

pub fn read_table<R: Read>(reader: R) -> Result<BatchTable> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (index, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to parse CSV row {}", index + 1))?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    Ok(BatchTable { headers, rows })
}

pub fn read_table_from_path(path: &Path) -> Result<BatchTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    read_table(file)
}

pub fn write_table<W: Write>(writer: W, table: &BatchTable) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(&table.headers)
        .context("Failed to write CSV header")?;
    for row in &table.rows {
        wtr.write_record(row).context("Failed to write CSV row")?;
    }
    wtr.flush().context("Failed to flush CSV output")?;

    Ok(())
}

pub fn write_table_to_path(path: &Path, table: &BatchTable) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create CSV file: {:?}", path))?;
    write_table(file, table)
}

/// Render a table as CSV text (what the download button used to serve)
pub fn table_to_csv_string(table: &BatchTable) -> Result<String> {
    let mut buffer = Vec::new();
    write_table(&mut buffer, table)?;
    String::from_utf8(buffer).context("CSV output is not valid UTF-8")
}

// ============================================================================
// BATCH REPORT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total_rows: usize,
    pub flagged_rows: usize,
    pub by_priority: BTreeMap<String, usize>,
}

impl BatchReport {
    pub fn from_verdicts(verdicts: &[Verdict]) -> Self {
        let mut by_priority = BTreeMap::new();
        for verdict in verdicts {
            *by_priority
                .entry(verdict.priority.as_str().to_string())
                .or_insert(0) += 1;
        }

        BatchReport {
            total_rows: verdicts.len(),
            flagged_rows: verdicts.iter().filter(|v| !v.is_clean()).count(),
            by_priority,
        }
    }

    pub fn count(&self, priority: Priority) -> usize {
        self.by_priority.get(priority.as_str()).copied().unwrap_or(0)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} rows: {} flagged | {} critical, {} high, {} medium, {} low",
            self.total_rows,
            self.flagged_rows,
            self.count(Priority::Critical),
            self.count(Priority::High),
            self.count(Priority::Medium),
            self.count(Priority::Low),
        )
    }
}

// ============================================================================
// BATCH RUNNER
// ============================================================================

/// Applies one analyzer across a table. Never touches the ledger.
pub struct BatchRunner<'a, S: SentimentScorer = LexiconSentiment> {
    analyzer: &'a ContentAnalyzer<S>,
}

impl<'a, S: SentimentScorer> BatchRunner<'a, S> {
    pub fn new(analyzer: &'a ContentAnalyzer<S>) -> Self {
        BatchRunner { analyzer }
    }

    /// Analyze every row's `text_field` and merge the verdict columns.
    ///
    /// Fails before touching any row when `text_field` is not a column.
    pub fn run(&self, table: &BatchTable, text_field: &str) -> Result<BatchTable, SchemaError> {
        let verdicts = self.analyze_rows(table, text_field)?;
        Ok(merge_verdicts(table, &verdicts))
    }

    /// Verdict per row, in row order
    pub fn analyze_rows(
        &self,
        table: &BatchTable,
        text_field: &str,
    ) -> Result<Vec<Verdict>, SchemaError> {
        let text_index = table
            .column_index(text_field)
            .ok_or_else(|| SchemaError::missing_column(text_field, &table.headers))?;

        // Indexed parallel collect keeps input order
        let verdicts: Vec<Verdict> = table
            .rows
            .par_iter()
            .map(|row| {
                let text = row.get(text_index).map(String::as_str).unwrap_or("");
                self.analyzer.analyze(text)
            })
            .collect();

        info!(rows = verdicts.len(), column = text_field, "Batch analyzed");
        Ok(verdicts)
    }

    /// Read `input`, analyze `text_field`, write the merged table to `output`
    pub fn process_file(&self, input: &Path, output: &Path, text_field: &str) -> Result<BatchReport> {
        let table = read_table_from_path(input)?;
        let verdicts = self.analyze_rows(&table, text_field)?;
        let merged = merge_verdicts(&table, &verdicts);

        write_table_to_path(output, &merged)?;

        let report = BatchReport::from_verdicts(&verdicts);
        info!(
            input = ?input,
            output = ?output,
            rows = report.total_rows,
            flagged = report.flagged_rows,
            "Batch report written"
        );
        Ok(report)
    }
}

/// Column union of the input and the three verdict columns. Existing
/// verdict columns are overwritten in place.
fn merge_verdicts(table: &BatchTable, verdicts: &[Verdict]) -> BatchTable {
    let mut merged = BatchTable {
        headers: table.headers.clone(),
        rows: Vec::with_capacity(table.rows.len()),
    };

    let flags_index = merged.ensure_column(FLAGS_COLUMN);
    let priority_index = merged.ensure_column(PRIORITY_COLUMN);
    let sentiment_index = merged.ensure_column(SENTIMENT_COLUMN);
    let width = merged.headers.len();

    for (row, verdict) in table.rows.iter().zip(verdicts) {
        let mut out = row.clone();
        out.resize(width, String::new());
        out[flags_index] = serialize_flags(&verdict.flags);
        out[priority_index] = verdict.priority.as_str().to_string();
        out[sentiment_index] = format!("{:?}", verdict.sentiment);
        merged.rows.push(out);
    }

    merged
}

// ============================================================================
// TESTS
// ============================================================================
