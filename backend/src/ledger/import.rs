//! Commission batch importer.
//!
//! Reads the tabular commission source (CSV export of the agency's monthly
//! commission run) and upserts it into the ledger, keyed on
//! (agent_code, month, year). Refresh is checksum-diffed: the hosting
//! scheduler may call it as often as it likes, and the ledger only changes
//! when the source content does.
//!
//! Malformed rows are logged and skipped; the surviving rows are applied
//! to the ledger in one call, so a bad row never corrupts rows that parsed
//! cleanly, and readers never observe half a batch.

use crate::ledger::CommissionLedger;
use crate::models::commission::CommissionRecord;
use crate::models::money::parse_cents;
use crate::models::month::{Month, MonthKey};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that abort a whole refresh
///
/// Per-row problems are not here: a malformed row is skipped with a
/// warning, never an error.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read commission source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Commission source is not readable as CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// What a refresh did
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Source checksum matched the last applied batch; nothing changed
    Unchanged,

    /// A new batch was applied
    Applied {
        /// Rows upserted into the ledger
        rows: usize,
        /// Malformed rows skipped
        skipped: usize,
    },
}

/// One raw CSV row, before validation
///
/// Mirrors the commission run's export columns. Everything is optional or
/// stringly here; `parse_row` decides what is usable.
#[derive(Debug, Deserialize)]
struct RawRow {
    agent_code: String,
    agent_name: String,
    #[serde(default)]
    amount: String,
    month: String,
    year: String,
    #[serde(default)]
    tel_no: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    agency: Option<String>,
    #[serde(default)]
    region: Option<String>,
}

/// Reject reasons for a single row
#[derive(Debug)]
enum RowError {
    BlankAgentCode,
    BadMonth(String),
    BadYear(String),
    BadAmount(String),
}

fn parse_row(raw: RawRow) -> Result<CommissionRecord, RowError> {
    let agent_code = raw.agent_code.trim().to_string();
    if agent_code.is_empty() {
        return Err(RowError::BlankAgentCode);
    }

    let month: Month = raw
        .month
        .parse()
        .map_err(|_| RowError::BadMonth(raw.month.clone()))?;
    let year: i32 = raw
        .year
        .trim()
        .parse()
        .map_err(|_| RowError::BadYear(raw.year.clone()))?;

    // Blank amount is a legal (incomplete) row; a non-numeric amount is not
    let amount = match raw.amount.trim() {
        "" => None,
        text => Some(parse_cents(text).map_err(|_| RowError::BadAmount(text.to_string()))?),
    };

    Ok(CommissionRecord::new(
        agent_code,
        raw.agent_name.trim().to_string(),
        MonthKey::new(month, year),
        amount,
    )
    .with_metadata(raw.tel_no, raw.email, raw.unit, raw.agency, raw.region))
}

/// Refresh the ledger from a commission source file
///
/// Reads the file, and if its SHA-256 checksum differs from the last
/// applied batch, parses and applies it.
pub fn refresh_from_path(
    ledger: &mut CommissionLedger,
    path: &Path,
) -> Result<RefreshOutcome, ImportError> {
    let bytes = std::fs::read(path)?;
    refresh_from_bytes(ledger, &bytes)
}

/// Refresh the ledger from in-memory source content
pub fn refresh_from_bytes(
    ledger: &mut CommissionLedger,
    bytes: &[u8],
) -> Result<RefreshOutcome, ImportError> {
    let checksum = content_checksum(bytes);
    if ledger.source_checksum() == Some(checksum.as_str()) {
        return Ok(RefreshOutcome::Unchanged);
    }

    let mut reader = csv::Reader::from_reader(bytes);
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (index, row) in reader.deserialize::<RawRow>().enumerate() {
        // CSV line numbers are 1-based and the header is line 1
        let line = index + 2;
        let raw = match row {
            Ok(raw) => raw,
            Err(err) => {
                warn!(line, %err, "skipping unreadable commission row");
                skipped += 1;
                continue;
            }
        };
        match parse_row(raw) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(line, ?err, "skipping malformed commission row");
                skipped += 1;
            }
        }
    }

    let rows = records.len();
    ledger.apply_batch(records, checksum);
    info!(rows, skipped, "applied commission batch");

    Ok(RefreshOutcome::Applied { rows, skipped })
}

/// SHA-256 checksum of source content, hex-encoded
pub fn content_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
