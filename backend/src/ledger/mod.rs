//! Commission ledger and eligibility calculation.
//!
//! The ledger is the read-only source of truth for agent commission
//! amounts, keyed by (agent_code, month). The importer (`ledger::import`)
//! is the only writer; the workflow reads it to compute how much an agent
//! may request: one third of the month's commission.
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (cents)
//! 2. A missing record and a record with a blank amount are distinct
//!    failures (`AgentNotFound` vs `DataIncomplete`)
//! 3. A refresh applies as one batch; readers never see half an import

pub mod import;

use crate::models::commission::CommissionRecord;
use crate::models::month::MonthKey;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from ledger lookups
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("No commission record for agent {agent_code} in {month}")]
    AgentNotFound { agent_code: String, month: MonthKey },

    #[error("Commission record for agent {agent_code} in {month} has no amount")]
    DataIncomplete { agent_code: String, month: MonthKey },
}

/// In-memory commission table, keyed by (agent_code, month)
#[derive(Debug, Clone, Default)]
pub struct CommissionLedger {
    records: HashMap<(String, MonthKey), CommissionRecord>,

    /// SHA-256 of the last applied source batch; refresh no-ops while the
    /// source content is unchanged
    source_checksum: Option<String>,
}

impl CommissionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an agent's commission record for a month
    pub fn lookup(
        &self,
        agent_code: &str,
        month: MonthKey,
    ) -> Result<&CommissionRecord, LedgerError> {
        self.records
            .get(&(agent_code.to_string(), month))
            .ok_or_else(|| LedgerError::AgentNotFound {
                agent_code: agent_code.to_string(),
                month,
            })
    }

    /// Maximum advance an agent may request for a month
    ///
    /// One third of the recorded commission, in integer cents (floor
    /// division — exact whenever the commission is a multiple of 3 cents).
    ///
    /// # Example
    /// ```
    /// use advance_portal_core_rs::ledger::CommissionLedger;
    /// use advance_portal_core_rs::models::commission::CommissionRecord;
    /// use advance_portal_core_rs::models::month::{Month, MonthKey};
    ///
    /// let month = MonthKey::new(Month::Mar, 2026);
    /// let mut ledger = CommissionLedger::new();
    /// ledger.upsert(CommissionRecord::new(
    ///     "A100".to_string(),
    ///     "Jane Wanjiru".to_string(),
    ///     month,
    ///     Some(3_000_000), // Ksh 30,000.00
    /// ));
    ///
    /// assert_eq!(ledger.eligible_amount("A100", month).unwrap(), 1_000_000);
    /// ```
    pub fn eligible_amount(&self, agent_code: &str, month: MonthKey) -> Result<i64, LedgerError> {
        let record = self.lookup(agent_code, month)?;
        let amount = record.amount().ok_or_else(|| LedgerError::DataIncomplete {
            agent_code: agent_code.to_string(),
            month,
        })?;
        Ok(amount / 3)
    }

    /// Insert or replace one record, keyed on (agent_code, month)
    pub fn upsert(&mut self, record: CommissionRecord) {
        self.records
            .insert((record.agent_code().to_string(), record.month()), record);
    }

    /// Apply an imported batch in one call
    ///
    /// Upserts every row and records the batch checksum. Rows present in
    /// the ledger but absent from the batch are kept, matching the import
    /// source's replace-by-key semantics.
    pub(crate) fn apply_batch(&mut self, records: Vec<CommissionRecord>, checksum: String) {
        for record in records {
            self.upsert(record);
        }
        self.source_checksum = Some(checksum);
    }

    /// Checksum of the last applied source batch
    pub fn source_checksum(&self) -> Option<&str> {
        self.source_checksum.as_deref()
    }

    pub(crate) fn set_source_checksum(&mut self, checksum: Option<String>) {
        self.source_checksum = checksum;
    }

    /// All records, in no particular order
    pub fn records(&self) -> impl Iterator<Item = &CommissionRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
