//! Checkpoint - Save/Load Portal State
//!
//! Serializes the complete portal state (commission ledger, request table,
//! monthly approvals, audit log) to a JSON checkpoint file and restores it
//! on startup. A SHA-256 state hash guards the file against truncation and
//! hand edits, and structural invariants are re-validated before a loaded
//! snapshot is accepted.
//!
//! # Critical Invariants
//!
//! - **Request uniqueness**: no two snapshot requests share (agent, month)
//! - **Id headroom**: next_request_id is beyond every stored id
//! - **Audit integrity**: every audit entry references a stored request
//! - **Atomic save**: the checkpoint is written to a temp file and renamed,
//!   so a crash mid-save leaves the previous checkpoint intact

use crate::ledger::CommissionLedger;
use crate::models::approval::MonthlyApproval;
use crate::models::audit::AuditEntry;
use crate::models::commission::CommissionRecord;
use crate::models::request::{FundRequest, RequestId};
use crate::store::RequestStore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors from saving or loading a checkpoint
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Checkpoint I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Checkpoint serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Checkpoint hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("Checkpoint validation failed: {0}")]
    Validation(String),
}

/// Complete portal state snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalSnapshot {
    /// Commission ledger rows, sorted by (agent_code, month) for a
    /// deterministic state hash
    pub ledger_records: Vec<CommissionRecord>,

    /// Checksum of the last applied commission batch
    pub ledger_checksum: Option<String>,

    /// All requests, in id order
    pub requests: Vec<FundRequest>,

    /// Month-level sign-off records, sorted by month
    pub monthly_approvals: Vec<MonthlyApproval>,

    /// The decision trail, oldest first
    pub audit_log: Vec<AuditEntry>,

    /// Next request id the store will assign
    pub next_request_id: RequestId,
}

/// On-disk checkpoint envelope: the snapshot plus its integrity hash
#[derive(Debug, Serialize, Deserialize)]
struct CheckpointFile {
    state_hash: String,
    snapshot: PortalSnapshot,
}

/// Capture the current state as a snapshot
pub fn snapshot(ledger: &CommissionLedger, store: &RequestStore) -> PortalSnapshot {
    let mut ledger_records: Vec<CommissionRecord> = ledger.records().cloned().collect();
    ledger_records.sort_by(|a, b| {
        (a.agent_code(), a.month()).cmp(&(b.agent_code(), b.month()))
    });

    let mut monthly_approvals: Vec<MonthlyApproval> =
        store.monthly_approvals().cloned().collect();
    monthly_approvals.sort_by_key(|a| a.month());

    PortalSnapshot {
        ledger_records,
        ledger_checksum: ledger.source_checksum().map(str::to_string),
        requests: store.list_all().into_iter().cloned().collect(),
        monthly_approvals,
        audit_log: store.audit_log().to_vec(),
        next_request_id: store.next_id(),
    }
}

/// Compute the deterministic SHA-256 hash of a snapshot
///
/// Serializes through a canonical form with sorted object keys so the hash
/// does not depend on field or map iteration order.
pub fn compute_state_hash(snapshot: &PortalSnapshot) -> Result<String, CheckpointError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let value = serde_json::to_value(snapshot)?;
    let json = serde_json::to_string(&canonicalize(value))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Validate snapshot structural invariants
pub fn validate_snapshot(snapshot: &PortalSnapshot) -> Result<(), CheckpointError> {
    // 1. Request uniqueness per (agent, month), and unique ids
    let mut pairs = HashSet::new();
    let mut ids = HashSet::new();
    for request in &snapshot.requests {
        if !pairs.insert((request.agent_code().to_string(), request.month())) {
            return Err(CheckpointError::Validation(format!(
                "duplicate request for agent {} in {}",
                request.agent_code(),
                request.month()
            )));
        }
        if !ids.insert(request.id()) {
            return Err(CheckpointError::Validation(format!(
                "duplicate request id {}",
                request.id()
            )));
        }
    }

    // 2. Id headroom
    if let Some(max_id) = snapshot.requests.iter().map(|r| r.id()).max() {
        if snapshot.next_request_id <= max_id {
            return Err(CheckpointError::Validation(format!(
                "next_request_id {} is not beyond stored id {}",
                snapshot.next_request_id, max_id
            )));
        }
    }

    // 3. Audit entries reference stored requests
    for entry in &snapshot.audit_log {
        if !ids.contains(&entry.request_id()) {
            return Err(CheckpointError::Validation(format!(
                "audit entry {} references unknown request {}",
                entry.id(),
                entry.request_id()
            )));
        }
    }

    Ok(())
}

/// Save a checkpoint to disk
///
/// Writes to `<path>.tmp` and renames over the target, so an interrupted
/// save never clobbers the previous checkpoint.
pub fn save(
    path: &Path,
    ledger: &CommissionLedger,
    store: &RequestStore,
) -> Result<(), CheckpointError> {
    let snap = snapshot(ledger, store);
    let file = CheckpointFile {
        state_hash: compute_state_hash(&snap)?,
        snapshot: snap,
    };

    let json = serde_json::to_string_pretty(&file)?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;

    info!(path = %path.display(), "saved checkpoint");
    Ok(())
}

/// Load a checkpoint and rebuild the ledger and store
///
/// Verifies the integrity hash, then the structural invariants, before any
/// state is handed back.
pub fn load(path: &Path) -> Result<(CommissionLedger, RequestStore), CheckpointError> {
    let json = std::fs::read_to_string(path)?;
    let file: CheckpointFile = serde_json::from_str(&json)?;

    let actual = compute_state_hash(&file.snapshot)?;
    if actual != file.state_hash {
        return Err(CheckpointError::HashMismatch {
            expected: file.state_hash,
            actual,
        });
    }

    validate_snapshot(&file.snapshot)?;

    let PortalSnapshot {
        ledger_records,
        ledger_checksum,
        requests,
        monthly_approvals,
        audit_log,
        next_request_id,
    } = file.snapshot;

    let mut ledger = CommissionLedger::new();
    for record in ledger_records {
        ledger.upsert(record);
    }
    ledger.set_source_checksum(ledger_checksum);

    let store = RequestStore::from_snapshot(
        requests,
        monthly_approvals,
        audit_log,
        next_request_id,
    );

    info!(path = %path.display(), requests = store.num_requests(), "loaded checkpoint");
    Ok((ledger, store))
}
