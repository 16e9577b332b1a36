//! Request store
//!
//! Durable record of every fund request and its lifecycle state, plus the
//! month-level approval records and the audit log. The store is the single
//! writer boundary of the portal: every mutation goes through `&mut self`,
//! so writes are serialized by construction and a bulk month release is one
//! logical operation.
//!
//! # Critical Invariants
//!
//! 1. **Request uniqueness**: at most one request per (agent_code, month).
//!    The unique index is checked inside `submit`, so the duplicate-guard
//!    query plus insert cannot race.
//! 2. **Ids are never reused**: `next_id` only moves forward; requests are
//!    never deleted.
//! 3. **No transition rules here**: `set_status` is an unconditional
//!    overwrite. Which transitions are legal is the approval engine's
//!    concern.

pub mod checkpoint;

use crate::models::approval::MonthlyApproval;
use crate::models::audit::AuditEntry;
use crate::models::month::MonthKey;
use crate::models::request::{FundRequest, RequestId, RequestStatus};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::debug;

/// Errors from accepting a new request
#[derive(Debug, Error, PartialEq)]
pub enum SubmitError {
    #[error("Agent {agent_code} already has a fund request for {month}")]
    DuplicateRequest { agent_code: String, month: MonthKey },
}

/// Errors from operating on a stored request
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("Fund request {0} not found")]
    RequestNotFound(RequestId),
}

/// The portal's request table, approval records, and audit log
#[derive(Debug, Clone)]
pub struct RequestStore {
    /// All requests, keyed by sequence id (iteration order = id order)
    requests: BTreeMap<RequestId, FundRequest>,

    /// Unique index enforcing one request per (agent_code, month)
    by_agent_month: HashMap<(String, MonthKey), RequestId>,

    /// Month-level dual-sign-off records, created implicitly per month
    monthly_approvals: HashMap<MonthKey, MonthlyApproval>,

    /// Append-only decision trail
    audit_log: Vec<AuditEntry>,

    /// Next sequence id to assign
    next_id: RequestId,
}

impl Default for RequestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestStore {
    pub fn new() -> Self {
        Self {
            requests: BTreeMap::new(),
            by_agent_month: HashMap::new(),
            monthly_approvals: HashMap::new(),
            audit_log: Vec::new(),
            next_id: 1,
        }
    }

    /// Insert a new Pending request and return its id
    ///
    /// Amount-range and eligibility validation are the submission
    /// pipeline's responsibility; this layer only enforces the uniqueness
    /// invariant. The check and the insert happen under the same `&mut`
    /// borrow, which closes the check-then-act race a separate guard call
    /// would leave open.
    pub fn submit(
        &mut self,
        agent_code: &str,
        agent_name: &str,
        month: MonthKey,
        requested_amount: i64,
    ) -> Result<RequestId, SubmitError> {
        let key = (agent_code.to_string(), month);
        if self.by_agent_month.contains_key(&key) {
            return Err(SubmitError::DuplicateRequest {
                agent_code: agent_code.to_string(),
                month,
            });
        }

        let id = self.next_id;
        self.next_id += 1;

        let request = FundRequest::new(
            id,
            agent_code.to_string(),
            agent_name.to_string(),
            month,
            requested_amount,
        );
        self.requests.insert(id, request);
        self.by_agent_month.insert(key, id);

        debug!(id, agent_code, %month, requested_amount, "accepted fund request");
        Ok(id)
    }

    /// Duplicate guard: does the agent already have a request this month?
    ///
    /// Read-only, no side effects. Callers use it for early feedback;
    /// `submit` re-checks under the same borrow and is the authority.
    pub fn has_request_for(&self, agent_code: &str, month: MonthKey) -> bool {
        self.by_agent_month
            .contains_key(&(agent_code.to_string(), month))
    }

    /// One request by id
    pub fn get_request(&self, id: RequestId) -> Option<&FundRequest> {
        self.requests.get(&id)
    }

    pub(crate) fn get_request_mut(&mut self, id: RequestId) -> Option<&mut FundRequest> {
        self.requests.get_mut(&id)
    }

    /// All of an agent's requests, most recent month first
    pub fn get(&self, agent_code: &str) -> Vec<&FundRequest> {
        let mut rows: Vec<&FundRequest> = self
            .requests
            .values()
            .filter(|r| r.agent_code() == agent_code)
            .collect();
        rows.sort_by(|a, b| b.month().cmp(&a.month()));
        rows
    }

    /// An agent's per-month requested totals, most recent month first
    ///
    /// With the uniqueness invariant each month has at most one row, but
    /// the aggregate view mirrors what approvers see in history screens.
    pub fn monthly_totals(&self, agent_code: &str) -> Vec<(MonthKey, i64)> {
        let mut totals: BTreeMap<MonthKey, i64> = BTreeMap::new();
        for request in self.requests.values() {
            if request.agent_code() == agent_code {
                *totals.entry(request.month()).or_insert(0) += request.requested_amount();
            }
        }
        totals.into_iter().rev().collect()
    }

    /// Full table scan, in id order (approver/payroll views)
    pub fn list_all(&self) -> Vec<&FundRequest> {
        self.requests.values().collect()
    }

    /// Unconditional status overwrite
    ///
    /// No transition table is enforced here; the approval engine is the
    /// layer that decides which transitions are legal.
    pub fn set_status(&mut self, id: RequestId, status: RequestStatus) -> Result<(), StoreError> {
        let request = self
            .requests
            .get_mut(&id)
            .ok_or(StoreError::RequestNotFound(id))?;
        request.force_status(status);
        Ok(())
    }

    /// Sum of requested amounts still awaiting decision for a month
    ///
    /// Pending rows only: Approved rows are already released and Rejected
    /// rows are terminal. An unknown month sums to zero, never an error.
    pub fn total_requested(&self, month: MonthKey) -> i64 {
        self.requests
            .values()
            .filter(|r| r.month() == month && r.is_pending())
            .map(|r| r.requested_amount())
            .sum()
    }

    /// Release a month: flip every Pending request to Approved in one pass
    ///
    /// Returns the affected requests (post-transition) so the caller can
    /// notify each agent. Runs entirely under one `&mut` borrow, so the
    /// release is all-or-nothing with respect to any other store operation.
    pub fn release_month(&mut self, month: MonthKey) -> Vec<FundRequest> {
        let mut released = Vec::new();
        for request in self.requests.values_mut() {
            if request.month() == month && request.is_pending() {
                request.force_status(RequestStatus::Approved);
                released.push(request.clone());
            }
        }
        debug!(%month, count = released.len(), "released month");
        released
    }

    /// A month's sign-off record, if any role has signed or queried it
    pub fn monthly_approval(&self, month: MonthKey) -> Option<&MonthlyApproval> {
        self.monthly_approvals.get(&month)
    }

    /// A month's sign-off record, created implicitly on first use
    pub fn monthly_approval_entry(&mut self, month: MonthKey) -> &mut MonthlyApproval {
        self.monthly_approvals
            .entry(month)
            .or_insert_with(|| MonthlyApproval::new(month))
    }

    /// Append a decision to the audit trail
    pub fn push_audit(&mut self, entry: AuditEntry) {
        self.audit_log.push(entry);
    }

    /// The decision trail, oldest first
    pub fn audit_log(&self) -> &[AuditEntry] {
        &self.audit_log
    }

    pub fn num_requests(&self) -> usize {
        self.requests.len()
    }

    pub(crate) fn next_id(&self) -> RequestId {
        self.next_id
    }

    pub(crate) fn monthly_approvals(&self) -> impl Iterator<Item = &MonthlyApproval> {
        self.monthly_approvals.values()
    }

    /// Rebuild a store from checkpoint parts
    ///
    /// The caller (checkpoint load) has already validated uniqueness and
    /// id-ordering invariants.
    pub(crate) fn from_snapshot(
        requests: Vec<FundRequest>,
        monthly_approvals: Vec<MonthlyApproval>,
        audit_log: Vec<AuditEntry>,
        next_id: RequestId,
    ) -> Self {
        let mut by_agent_month = HashMap::new();
        let mut table = BTreeMap::new();
        for request in requests {
            by_agent_month.insert(
                (request.agent_code().to_string(), request.month()),
                request.id(),
            );
            table.insert(request.id(), request);
        }
        Self {
            requests: table,
            by_agent_month,
            monthly_approvals: monthly_approvals
                .into_iter()
                .map(|a| (a.month(), a))
                .collect(),
            audit_log,
            next_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::month::Month;

    fn mar() -> MonthKey {
        MonthKey::new(Month::Mar, 2026)
    }

    fn apr() -> MonthKey {
        MonthKey::new(Month::Apr, 2026)
    }

    #[test]
    fn test_submit_assigns_sequence_ids() {
        let mut store = RequestStore::new();
        let a = store.submit("A100", "Jane", mar(), 500_000).unwrap();
        let b = store.submit("A200", "Otieno", mar(), 700_000).unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[test]
    fn test_duplicate_submit_fails() {
        let mut store = RequestStore::new();
        store.submit("A100", "Jane", mar(), 500_000).unwrap();

        let err = store.submit("A100", "Jane", mar(), 100_000).unwrap_err();
        assert_eq!(
            err,
            SubmitError::DuplicateRequest {
                agent_code: "A100".to_string(),
                month: mar(),
            }
        );
        assert_eq!(store.num_requests(), 1);
    }

    #[test]
    fn test_same_agent_other_month_is_allowed() {
        let mut store = RequestStore::new();
        store.submit("A100", "Jane", mar(), 500_000).unwrap();
        assert!(store.submit("A100", "Jane", apr(), 500_000).is_ok());
    }

    #[test]
    fn test_same_month_other_year_is_allowed() {
        let mut store = RequestStore::new();
        store.submit("A100", "Jane", mar(), 500_000).unwrap();

        let mar_2027 = MonthKey::new(Month::Mar, 2027);
        assert!(store.submit("A100", "Jane", mar_2027, 500_000).is_ok());
    }

    #[test]
    fn test_duplicate_guard_query() {
        let mut store = RequestStore::new();
        assert!(!store.has_request_for("A100", mar()));
        store.submit("A100", "Jane", mar(), 500_000).unwrap();
        assert!(store.has_request_for("A100", mar()));
        assert!(!store.has_request_for("A100", apr()));
    }

    #[test]
    fn test_history_is_month_descending() {
        let mut store = RequestStore::new();
        store.submit("A100", "Jane", mar(), 100_000).unwrap();
        store.submit("A100", "Jane", apr(), 200_000).unwrap();
        store
            .submit("A100", "Jane", MonthKey::new(Month::Jan, 2026), 300_000)
            .unwrap();

        let history = store.get("A100");
        let months: Vec<MonthKey> = history.iter().map(|r| r.month()).collect();
        assert_eq!(months, vec![apr(), mar(), MonthKey::new(Month::Jan, 2026)]);
    }

    #[test]
    fn test_total_requested_counts_pending_only() {
        let mut store = RequestStore::new();
        let a = store.submit("A100", "Jane", mar(), 500_000).unwrap();
        store.submit("A200", "Otieno", mar(), 300_000).unwrap();
        store.submit("A300", "Kamau", apr(), 900_000).unwrap();

        assert_eq!(store.total_requested(mar()), 800_000);

        store.set_status(a, RequestStatus::Approved).unwrap();
        assert_eq!(store.total_requested(mar()), 300_000);

        // Unknown month: zero, not an error
        assert_eq!(store.total_requested(MonthKey::new(Month::Dec, 2031)), 0);
    }

    #[test]
    fn test_release_month_flips_pending_only() {
        let mut store = RequestStore::new();
        let a = store.submit("A100", "Jane", mar(), 500_000).unwrap();
        let b = store.submit("A200", "Otieno", mar(), 300_000).unwrap();
        let c = store.submit("A300", "Kamau", apr(), 900_000).unwrap();
        store.set_status(b, RequestStatus::Rejected).unwrap();

        let released = store.release_month(mar());
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].id(), a);

        assert_eq!(
            store.get_request(a).unwrap().status(),
            RequestStatus::Approved
        );
        // Rejected is terminal and the other month is untouched
        assert_eq!(
            store.get_request(b).unwrap().status(),
            RequestStatus::Rejected
        );
        assert_eq!(
            store.get_request(c).unwrap().status(),
            RequestStatus::Pending
        );
        assert_eq!(store.total_requested(mar()), 0);
    }

    #[test]
    fn test_set_status_unknown_id() {
        let mut store = RequestStore::new();
        let err = store.set_status(99, RequestStatus::Approved).unwrap_err();
        assert_eq!(err, StoreError::RequestNotFound(99));
    }

    #[test]
    fn test_monthly_approval_created_implicitly() {
        let mut store = RequestStore::new();
        assert!(store.monthly_approval(mar()).is_none());
        store.monthly_approval_entry(mar());
        assert!(store.monthly_approval(mar()).is_some());
    }
}
