//! Fund request model
//!
//! Represents one agent's cash-advance request against their monthly
//! commission. Each request has:
//! - An auto-assigned sequence id
//! - The requesting agent's code and name
//! - The month it draws against (composite month + year key)
//! - Requested amount (i64 cents, always positive)
//! - Status (Pending, Approved, Rejected)
//!
//! Requests are created at submission time, transitioned only by the
//! approval engine, and never deleted.
//!
//! CRITICAL: All money values are i64 (cents)

use crate::models::month::MonthKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Auto-assigned request sequence id
pub type RequestId = u64;

/// Fund request status
///
/// Tracks the lifecycle of a request through the approval workflow.
/// Approved and Rejected are both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Awaiting an approval decision
    Pending,

    /// Released for payout
    Approved,

    /// Declined by an approver; terminal, the agent may try again next month
    Rejected,
}

impl RequestStatus {
    /// Whether this status admits no further transitions
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// Errors that can occur during request transitions
#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("Request already decided: {status:?}")]
    AlreadyDecided { status: RequestStatus },
}

/// One cash-advance request
///
/// # Example
/// ```
/// use advance_portal_core_rs::models::month::{Month, MonthKey};
/// use advance_portal_core_rs::models::request::{FundRequest, RequestStatus};
///
/// let request = FundRequest::new(
///     1,
///     "A100".to_string(),
///     "Jane Wanjiru".to_string(),
///     MonthKey::new(Month::Mar, 2026),
///     500_000, // Ksh 5,000.00 in cents
/// );
/// assert_eq!(request.status(), RequestStatus::Pending);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundRequest {
    /// Sequence id assigned by the store
    id: RequestId,

    /// Requesting agent's code
    agent_code: String,

    /// Requesting agent's display name, denormalized for approver views
    agent_name: String,

    /// Month the advance draws against
    month: MonthKey,

    /// Requested amount (i64 cents)
    requested_amount: i64,

    /// Current status
    status: RequestStatus,
}

impl FundRequest {
    /// Create a new Pending request
    ///
    /// # Panics
    /// Panics if requested_amount <= 0; amount validation is the
    /// submission pipeline's responsibility and happens before construction.
    pub fn new(
        id: RequestId,
        agent_code: String,
        agent_name: String,
        month: MonthKey,
        requested_amount: i64,
    ) -> Self {
        assert!(requested_amount > 0, "requested_amount must be positive");
        Self {
            id,
            agent_code,
            agent_name,
            month,
            requested_amount,
            status: RequestStatus::Pending,
        }
    }

    /// Restore a request with all fields preserved (checkpoint load)
    pub fn from_snapshot(
        id: RequestId,
        agent_code: String,
        agent_name: String,
        month: MonthKey,
        requested_amount: i64,
        status: RequestStatus,
    ) -> Self {
        Self {
            id,
            agent_code,
            agent_name,
            month,
            requested_amount,
            status,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn agent_code(&self) -> &str {
        &self.agent_code
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn month(&self) -> MonthKey {
        self.month
    }

    /// Requested amount (i64 cents)
    pub fn requested_amount(&self) -> i64 {
        self.requested_amount
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Transition Pending -> Approved
    ///
    /// Fails with `AlreadyDecided` on a request that is no longer Pending;
    /// the approval engine treats that as a terminal per-call rejection.
    pub(crate) fn approve(&mut self) -> Result<(), RequestError> {
        match self.status {
            RequestStatus::Pending => {
                self.status = RequestStatus::Approved;
                Ok(())
            }
            status => Err(RequestError::AlreadyDecided { status }),
        }
    }

    /// Transition Pending -> Rejected
    pub(crate) fn reject(&mut self) -> Result<(), RequestError> {
        match self.status {
            RequestStatus::Pending => {
                self.status = RequestStatus::Rejected;
                Ok(())
            }
            status => Err(RequestError::AlreadyDecided { status }),
        }
    }

    /// Unconditional status overwrite
    ///
    /// The store's `set_status` trusts its caller; transition enforcement
    /// lives in the approval engine, not here.
    pub(crate) fn force_status(&mut self, status: RequestStatus) {
        self.status = status;
    }
}
