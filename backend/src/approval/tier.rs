//! Tier-based single-step approval (the tiered policy).
//!
//! Every Pending request belongs to exactly one tier, decided by its
//! amount:
//!
//! - below 10,000.00 — Auto tier, clearable by any admin
//! - 10,000.00 to 50,000.00 inclusive — Department-Head tier
//! - above 50,000.00 — Managing-Director tier
//!
//! An approval call names the tier it is acting under; the credential must
//! match that tier's role and the request must actually classify into that
//! tier. Decisions are per-request and independent: approving one request
//! never touches another.

use crate::approval::credentials::CredentialVerifier;
use crate::approval::ApprovalError;
use crate::models::approval::Role;
use crate::models::audit::{ApprovalLevel, AuditAction, AuditEntry};
use crate::models::request::{FundRequest, RequestError, RequestId};
use crate::notify::Notifier;
use crate::store::RequestStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// Amounts below this (i64 cents) clear through the Auto tier
pub const AUTO_TIER_LIMIT: i64 = 1_000_000; // 10,000.00

/// Amounts above this (i64 cents) need the managing director
pub const DEPT_HEAD_TIER_LIMIT: i64 = 5_000_000; // 50,000.00

/// An approval authority band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Auto,
    DeptHead,
    ManagingDirector,
}

impl Tier {
    /// The tier a requested amount falls into
    ///
    /// # Example
    /// ```
    /// use advance_portal_core_rs::approval::tier::Tier;
    ///
    /// assert_eq!(Tier::classify(999_900), Tier::Auto);             // 9,999.00
    /// assert_eq!(Tier::classify(1_000_000), Tier::DeptHead);       // 10,000.00
    /// assert_eq!(Tier::classify(5_000_000), Tier::DeptHead);       // 50,000.00
    /// assert_eq!(Tier::classify(5_000_100), Tier::ManagingDirector); // 50,001.00
    /// ```
    pub fn classify(amount: i64) -> Tier {
        if amount < AUTO_TIER_LIMIT {
            Tier::Auto
        } else if amount <= DEPT_HEAD_TIER_LIMIT {
            Tier::DeptHead
        } else {
            Tier::ManagingDirector
        }
    }

    /// The role whose credential clears this tier
    pub fn required_role(&self) -> Role {
        match self {
            Tier::Auto => Role::Admin,
            Tier::DeptHead => Role::DeptHead,
            Tier::ManagingDirector => Role::ManagingDirector,
        }
    }

    fn approval_level(&self) -> ApprovalLevel {
        match self {
            Tier::Auto => ApprovalLevel::Auto,
            Tier::DeptHead => ApprovalLevel::DeptHead,
            Tier::ManagingDirector => ApprovalLevel::ManagingDirector,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tier::Auto => "Auto",
            Tier::DeptHead => "Dept Head",
            Tier::ManagingDirector => "Managing Director",
        };
        f.write_str(label)
    }
}

/// Gate shared by approve and reject: credential, existence, tier, status
fn gate<'a>(
    store: &'a mut RequestStore,
    verifier: &CredentialVerifier,
    tier: Tier,
    request_id: RequestId,
    secret: &str,
) -> Result<&'a mut FundRequest, ApprovalError> {
    verifier.verify(tier.required_role(), secret)?;

    let request = store
        .get_request_mut(request_id)
        .ok_or(ApprovalError::RequestNotFound(request_id))?;

    if Tier::classify(request.requested_amount()) != tier {
        return Err(ApprovalError::WrongTier { id: request_id, tier });
    }
    if !request.is_pending() {
        return Err(ApprovalError::AlreadyDecided {
            id: request_id,
            status: request.status(),
        });
    }

    Ok(request)
}

/// Approve a Pending request under a tier's credential
///
/// Transitions Pending -> Approved, appends an audit entry, and notifies
/// the agent. The notification is fire-and-forget: a delivery failure is
/// logged and the approval stands.
pub fn approve(
    store: &mut RequestStore,
    verifier: &CredentialVerifier,
    notifier: &dyn Notifier,
    tier: Tier,
    request_id: RequestId,
    secret: &str,
    origin: &str,
) -> Result<AuditEntry, ApprovalError> {
    let request = gate(store, verifier, tier, request_id, secret)?;
    request.approve().map_err(|e| match e {
        RequestError::AlreadyDecided { status } => ApprovalError::AlreadyDecided {
            id: request_id,
            status,
        },
    })?;

    let (agent_code, agent_name, month) = (
        request.agent_code().to_string(),
        request.agent_name().to_string(),
        request.month(),
    );

    let entry = AuditEntry::new(
        request_id,
        &agent_name,
        tier.required_role(),
        tier.approval_level(),
        origin,
        AuditAction::Approved,
    );
    store.push_audit(entry.clone());
    info!(request_id, %tier, %agent_code, "approved fund request");

    if let Err(err) = notifier.notify(&agent_name, &agent_code, month) {
        warn!(request_id, %agent_code, %err, "notification failed after approval");
    }

    Ok(entry)
}

/// Reject a Pending request under a tier's credential
///
/// Transitions Pending -> Rejected with the same audit fields as an
/// approval. No notification is sent.
pub fn reject(
    store: &mut RequestStore,
    verifier: &CredentialVerifier,
    tier: Tier,
    request_id: RequestId,
    secret: &str,
    origin: &str,
) -> Result<AuditEntry, ApprovalError> {
    let request = gate(store, verifier, tier, request_id, secret)?;
    request.reject().map_err(|e| match e {
        RequestError::AlreadyDecided { status } => ApprovalError::AlreadyDecided {
            id: request_id,
            status,
        },
    })?;

    let agent_name = request.agent_name().to_string();
    let entry = AuditEntry::new(
        request_id,
        &agent_name,
        tier.required_role(),
        tier.approval_level(),
        origin,
        AuditAction::Rejected,
    );
    store.push_audit(entry.clone());
    info!(request_id, %tier, "rejected fund request");

    Ok(entry)
}
