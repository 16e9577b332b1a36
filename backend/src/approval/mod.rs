//! Approval engine
//!
//! The portal supports two approval policies, selected once per running
//! portal by configuration:
//!
//! - **Tiered** (`tier`): each Pending request is classified by amount into
//!   an approval tier (Auto / Dept Head / Managing Director) and approved
//!   or rejected individually by the tier's credential holder.
//! - **Dual sign-off** (`dual`): approvers act on a month's aggregate; once
//!   both the department head and the managing director have signed, every
//!   Pending request in the month releases in one operation.
//!
//! Both policies share the credential verifier and the same failure
//! semantics: a credential mismatch is a terminal per-call rejection (no
//! retry counting, no lockout), and an unknown month yields an empty
//! aggregate rather than an error.

pub mod credentials;
pub mod dual;
pub mod tier;

use crate::models::approval::Role;
use crate::models::request::{RequestId, RequestStatus};
use thiserror::Error;

pub use credentials::{digest, CredentialVerifier};
pub use dual::{approve_total, ReleaseOutcome};
pub use tier::{Tier, AUTO_TIER_LIMIT, DEPT_HEAD_TIER_LIMIT};

/// Errors that can occur during approval operations
#[derive(Debug, Error, PartialEq)]
pub enum ApprovalError {
    #[error("Credential rejected for role {role}")]
    CredentialRejected { role: Role },

    #[error("Fund request {0} not found")]
    RequestNotFound(RequestId),

    #[error("Fund request {id} falls outside the {tier} tier")]
    WrongTier { id: RequestId, tier: Tier },

    #[error("Fund request {id} already decided: {status:?}")]
    AlreadyDecided { id: RequestId, status: RequestStatus },

    #[error("Role {0} cannot sign a monthly approval")]
    RoleCannotSign(Role),
}
