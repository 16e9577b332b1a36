//! Month-level dual sign-off (the dual-sign-off policy).
//!
//! Approvers act on a month's aggregate rather than on individual
//! requests. The department head and the managing director each sign the
//! month independently, in either order, any number of times; a role's
//! newer sign-off just overwrites its older comment and timestamp. The
//! moment both signatures are in, every Pending request of that month
//! bulk-transitions to Approved in one pass and the notifier fires once
//! per affected agent.
//!
//! The release commits before any notification is attempted, so a
//! delivery failure can only ever be logged — it can never roll back or
//! block the approval.

use crate::approval::credentials::CredentialVerifier;
use crate::approval::ApprovalError;
use crate::models::approval::{Role, RoleApproval, SignOffError};
use crate::models::audit::{ApprovalLevel, AuditAction, AuditEntry};
use crate::models::month::MonthKey;
use crate::models::request::FundRequest;
use crate::notify::Notifier;
use crate::store::RequestStore;
use tracing::{info, warn};

/// What an `approve_total` call did
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOutcome {
    /// Whether the month now has both signatures
    pub fully_approved: bool,

    /// Requests released by this call; empty while the pair is incomplete,
    /// and also when a completed month had no Pending requests left
    pub released: Vec<FundRequest>,
}

/// Record a role's sign-off on a month's aggregate, releasing the month
/// if this completes the signature pair
///
/// Idempotent per role: re-signing overwrites the comment and timestamp
/// only. Requests that are already Approved are never touched, so
/// re-signing a fully approved month changes no request state.
pub fn approve_total(
    store: &mut RequestStore,
    verifier: &CredentialVerifier,
    notifier: &dyn Notifier,
    month: MonthKey,
    role: Role,
    secret: &str,
    comment: &str,
) -> Result<ReleaseOutcome, ApprovalError> {
    if !role.can_sign_month() {
        return Err(ApprovalError::RoleCannotSign(role));
    }
    verifier.verify(role, secret)?;

    let record = store.monthly_approval_entry(month);
    if let Err(SignOffError::RoleCannotSign(role)) = record.sign(role, RoleApproval::now(comment))
    {
        return Err(ApprovalError::RoleCannotSign(role));
    }
    let fully_approved = record.is_fully_approved();
    info!(%month, %role, fully_approved, "recorded monthly sign-off");

    if !fully_approved {
        return Ok(ReleaseOutcome {
            fully_approved: false,
            released: Vec::new(),
        });
    }

    // Both signatures are in: release the month, then notify. The store
    // mutation commits first; notification failures are logged only.
    let released = store.release_month(month);
    for request in &released {
        store.push_audit(AuditEntry::new(
            request.id(),
            request.agent_name(),
            role,
            ApprovalLevel::MonthlyRelease,
            "portal",
            AuditAction::Approved,
        ));
        if let Err(err) = notifier.notify(request.agent_name(), request.agent_code(), month) {
            warn!(
                request_id = request.id(),
                agent_code = request.agent_code(),
                %err,
                "notification failed after monthly release"
            );
        }
    }

    if !released.is_empty() {
        info!(%month, count = released.len(), "monthly release complete");
    }

    Ok(ReleaseOutcome {
        fully_approved: true,
        released,
    })
}
