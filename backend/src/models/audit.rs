//! Audit trail for approval decisions.
//!
//! Every per-request decision appends one entry: who decided, at which
//! authority level, from where, and when. Entries are append-only and
//! survive checkpoints; they exist for after-the-fact review, not for
//! driving workflow state.

use crate::models::approval::Role;
use crate::models::request::RequestId;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The authority level a decision was made under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalLevel {
    /// Auto tier (small amounts, any admin)
    Auto,

    /// Department-head tier
    DeptHead,

    /// Managing-director tier
    ManagingDirector,

    /// Month-level bulk release under the dual-sign-off policy
    MonthlyRelease,
}

impl fmt::Display for ApprovalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApprovalLevel::Auto => "Auto Approval",
            ApprovalLevel::DeptHead => "Dept Head Approval",
            ApprovalLevel::ManagingDirector => "MD Approval",
            ApprovalLevel::MonthlyRelease => "Monthly Release",
        };
        f.write_str(label)
    }
}

/// What the decision was
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Approved,
    Rejected,
}

/// One recorded approval decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Entry id (UUID)
    id: String,

    /// The request the decision applied to
    request_id: RequestId,

    /// Requesting agent's name, denormalized for review without a join
    agent_name: String,

    /// Role that made the decision
    approver_role: Role,

    /// Authority level the decision was made under
    approval_level: ApprovalLevel,

    /// Caller-supplied origin address of the approver
    origin_address: String,

    /// RFC 3339 timestamp of the decision
    timestamp: String,

    /// Approved or Rejected
    action: AuditAction,
}

impl AuditEntry {
    /// Record a decision, stamped with the current UTC time
    pub fn new(
        request_id: RequestId,
        agent_name: &str,
        approver_role: Role,
        approval_level: ApprovalLevel,
        origin_address: &str,
        action: AuditAction,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            request_id,
            agent_name: agent_name.to_string(),
            approver_role,
            approval_level,
            origin_address: origin_address.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            action,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn approver_role(&self) -> Role {
        self.approver_role
    }

    pub fn approval_level(&self) -> ApprovalLevel {
        self.approval_level
    }

    pub fn origin_address(&self) -> &str {
        &self.origin_address
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn action(&self) -> AuditAction {
        self.action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_captures_decision_fields() {
        let entry = AuditEntry::new(
            7,
            "Jane Wanjiru",
            Role::DeptHead,
            ApprovalLevel::DeptHead,
            "10.0.0.17",
            AuditAction::Approved,
        );

        assert_eq!(entry.request_id(), 7);
        assert_eq!(entry.approver_role(), Role::DeptHead);
        assert_eq!(entry.origin_address(), "10.0.0.17");
        assert_eq!(entry.action(), AuditAction::Approved);
        assert!(!entry.id().is_empty());
        assert!(!entry.timestamp().is_empty());
    }

    #[test]
    fn test_entries_get_distinct_ids() {
        let a = AuditEntry::new(
            1,
            "A",
            Role::Admin,
            ApprovalLevel::Auto,
            "unknown",
            AuditAction::Approved,
        );
        let b = AuditEntry::new(
            1,
            "A",
            Role::Admin,
            ApprovalLevel::Auto,
            "unknown",
            AuditAction::Approved,
        );
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_level_labels() {
        assert_eq!(ApprovalLevel::Auto.to_string(), "Auto Approval");
        assert_eq!(ApprovalLevel::MonthlyRelease.to_string(), "Monthly Release");
    }
}
