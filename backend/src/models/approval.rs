//! Approver roles and month-level approval records.
//!
//! Under the dual-sign-off policy a month's requests release only after two
//! distinct roles — the department head and the managing director — have
//! both signed the month's aggregate. `MonthlyApproval` records the two
//! sign-offs; the derived `ApprovalState` is the month's position in the
//! sign-off state machine. Signatures can arrive in either order, and each
//! role may re-sign any number of times (the newer comment and timestamp
//! overwrite the older ones).

use crate::models::month::MonthKey;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// An approver identity known to the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Operations admin; clears the auto tier and runs day-to-day views
    Admin,

    /// Department head; signs months and clears the mid tier
    DeptHead,

    /// Managing director; signs months and clears the top tier
    ManagingDirector,

    /// Payroll team; read-only access to the full request table
    Payroll,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::DeptHead => "Dept Head",
            Role::ManagingDirector => "Managing Director",
            Role::Payroll => "Payroll",
        }
    }

    /// Whether this role may sign a month-level approval
    pub fn can_sign_month(&self) -> bool {
        matches!(self, Role::DeptHead | Role::ManagingDirector)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when recording a sign-off
#[derive(Debug, Error, PartialEq)]
pub enum SignOffError {
    #[error("Role {0} cannot sign a monthly approval")]
    RoleCannotSign(Role),
}

/// One role's sign-off on a month: comment plus RFC 3339 timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleApproval {
    comment: String,
    timestamp: String,
}

impl RoleApproval {
    /// A sign-off stamped with the current UTC time
    pub fn now(comment: &str) -> Self {
        Self {
            comment: comment.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Restore a sign-off with an explicit timestamp (checkpoint load, tests)
    pub fn at(comment: &str, timestamp: &str) -> Self {
        Self {
            comment: comment.to_string(),
            timestamp: timestamp.to_string(),
        }
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

/// Where a month stands in the dual-sign-off state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalState {
    /// No sign-offs yet
    Unapproved,

    /// Department head has signed; waiting on the managing director
    DeptApproved,

    /// Managing director has signed; waiting on the department head
    MdApproved,

    /// Both roles have signed; the month's pending requests release
    FullyApproved,
}

/// A month's dual-sign-off record
///
/// Created implicitly the first time a month is queried or signed.
///
/// # Example
/// ```
/// use advance_portal_core_rs::models::approval::{
///     ApprovalState, MonthlyApproval, Role, RoleApproval,
/// };
/// use advance_portal_core_rs::models::month::{Month, MonthKey};
///
/// let mut record = MonthlyApproval::new(MonthKey::new(Month::Mar, 2026));
/// assert_eq!(record.state(), ApprovalState::Unapproved);
///
/// record
///     .sign(Role::DeptHead, RoleApproval::now("within budget"))
///     .unwrap();
/// assert_eq!(record.state(), ApprovalState::DeptApproved);
///
/// record
///     .sign(Role::ManagingDirector, RoleApproval::now("release"))
///     .unwrap();
/// assert!(record.is_fully_approved());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyApproval {
    month: MonthKey,
    dept_head: Option<RoleApproval>,
    managing_director: Option<RoleApproval>,
}

impl MonthlyApproval {
    pub fn new(month: MonthKey) -> Self {
        Self {
            month,
            dept_head: None,
            managing_director: None,
        }
    }

    pub fn month(&self) -> MonthKey {
        self.month
    }

    pub fn dept_head(&self) -> Option<&RoleApproval> {
        self.dept_head.as_ref()
    }

    pub fn managing_director(&self) -> Option<&RoleApproval> {
        self.managing_director.as_ref()
    }

    /// Record a role's sign-off, overwriting any earlier one from the same
    /// role (idempotent per role)
    pub fn sign(&mut self, role: Role, approval: RoleApproval) -> Result<(), SignOffError> {
        match role {
            Role::DeptHead => self.dept_head = Some(approval),
            Role::ManagingDirector => self.managing_director = Some(approval),
            other => return Err(SignOffError::RoleCannotSign(other)),
        }
        Ok(())
    }

    pub fn state(&self) -> ApprovalState {
        match (&self.dept_head, &self.managing_director) {
            (None, None) => ApprovalState::Unapproved,
            (Some(_), None) => ApprovalState::DeptApproved,
            (None, Some(_)) => ApprovalState::MdApproved,
            (Some(_), Some(_)) => ApprovalState::FullyApproved,
        }
    }

    pub fn is_fully_approved(&self) -> bool {
        self.state() == ApprovalState::FullyApproved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::month::Month;

    fn record() -> MonthlyApproval {
        MonthlyApproval::new(MonthKey::new(Month::Mar, 2026))
    }

    #[test]
    fn test_signs_arrive_in_either_order() {
        let mut a = record();
        a.sign(Role::DeptHead, RoleApproval::at("ok", "t1")).unwrap();
        assert_eq!(a.state(), ApprovalState::DeptApproved);
        a.sign(Role::ManagingDirector, RoleApproval::at("ok", "t2"))
            .unwrap();
        assert!(a.is_fully_approved());

        let mut b = record();
        b.sign(Role::ManagingDirector, RoleApproval::at("ok", "t1"))
            .unwrap();
        assert_eq!(b.state(), ApprovalState::MdApproved);
        b.sign(Role::DeptHead, RoleApproval::at("ok", "t2")).unwrap();
        assert!(b.is_fully_approved());
    }

    #[test]
    fn test_resigning_overwrites_comment_and_timestamp() {
        let mut a = record();
        a.sign(Role::DeptHead, RoleApproval::at("first", "t1"))
            .unwrap();
        a.sign(Role::DeptHead, RoleApproval::at("second", "t2"))
            .unwrap();

        let dept = a.dept_head().unwrap();
        assert_eq!(dept.comment(), "second");
        assert_eq!(dept.timestamp(), "t2");
        // Still only one sign-off; the month is not fully approved
        assert_eq!(a.state(), ApprovalState::DeptApproved);
    }

    #[test]
    fn test_non_signing_roles_are_refused() {
        let mut a = record();
        let err = a
            .sign(Role::Admin, RoleApproval::at("nope", "t1"))
            .unwrap_err();
        assert_eq!(err, SignOffError::RoleCannotSign(Role::Admin));
        assert_eq!(a.state(), ApprovalState::Unapproved);
    }
}
