//! Tier-based approval tests (the tiered policy)
//!
//! Requests route to exactly one tier by amount; each tier's credential
//! clears only its own band, and decisions are per-request.

use advance_portal_core_rs::approval::digest;
use advance_portal_core_rs::{
    ApprovalError, AuditAction, CommissionRecord, CredentialsConfig, Month, MonthKey,
    PolicyConfig, Portal, PortalConfig, PortalError, RecordingNotifier, RequestId,
    RequestStatus, Role, Tier,
};
use proptest::prelude::*;
use std::path::PathBuf;

fn mar() -> MonthKey {
    MonthKey::new(Month::Mar, 2026)
}

fn test_config(policy: PolicyConfig) -> PortalConfig {
    PortalConfig {
        checkpoint_path: PathBuf::from("unused_checkpoint.json"),
        ledger_source: None,
        policy,
        credentials: CredentialsConfig {
            admin: digest("admin-pass"),
            dept_head: digest("dept-pass"),
            managing_director: digest("md-pass"),
            payroll: digest("payroll-pass"),
        },
        mail: Default::default(),
    }
}

/// Tiered portal plus a request of the given amount, with a notifier handle
fn portal_with_request(amount: i64) -> (Portal, RecordingNotifier, RequestId) {
    let notifier = RecordingNotifier::new();
    let mut portal = Portal::new(
        test_config(PolicyConfig::Tiered),
        Box::new(notifier.clone()),
    );
    // Commission large enough that any test amount is within eligibility
    portal.ledger_mut().upsert(CommissionRecord::new(
        "A100".to_string(),
        "Jane Wanjiru".to_string(),
        mar(),
        Some(30_000_000),
    ));
    let id = portal
        .submit_request_for_month("A100", amount, mar())
        .unwrap();
    (portal, notifier, id)
}

#[test]
fn test_9999_is_auto_tier_only() {
    let (mut portal, _, id) = portal_with_request(999_900); // 9,999.00

    // Dept-head and MD calls refuse it
    let err = portal
        .approve_tier(Tier::DeptHead, id, "dept-pass", "10.0.0.1")
        .unwrap_err();
    assert!(matches!(
        err,
        PortalError::Approval(ApprovalError::WrongTier { .. })
    ));
    let err = portal
        .approve_tier(Tier::ManagingDirector, id, "md-pass", "10.0.0.1")
        .unwrap_err();
    assert!(matches!(
        err,
        PortalError::Approval(ApprovalError::WrongTier { .. })
    ));

    // The auto tier clears it
    portal
        .approve_tier(Tier::Auto, id, "admin-pass", "10.0.0.1")
        .unwrap();
    assert_eq!(
        portal.store().get_request(id).unwrap().status(),
        RequestStatus::Approved
    );
}

#[test]
fn test_10000_and_50000_are_dept_head_tier() {
    for amount in [1_000_000i64, 5_000_000] {
        let (mut portal, _, id) = portal_with_request(amount);

        assert!(matches!(
            portal
                .approve_tier(Tier::Auto, id, "admin-pass", "10.0.0.1")
                .unwrap_err(),
            PortalError::Approval(ApprovalError::WrongTier { .. })
        ));
        assert!(matches!(
            portal
                .approve_tier(Tier::ManagingDirector, id, "md-pass", "10.0.0.1")
                .unwrap_err(),
            PortalError::Approval(ApprovalError::WrongTier { .. })
        ));

        portal
            .approve_tier(Tier::DeptHead, id, "dept-pass", "10.0.0.1")
            .unwrap();
        assert_eq!(
            portal.store().get_request(id).unwrap().status(),
            RequestStatus::Approved
        );
    }
}

#[test]
fn test_50001_is_md_tier_only() {
    let (mut portal, _, id) = portal_with_request(5_000_100); // 50,001.00

    assert!(matches!(
        portal
            .approve_tier(Tier::DeptHead, id, "dept-pass", "10.0.0.1")
            .unwrap_err(),
        PortalError::Approval(ApprovalError::WrongTier { .. })
    ));

    portal
        .approve_tier(Tier::ManagingDirector, id, "md-pass", "10.0.0.1")
        .unwrap();
    assert_eq!(
        portal.store().get_request(id).unwrap().status(),
        RequestStatus::Approved
    );
}

#[test]
fn test_wrong_secret_is_credential_rejected_and_changes_nothing() {
    let (mut portal, notifier, id) = portal_with_request(500_000);

    let err = portal
        .approve_tier(Tier::Auto, id, "guess", "10.0.0.1")
        .unwrap_err();
    assert!(matches!(
        err,
        PortalError::Approval(ApprovalError::CredentialRejected { role: Role::Admin })
    ));
    assert_eq!(
        portal.store().get_request(id).unwrap().status(),
        RequestStatus::Pending
    );
    assert!(notifier.sent().is_empty());
    assert!(portal.audit_log().is_empty());
}

#[test]
fn test_approval_records_audit_and_notifies() {
    let (mut portal, notifier, id) = portal_with_request(500_000);

    let entry = portal
        .approve_tier(Tier::Auto, id, "admin-pass", "41.90.64.7")
        .unwrap();
    assert_eq!(entry.request_id(), id);
    assert_eq!(entry.agent_name(), "Jane Wanjiru");
    assert_eq!(entry.approver_role(), Role::Admin);
    assert_eq!(entry.origin_address(), "41.90.64.7");
    assert_eq!(entry.action(), AuditAction::Approved);

    assert_eq!(portal.audit_log().len(), 1);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].agent_code, "A100");
    assert_eq!(sent[0].month, mar());
}

#[test]
fn test_rejection_is_terminal_and_audited_without_notification() {
    let (mut portal, notifier, id) = portal_with_request(500_000);

    let entry = portal
        .reject_tier(Tier::Auto, id, "admin-pass", "41.90.64.7")
        .unwrap();
    assert_eq!(entry.action(), AuditAction::Rejected);
    assert_eq!(
        portal.store().get_request(id).unwrap().status(),
        RequestStatus::Rejected
    );
    assert!(notifier.sent().is_empty());

    // Terminal: neither approval nor a second rejection goes through
    assert!(matches!(
        portal
            .approve_tier(Tier::Auto, id, "admin-pass", "41.90.64.7")
            .unwrap_err(),
        PortalError::Approval(ApprovalError::AlreadyDecided { .. })
    ));
}

#[test]
fn test_double_approval_is_refused() {
    let (mut portal, _, id) = portal_with_request(500_000);
    portal
        .approve_tier(Tier::Auto, id, "admin-pass", "10.0.0.1")
        .unwrap();

    let err = portal
        .approve_tier(Tier::Auto, id, "admin-pass", "10.0.0.1")
        .unwrap_err();
    assert!(matches!(
        err,
        PortalError::Approval(ApprovalError::AlreadyDecided {
            status: RequestStatus::Approved,
            ..
        })
    ));
}

#[test]
fn test_unknown_request_id() {
    let (mut portal, _, _) = portal_with_request(500_000);
    let err = portal
        .approve_tier(Tier::Auto, 999, "admin-pass", "10.0.0.1")
        .unwrap_err();
    assert!(matches!(
        err,
        PortalError::Approval(ApprovalError::RequestNotFound(999))
    ));
}

#[test]
fn test_tier_operations_refused_under_dual_signoff_policy() {
    let notifier = RecordingNotifier::new();
    let mut portal = Portal::new(
        test_config(PolicyConfig::DualSignOff),
        Box::new(notifier),
    );
    let err = portal
        .approve_tier(Tier::Auto, 1, "admin-pass", "10.0.0.1")
        .unwrap_err();
    assert!(matches!(err, PortalError::PolicyNotActive { .. }));
}

#[test]
fn test_approvals_are_independent_across_requests() {
    let notifier = RecordingNotifier::new();
    let mut portal = Portal::new(
        test_config(PolicyConfig::Tiered),
        Box::new(notifier),
    );
    for code in ["A100", "A200"] {
        portal.ledger_mut().upsert(CommissionRecord::new(
            code.to_string(),
            format!("Agent {code}"),
            mar(),
            Some(3_000_000),
        ));
    }
    let first = portal
        .submit_request_for_month("A100", 500_000, mar())
        .unwrap();
    let second = portal
        .submit_request_for_month("A200", 600_000, mar())
        .unwrap();

    portal
        .approve_tier(Tier::Auto, first, "admin-pass", "10.0.0.1")
        .unwrap();

    assert_eq!(
        portal.store().get_request(first).unwrap().status(),
        RequestStatus::Approved
    );
    assert_eq!(
        portal.store().get_request(second).unwrap().status(),
        RequestStatus::Pending
    );
}

proptest! {
    /// Every amount classifies into exactly the band its value falls in
    #[test]
    fn prop_classification_bands(amount in 1i64..=100_000_000) {
        let tier = Tier::classify(amount);
        let expected = if amount < 1_000_000 {
            Tier::Auto
        } else if amount <= 5_000_000 {
            Tier::DeptHead
        } else {
            Tier::ManagingDirector
        };
        prop_assert_eq!(tier, expected);
    }
}
