//! Advance Portal Core - Rust Engine
//!
//! Fund-advance workflow for a sales agency: agents request cash advances
//! against their monthly commission, and requests move through a
//! configurable approval workflow before release.
//!
//! # Architecture
//!
//! - **models**: Domain types (CommissionRecord, FundRequest, MonthlyApproval)
//! - **ledger**: Commission table, eligibility calculation, batch import
//! - **store**: Request table, duplicate guard, monthly approvals, audit log
//! - **approval**: Credential verification and the two approval policies
//! - **notify**: Outcome notification seam
//! - **portal**: Façade wiring everything behind the client-facing operations
//! - **config**: Startup configuration (policy, credentials, paths, mail)
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (cents)
//! 2. At most one fund request per (agent, month); the store enforces it
//!    at insert time
//! 3. Status transitions happen only in the approval engine; notification
//!    failures never roll one back

// Module declarations
pub mod approval;
pub mod config;
pub mod ledger;
pub mod models;
pub mod notify;
pub mod portal;
pub mod store;

// Re-exports for convenience
pub use approval::{
    ApprovalError, CredentialVerifier, ReleaseOutcome, Tier, AUTO_TIER_LIMIT,
    DEPT_HEAD_TIER_LIMIT,
};
pub use config::{CredentialsConfig, MailConfig, PolicyConfig, PortalConfig};
pub use ledger::import::RefreshOutcome;
pub use ledger::{CommissionLedger, LedgerError};
pub use models::{
    ApprovalLevel, ApprovalState, AuditAction, AuditEntry, CommissionRecord, FundRequest,
    Month, MonthKey, MonthlyApproval, RequestId, RequestStatus, Role, RoleApproval,
};
pub use notify::{LoggingNotifier, Notifier, NotifyError, RecordingNotifier};
pub use portal::{Portal, PortalError};
pub use store::{RequestStore, StoreError, SubmitError};
