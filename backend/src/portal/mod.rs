//! Portal façade
//!
//! Owns the commission ledger, the request store, the credential verifier,
//! and the notifier, and exposes the client-facing operations: eligibility
//! checks, request submission, history views, the privileged full listing,
//! the approval operations of whichever policy is configured, ledger
//! refresh, and checkpoint save/load.
//!
//! Every mutating operation takes `&mut self`: the portal is a
//! single-writer system driven by short-lived request/response
//! interactions, and holding the one mutable handle is what serializes
//! them.
//!
//! The public entry points key on the current wall-clock month; each has a
//! `*_for_month` twin taking an explicit [`MonthKey`] so the workflow is
//! deterministic under test.

use crate::approval::{self, ApprovalError, CredentialVerifier, ReleaseOutcome, Tier};
use crate::config::{PolicyConfig, PortalConfig};
use crate::ledger::import::{self, ImportError, RefreshOutcome};
use crate::ledger::{CommissionLedger, LedgerError};
use crate::models::approval::Role;
use crate::models::audit::AuditEntry;
use crate::models::month::MonthKey;
use crate::models::request::{FundRequest, RequestId};
use crate::notify::Notifier;
use crate::store::checkpoint::{self, CheckpointError};
use crate::store::{RequestStore, SubmitError};
use thiserror::Error;
use tracing::info;

/// Errors surfaced at the portal boundary
///
/// Everything here is recoverable: the caller shows a message and the
/// portal keeps serving.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Submission error: {0}")]
    Submit(#[from] SubmitError),

    #[error("Approval error: {0}")]
    Approval(#[from] ApprovalError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("Requested amount {requested} is out of range (eligible up to {eligible})")]
    AmountOutOfRange { requested: i64, eligible: i64 },

    #[error("Operation {operation:?} belongs to a policy this portal does not run")]
    PolicyNotActive { operation: &'static str },

    #[error("No commission source is configured")]
    NoLedgerSource,
}

/// The running portal
pub struct Portal {
    config: PortalConfig,
    ledger: CommissionLedger,
    store: RequestStore,
    verifier: CredentialVerifier,
    notifier: Box<dyn Notifier>,
}

impl Portal {
    /// A fresh portal with an empty ledger and store
    pub fn new(config: PortalConfig, notifier: Box<dyn Notifier>) -> Self {
        let verifier = CredentialVerifier::new(config.credentials.digests());
        Self {
            config,
            ledger: CommissionLedger::new(),
            store: RequestStore::new(),
            verifier,
            notifier,
        }
    }

    /// Restore a portal from its checkpoint, or start fresh if none exists
    pub fn load_or_new(
        config: PortalConfig,
        notifier: Box<dyn Notifier>,
    ) -> Result<Self, PortalError> {
        if !config.checkpoint_path.exists() {
            info!(path = %config.checkpoint_path.display(), "no checkpoint, starting fresh");
            return Ok(Self::new(config, notifier));
        }
        let (ledger, store) = checkpoint::load(&config.checkpoint_path)?;
        let verifier = CredentialVerifier::new(config.credentials.digests());
        Ok(Self {
            config,
            ledger,
            store,
            verifier,
            notifier,
        })
    }

    /// Persist the current state to the configured checkpoint path
    pub fn save_checkpoint(&self) -> Result<(), PortalError> {
        checkpoint::save(&self.config.checkpoint_path, &self.ledger, &self.store)?;
        Ok(())
    }

    // =========================================================================
    // Agent-facing operations
    // =========================================================================

    /// Maximum advance the agent may request this month (i64 cents)
    pub fn check_eligibility(&self, agent_code: &str) -> Result<i64, PortalError> {
        self.eligibility_for(agent_code, MonthKey::current())
    }

    pub fn eligibility_for(
        &self,
        agent_code: &str,
        month: MonthKey,
    ) -> Result<i64, PortalError> {
        Ok(self.ledger.eligible_amount(agent_code, month)?)
    }

    /// Whether the agent already has a request for the current month
    pub fn has_request_this_month(&self, agent_code: &str) -> bool {
        self.has_request_for_month(agent_code, MonthKey::current())
    }

    /// Whether the agent already has a request for a given month
    pub fn has_request_for_month(&self, agent_code: &str, month: MonthKey) -> bool {
        self.store.has_request_for(agent_code, month)
    }

    /// Submit an advance request for the current month
    pub fn submit_request(
        &mut self,
        agent_code: &str,
        requested_amount: i64,
    ) -> Result<RequestId, PortalError> {
        self.submit_request_for_month(agent_code, requested_amount, MonthKey::current())
    }

    /// Submit an advance request for an explicit month
    ///
    /// Validation order: the agent must have a usable commission record,
    /// the amount must be within (0, eligible], and the month must not
    /// already hold a request from this agent. Only then is a Pending row
    /// written; a failed submission writes nothing.
    pub fn submit_request_for_month(
        &mut self,
        agent_code: &str,
        requested_amount: i64,
        month: MonthKey,
    ) -> Result<RequestId, PortalError> {
        let record = self.ledger.lookup(agent_code, month)?;
        let agent_name = record.agent_name().to_string();
        let eligible = self.ledger.eligible_amount(agent_code, month)?;

        if requested_amount <= 0 || requested_amount > eligible {
            return Err(PortalError::AmountOutOfRange {
                requested: requested_amount,
                eligible,
            });
        }

        // Early duplicate feedback; submit() re-checks under the same
        // borrow and is the authority
        if self.store.has_request_for(agent_code, month) {
            return Err(SubmitError::DuplicateRequest {
                agent_code: agent_code.to_string(),
                month,
            }
            .into());
        }

        let id = self
            .store
            .submit(agent_code, &agent_name, month, requested_amount)?;
        info!(id, agent_code, %month, requested_amount, "fund request submitted");
        Ok(id)
    }

    /// The agent's own request history, most recent month first
    pub fn my_history(&self, agent_code: &str) -> Vec<FundRequest> {
        self.store.get(agent_code).into_iter().cloned().collect()
    }

    /// The agent's per-month requested totals, most recent month first
    pub fn my_monthly_totals(&self, agent_code: &str) -> Vec<(MonthKey, i64)> {
        self.store.monthly_totals(agent_code)
    }

    // =========================================================================
    // Privileged operations
    // =========================================================================

    /// Full request table (payroll credential required)
    pub fn list_all(&self, payroll_secret: &str) -> Result<Vec<FundRequest>, PortalError> {
        self.verifier.verify(Role::Payroll, payroll_secret)?;
        Ok(self.store.list_all().into_iter().cloned().collect())
    }

    /// Approve one request under a tier credential (tiered policy)
    pub fn approve_tier(
        &mut self,
        tier: Tier,
        request_id: RequestId,
        secret: &str,
        origin: &str,
    ) -> Result<AuditEntry, PortalError> {
        self.require_policy(PolicyConfig::Tiered, "approve_tier")?;
        Ok(approval::tier::approve(
            &mut self.store,
            &self.verifier,
            self.notifier.as_ref(),
            tier,
            request_id,
            secret,
            origin,
        )?)
    }

    /// Reject one request under a tier credential (tiered policy)
    pub fn reject_tier(
        &mut self,
        tier: Tier,
        request_id: RequestId,
        secret: &str,
        origin: &str,
    ) -> Result<AuditEntry, PortalError> {
        self.require_policy(PolicyConfig::Tiered, "reject_tier")?;
        Ok(approval::tier::reject(
            &mut self.store,
            &self.verifier,
            tier,
            request_id,
            secret,
            origin,
        )?)
    }

    /// Sum still awaiting decision for a month (any policy; read-only)
    pub fn total_requested(&self, month: MonthKey) -> i64 {
        self.store.total_requested(month)
    }

    /// Sign a month's aggregate (dual-sign-off policy)
    pub fn approve_total(
        &mut self,
        month: MonthKey,
        role: Role,
        secret: &str,
        comment: &str,
    ) -> Result<ReleaseOutcome, PortalError> {
        self.require_policy(PolicyConfig::DualSignOff, "approve_total")?;
        Ok(approval::dual::approve_total(
            &mut self.store,
            &self.verifier,
            self.notifier.as_ref(),
            month,
            role,
            secret,
            comment,
        )?)
    }

    // =========================================================================
    // Ledger refresh
    // =========================================================================

    /// Re-import the commission source if its content changed
    pub fn refresh_ledger(&mut self) -> Result<RefreshOutcome, PortalError> {
        let source = self
            .config
            .ledger_source
            .clone()
            .ok_or(PortalError::NoLedgerSource)?;
        Ok(import::refresh_from_path(&mut self.ledger, &source)?)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn store(&self) -> &RequestStore {
        &self.store
    }

    pub fn ledger(&self) -> &CommissionLedger {
        &self.ledger
    }

    /// Mutable ledger handle, for seeding state in tests and tools
    pub fn ledger_mut(&mut self) -> &mut CommissionLedger {
        &mut self.ledger
    }

    /// The decision trail, oldest first
    pub fn audit_log(&self) -> &[AuditEntry] {
        self.store.audit_log()
    }

    fn require_policy(
        &self,
        wanted: PolicyConfig,
        operation: &'static str,
    ) -> Result<(), PortalError> {
        if self.config.policy != wanted {
            return Err(PortalError::PolicyNotActive { operation });
        }
        Ok(())
    }
}
