//! Approver credential verification.
//!
//! Secrets are never stored or compared in cleartext. Configuration
//! carries one SHA-256 digest per role; a presented secret is hashed and
//! compared against the stored digest. A mismatch is terminal for that
//! call — there is no retry counting and no lockout state.

use crate::approval::ApprovalError;
use crate::models::approval::Role;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Hex-encoded SHA-256 digest of a secret
pub fn digest(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Per-role credential table
#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    digests: HashMap<Role, String>,
}

impl CredentialVerifier {
    /// Build a verifier from per-role digests (hex SHA-256)
    pub fn new(digests: HashMap<Role, String>) -> Self {
        Self { digests }
    }

    /// Check a presented secret against a role's stored digest
    ///
    /// A role with no configured digest rejects every secret.
    pub fn verify(&self, role: Role, secret: &str) -> Result<(), ApprovalError> {
        let expected = self
            .digests
            .get(&role)
            .ok_or(ApprovalError::CredentialRejected { role })?;
        if digest(secret) != *expected {
            return Err(ApprovalError::CredentialRejected { role });
        }
        Ok(())
    }
}
