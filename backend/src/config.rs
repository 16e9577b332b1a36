//! Portal configuration
//!
//! Everything the portal needs to run is resolved once at startup from a
//! TOML file: where the checkpoint lives, where the commission source is,
//! which approval policy is active, the per-role credential digests, and
//! the mail-transport settings handed to the notification collaborator.
//! Nothing here is global or mutable at runtime.

use crate::models::approval::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Which approval policy this portal runs
///
/// Exactly one policy is active per running portal; operations belonging
/// to the other policy are refused rather than silently mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyConfig {
    /// Per-request approval, routed by amount tier
    Tiered,

    /// Month-level aggregate release after two sign-offs
    DualSignOff,
}

/// Per-role credential digests (hex SHA-256, never cleartext)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialsConfig {
    pub admin: String,
    pub dept_head: String,
    pub managing_director: String,
    pub payroll: String,
}

impl CredentialsConfig {
    /// The digest table the credential verifier is built from
    pub fn digests(&self) -> HashMap<Role, String> {
        HashMap::from([
            (Role::Admin, self.admin.clone()),
            (Role::DeptHead, self.dept_head.clone()),
            (Role::ManagingDirector, self.managing_director.clone()),
            (Role::Payroll, self.payroll.clone()),
        ])
    }
}

/// Settings for the external mail-transport collaborator
///
/// The core never opens a socket; these are passed through to whatever
/// delivers the notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from_address: String,
    pub subject_template: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            from_address: "advances@example.com".to_string(),
            subject_template: "Fund Request Approved for {month}".to_string(),
        }
    }
}

/// Complete portal configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Where portal state persists between runs
    pub checkpoint_path: PathBuf,

    /// Commission source file for ledger refresh, if one is wired up
    #[serde(default)]
    pub ledger_source: Option<PathBuf>,

    /// The active approval policy
    pub policy: PolicyConfig,

    pub credentials: CredentialsConfig,

    #[serde(default)]
    pub mail: MailConfig,
}

impl PortalConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
checkpoint_path = "portal_state.json"
ledger_source = "commissions.csv"
policy = "dual_sign_off"

[credentials]
admin = "aaaa"
dept_head = "bbbb"
managing_director = "cccc"
payroll = "dddd"

[mail]
smtp_host = "smtp.example.com"
smtp_port = 587
from_address = "advances@agency.example"
subject_template = "Fund Request Approved for {month}"
"#;

    #[test]
    fn test_parse_full_config() {
        let config = PortalConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.policy, PolicyConfig::DualSignOff);
        assert_eq!(
            config.ledger_source.as_deref(),
            Some(Path::new("commissions.csv"))
        );
        assert_eq!(config.mail.smtp_host, "smtp.example.com");
        assert_eq!(config.credentials.digests().len(), 4);
    }

    #[test]
    fn test_mail_and_ledger_source_are_optional() {
        let minimal = r#"
checkpoint_path = "portal_state.json"
policy = "tiered"

[credentials]
admin = "aaaa"
dept_head = "bbbb"
managing_director = "cccc"
payroll = "dddd"
"#;
        let config = PortalConfig::from_toml_str(minimal).unwrap();
        assert_eq!(config.policy, PolicyConfig::Tiered);
        assert!(config.ledger_source.is_none());
        assert_eq!(config.mail, MailConfig::default());
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let bad = r#"
checkpoint_path = "x.json"
policy = "rubber_stamp"

[credentials]
admin = "a"
dept_head = "b"
managing_director = "c"
payroll = "d"
"#;
        assert!(PortalConfig::from_toml_str(bad).is_err());
    }
}
