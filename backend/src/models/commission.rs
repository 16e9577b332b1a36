//! Commission record model
//!
//! One row of the commission ledger: an agent's earned commission for one
//! calendar month, plus the contact and placement metadata the import
//! source carries. Records are owned and mutated exclusively by the ledger
//! importer; the workflow only reads them.
//!
//! The amount is `Option<i64>` cents: the import source sometimes ships a
//! row with the amount column blank, and eligibility must surface that as
//! "data incomplete" rather than "no such agent".
//!
//! CRITICAL: All money values are i64 (cents)

use crate::models::month::MonthKey;
use serde::{Deserialize, Serialize};

/// An agent's commission for one month
///
/// Identity is (agent_code, month); the ledger keys on that pair.
///
/// # Example
/// ```
/// use advance_portal_core_rs::models::commission::CommissionRecord;
/// use advance_portal_core_rs::models::month::{Month, MonthKey};
///
/// let record = CommissionRecord::new(
///     "A100".to_string(),
///     "Jane Wanjiru".to_string(),
///     MonthKey::new(Month::Mar, 2026),
///     Some(3_000_000), // Ksh 30,000.00 in cents
/// );
/// assert_eq!(record.amount(), Some(3_000_000));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionRecord {
    /// Agent identifier (e.g., "A100")
    agent_code: String,

    /// Agent display name
    agent_name: String,

    /// Month the commission was earned in
    month: MonthKey,

    /// Commission amount (i64 cents); None when the source row was blank
    amount: Option<i64>,

    /// Contact phone number
    tel_no: Option<String>,

    /// Contact email, used by the notification collaborator
    email: Option<String>,

    /// Sales unit
    unit: Option<String>,

    /// Agency the agent sells under
    agency: Option<String>,

    /// Region the agency operates in
    region: Option<String>,
}

impl CommissionRecord {
    /// Create a record with the identity and amount fields only
    pub fn new(
        agent_code: String,
        agent_name: String,
        month: MonthKey,
        amount: Option<i64>,
    ) -> Self {
        Self {
            agent_code,
            agent_name,
            month,
            amount,
            tel_no: None,
            email: None,
            unit: None,
            agency: None,
            region: None,
        }
    }

    /// Attach contact and placement metadata (builder pattern)
    pub fn with_metadata(
        mut self,
        tel_no: Option<String>,
        email: Option<String>,
        unit: Option<String>,
        agency: Option<String>,
        region: Option<String>,
    ) -> Self {
        self.tel_no = tel_no;
        self.email = email;
        self.unit = unit;
        self.agency = agency;
        self.region = region;
        self
    }

    pub fn agent_code(&self) -> &str {
        &self.agent_code
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn month(&self) -> MonthKey {
        self.month
    }

    /// Commission amount in cents, None when the source row was incomplete
    pub fn amount(&self) -> Option<i64> {
        self.amount
    }

    pub fn tel_no(&self) -> Option<&str> {
        self.tel_no.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn agency(&self) -> Option<&str> {
        self.agency.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::month::Month;

    #[test]
    fn test_metadata_builder() {
        let record = CommissionRecord::new(
            "A100".to_string(),
            "Jane Wanjiru".to_string(),
            MonthKey::new(Month::Mar, 2026),
            Some(3_000_000),
        )
        .with_metadata(
            Some("0700000000".to_string()),
            Some("jane@example.com".to_string()),
            Some("Unit 4".to_string()),
            Some("Upper Hill".to_string()),
            Some("Nairobi".to_string()),
        );

        assert_eq!(record.email(), Some("jane@example.com"));
        assert_eq!(record.region(), Some("Nairobi"));
    }

    #[test]
    fn test_blank_amount_is_representable() {
        let record = CommissionRecord::new(
            "A200".to_string(),
            "Otieno O.".to_string(),
            MonthKey::new(Month::Mar, 2026),
            None,
        );
        assert_eq!(record.amount(), None);
    }
}
