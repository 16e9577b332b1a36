//! Outcome notification seam.
//!
//! Delivery (SMTP or otherwise) belongs to an external collaborator; the
//! portal only knows this narrow interface. Notifications are
//! fire-and-forget: the approval engine logs a failed send and moves on —
//! a delivery problem never rolls back an approval that has already
//! committed.

use crate::models::month::MonthKey;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::info;

/// Errors a notifier implementation may report
#[derive(Debug, Error, PartialEq)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Delivers approval-outcome messages to agents
pub trait Notifier {
    fn notify(
        &self,
        agent_name: &str,
        agent_code: &str,
        month: MonthKey,
    ) -> Result<(), NotifyError>;
}

/// Default notifier: writes the outcome to the log
///
/// Stands in wherever no transport collaborator is wired up (CLI runs,
/// development).
#[derive(Debug, Default)]
pub struct LoggingNotifier;

impl Notifier for LoggingNotifier {
    fn notify(
        &self,
        agent_name: &str,
        agent_code: &str,
        month: MonthKey,
    ) -> Result<(), NotifyError> {
        info!(agent_code, agent_name, %month, "fund request approved, notifying agent");
        Ok(())
    }
}

/// A notification captured by [`RecordingNotifier`]
#[derive(Debug, Clone, PartialEq)]
pub struct SentNotification {
    pub agent_name: String,
    pub agent_code: String,
    pub month: MonthKey,
}

/// Test notifier that records every send
///
/// Clones share the same record, so a test can keep a handle while the
/// portal owns the boxed original. Optionally fails every call, for
/// exercising the swallow-and-log path.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<SentNotification>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every send fails
    pub fn failing() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    /// Everything sent so far
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(
        &self,
        agent_name: &str,
        agent_code: &str,
        month: MonthKey,
    ) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(SentNotification {
            agent_name: agent_name.to_string(),
            agent_code: agent_code.to_string(),
            month,
        });
        if self.fail {
            return Err(NotifyError::Delivery("recording notifier set to fail".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::month::Month;

    #[test]
    fn test_recording_notifier_captures_sends() {
        let notifier = RecordingNotifier::new();
        let month = MonthKey::new(Month::Mar, 2026);
        notifier.notify("Jane Wanjiru", "A100", month).unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].agent_code, "A100");
        assert_eq!(sent[0].month, month);
    }

    #[test]
    fn test_failing_notifier_still_records() {
        let notifier = RecordingNotifier::failing();
        let month = MonthKey::new(Month::Mar, 2026);
        assert!(notifier.notify("Jane", "A100", month).is_err());
        assert_eq!(notifier.sent().len(), 1);
    }
}
