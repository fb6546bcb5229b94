//! Audit trail sink.

use crate::StoreError;
use attest_types::{AttemptId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventKind {
    AttemptStarted,
    SignalExtracted,
    DecisionReached,
    AttemptFailed,
}

/// One audit trail entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub kind: AuditEventKind,
    pub attempt: AttemptId,
    /// Structured event detail (component name, scores, reasons).
    pub details: Value,
    pub at: Timestamp,
}

impl AuditEvent {
    pub fn new(kind: AuditEventKind, attempt: AttemptId, details: Value) -> Self {
        Self {
            kind,
            attempt,
            details,
            at: Timestamp::now(),
        }
    }
}

/// Fire-and-forget audit recording.
///
/// A failure to audit must never fail the verification attempt; the
/// orchestrator logs sink errors and moves on.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent) -> Result<(), StoreError>;
}
