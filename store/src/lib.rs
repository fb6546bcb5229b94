//! Collaborator interfaces consumed by the attest pipeline.
//!
//! The orchestrator talks to the outside world through three narrow traits:
//! a [`MediaStore`] for uploaded media, a [`RecordStore`] for attempt state,
//! and an [`AuditSink`] for the audit trail. Every backend (filesystem,
//! database, in-memory for testing) implements these traits; the pipeline
//! depends only on the traits.

pub mod audit;
pub mod error;
pub mod media;
pub mod record;
pub mod temp_media;

pub use audit::{AuditEvent, AuditEventKind, AuditSink};
pub use error::StoreError;
pub use media::{MediaHandle, MediaKind, MediaStore};
pub use record::{AttemptRecord, AttemptStatus, RecordPatch, RecordStore};
pub use temp_media::TempMediaStore;
