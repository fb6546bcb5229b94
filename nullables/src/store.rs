//! Nullable stores — thread-safe in-memory storage for testing.

use attest_store::audit::{AuditEvent, AuditEventKind, AuditSink};
use attest_store::media::{MediaHandle, MediaKind, MediaStore};
use attest_store::record::{AttemptRecord, RecordPatch, RecordStore};
use attest_store::StoreError;
use attest_types::AttemptId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// An in-memory media store for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullMediaStore {
    blobs: Mutex<HashMap<MediaHandle, Vec<u8>>>,
    fail_reads: AtomicBool,
}

impl NullMediaStore {
    pub fn new() -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `read` fail, to exercise fault paths.
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    /// Number of blobs currently held.
    pub fn blob_count(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    /// Whether any media for this attempt is still held.
    pub fn holds_media_for(&self, attempt: &AttemptId) -> bool {
        self.blobs
            .lock()
            .unwrap()
            .keys()
            .any(|h| h.attempt == *attempt)
    }
}

impl Default for NullMediaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaStore for NullMediaStore {
    fn save(
        &self,
        attempt: &AttemptId,
        kind: MediaKind,
        bytes: &[u8],
    ) -> Result<MediaHandle, StoreError> {
        let handle = MediaHandle {
            attempt: attempt.clone(),
            kind,
        };
        self.blobs
            .lock()
            .unwrap()
            .insert(handle.clone(), bytes.to_vec());
        Ok(handle)
    }

    fn read(&self, handle: &MediaHandle) -> Result<Vec<u8>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Io("simulated read failure".into()));
        }
        self.blobs
            .lock()
            .unwrap()
            .get(handle)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", handle.attempt, handle.kind)))
    }

    fn release(&self, attempt: &AttemptId) -> Result<(), StoreError> {
        self.blobs
            .lock()
            .unwrap()
            .retain(|h, _| h.attempt != *attempt);
        Ok(())
    }
}

/// An in-memory attempt record store for testing.
pub struct NullRecordStore {
    records: Mutex<HashMap<String, AttemptRecord>>,
}

impl NullRecordStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for NullRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for NullRecordStore {
    fn create(&self, record: &AttemptRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(record.id.as_str()) {
            return Err(StoreError::AlreadyExists(record.id.to_string()));
        }
        records.insert(record.id.to_string(), record.clone());
        Ok(())
    }

    fn update(&self, attempt: &AttemptId, patch: RecordPatch) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(attempt.as_str())
            .ok_or_else(|| StoreError::NotFound(attempt.to_string()))?;
        patch.apply(record);
        Ok(())
    }

    fn get(&self, attempt: &AttemptId) -> Result<AttemptRecord, StoreError> {
        self.records
            .lock()
            .unwrap()
            .get(attempt.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(attempt.to_string()))
    }
}

/// An audit sink that records events in memory for assertions.
pub struct NullAuditSink {
    events: Mutex<Vec<AuditEvent>>,
    fail_all: AtomicBool,
}

impl NullAuditSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail_all: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `record` fail, to verify auditing stays
    /// non-fatal.
    pub fn fail_all(&self) {
        self.fail_all.store(true, Ordering::SeqCst);
    }

    /// All events recorded so far.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }

    /// The kinds of all recorded events, in order.
    pub fn kinds(&self) -> Vec<AuditEventKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }
}

impl Default for NullAuditSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditSink for NullAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), StoreError> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(StoreError::Io("simulated audit failure".into()));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_store::record::AttemptStatus;
    use attest_types::Timestamp;

    #[test]
    fn media_save_read_release() {
        let store = NullMediaStore::new();
        let attempt = AttemptId::new("a1");
        let handle = store.save(&attempt, MediaKind::Document, b"img").unwrap();
        assert_eq!(store.read(&handle).unwrap(), b"img");

        store.release(&attempt).unwrap();
        assert!(store.read(&handle).is_err());
        assert!(!store.holds_media_for(&attempt));
    }

    #[test]
    fn media_read_failure_can_be_injected() {
        let store = NullMediaStore::new();
        let attempt = AttemptId::new("a2");
        let handle = store.save(&attempt, MediaKind::Document, b"img").unwrap();
        store.fail_reads();
        assert!(matches!(store.read(&handle), Err(StoreError::Io(_))));
    }

    #[test]
    fn record_create_then_update() {
        let store = NullRecordStore::new();
        let id = AttemptId::new("a3");
        store
            .create(&AttemptRecord::created(id.clone(), Timestamp::new(100)))
            .unwrap();

        store
            .update(&id, RecordPatch::status(AttemptStatus::Processing))
            .unwrap();
        assert_eq!(store.get(&id).unwrap().status, AttemptStatus::Processing);
    }

    #[test]
    fn record_create_twice_fails() {
        let store = NullRecordStore::new();
        let record = AttemptRecord::created(AttemptId::new("a4"), Timestamp::new(100));
        store.create(&record).unwrap();
        assert!(matches!(
            store.create(&record),
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[test]
    fn update_unknown_attempt_fails() {
        let store = NullRecordStore::new();
        let result = store.update(
            &AttemptId::new("missing"),
            RecordPatch::status(AttemptStatus::Failed),
        );
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn audit_records_kinds_in_order() {
        let sink = NullAuditSink::new();
        let attempt = AttemptId::new("a5");
        sink.record(&AuditEvent::new(
            AuditEventKind::AttemptStarted,
            attempt.clone(),
            serde_json::json!({}),
        ))
        .unwrap();
        sink.record(&AuditEvent::new(
            AuditEventKind::DecisionReached,
            attempt,
            serde_json::json!({"outcome": "verified"}),
        ))
        .unwrap();

        assert_eq!(
            sink.kinds(),
            vec![AuditEventKind::AttemptStarted, AuditEventKind::DecisionReached]
        );
    }
}
