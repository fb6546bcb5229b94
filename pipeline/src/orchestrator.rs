//! Verification orchestrator — drives one attempt through extraction,
//! decision, and persistence.

use crate::config::PipelineConfig;
use crate::decision::decide;
use crate::error::PipelineError;
use crate::locks::AttemptLocks;
use attest_extract::{
    DocumentExtractor, FaceEngine, FaceExtractor, LivenessExtractor, OcrEngine,
};
use attest_media::MediaDecoder;
use attest_store::audit::{AuditEvent, AuditEventKind, AuditSink};
use attest_store::media::{MediaKind, MediaStore};
use attest_store::record::{AttemptRecord, AttemptStatus, RecordPatch, RecordStore};
use attest_types::{AttemptId, Decision, DecisionThresholds, LivenessMethod, Outcome, Timestamp};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::spawn_blocking;
use tracing::{info, warn};

/// One end-to-end verification request: a document image and a selfie video.
pub struct AttemptSubmission {
    pub attempt: AttemptId,
    pub document: Vec<u8>,
    pub selfie: Vec<u8>,
    pub method: LivenessMethod,
}

/// Releases an attempt's media on every exit path.
struct MediaLease<'a> {
    store: &'a dyn MediaStore,
    attempt: AttemptId,
}

impl Drop for MediaLease<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.store.release(&self.attempt) {
            warn!(attempt = %self.attempt, error = %e, "media release failed");
        }
    }
}

/// Ties the extractors, decision engine, and collaborators together.
///
/// Per attempt: `Created → Processing → {Completed, Failed}`. `Completed`
/// always carries a decision; `Failed` carries an error detail instead. An
/// extractor fault never fails an attempt (the failure-safe signal flows to
/// the decision engine); only faults outside the extractors do.
pub struct VerificationOrchestrator {
    media: Arc<dyn MediaStore>,
    records: Arc<dyn RecordStore>,
    audit: Arc<dyn AuditSink>,
    decoder: Arc<dyn MediaDecoder>,
    document: Arc<DocumentExtractor>,
    face: Arc<FaceExtractor>,
    liveness: Arc<LivenessExtractor>,
    thresholds: DecisionThresholds,
    locks: AttemptLocks,
}

impl VerificationOrchestrator {
    pub fn new(
        media: Arc<dyn MediaStore>,
        records: Arc<dyn RecordStore>,
        audit: Arc<dyn AuditSink>,
        decoder: Arc<dyn MediaDecoder>,
        ocr: Arc<dyn OcrEngine>,
        engine: Arc<dyn FaceEngine>,
        config: &PipelineConfig,
    ) -> Self {
        let params = &config.params;
        Self {
            media,
            records,
            audit,
            decoder,
            document: Arc::new(DocumentExtractor::new(ocr, params.document)),
            face: Arc::new(FaceExtractor::new(engine.clone(), params.face)),
            liveness: Arc::new(LivenessExtractor::new(engine, params.liveness)),
            thresholds: params.thresholds,
            locks: AttemptLocks::new(config.max_concurrent_attempts),
        }
    }

    /// Run one verification attempt to a terminal state.
    ///
    /// Returns the decision on `Completed`; an `Err` means the attempt ended
    /// `Failed` (the record carries `processing_error: <detail>`). Work on
    /// the same attempt id is serialized.
    pub async fn run(&self, submission: AttemptSubmission) -> Result<Decision, PipelineError> {
        let attempt = submission.attempt.clone();
        let guard = self.locks.acquire(&attempt).await?;
        let started = Instant::now();

        self.records
            .create(&AttemptRecord::created(attempt.clone(), Timestamp::now()))?;
        self.record_audit(
            AuditEventKind::AttemptStarted,
            &attempt,
            json!({ "method": submission.method.to_string() }),
        );

        let lease = MediaLease {
            store: self.media.as_ref(),
            attempt: attempt.clone(),
        };

        let result = self.process(&submission, started).await;
        drop(lease);

        let outcome = match result {
            Ok(decision) => {
                info!(attempt = %attempt, outcome = %decision.outcome, "attempt completed");
                Ok(decision)
            }
            Err(e) => {
                let detail = format!("processing_error: {e}");
                warn!(attempt = %attempt, error = %e, "attempt failed");
                let patch = RecordPatch {
                    status: Some(AttemptStatus::Failed),
                    decision: Some(Outcome::Rejected),
                    decision_reason: Some(detail.clone()),
                    processing_time_secs: Some(started.elapsed().as_secs_f64()),
                    error: Some(e.to_string()),
                    ..RecordPatch::default()
                };
                if let Err(store_err) = self.records.update(&attempt, patch) {
                    warn!(attempt = %attempt, error = %store_err, "failed-state update lost");
                }
                self.record_audit(
                    AuditEventKind::AttemptFailed,
                    &attempt,
                    json!({ "error": e.to_string() }),
                );
                Err(e)
            }
        };

        // Prune the lock entry so the map stays bounded by in-flight work.
        drop(guard);
        self.locks.cleanup().await;
        outcome
    }

    /// Latest committed state of an attempt.
    pub fn status(&self, attempt: &AttemptId) -> Result<AttemptRecord, PipelineError> {
        Ok(self.records.get(attempt)?)
    }

    /// Attempt ids currently holding a lock entry.
    pub async fn in_flight_attempts(&self) -> usize {
        self.locks.tracked_attempts().await
    }

    async fn process(
        &self,
        submission: &AttemptSubmission,
        started: Instant,
    ) -> Result<Decision, PipelineError> {
        let attempt = &submission.attempt;

        let doc_handle = self
            .media
            .save(attempt, MediaKind::Document, &submission.document)?;
        let selfie_handle = self
            .media
            .save(attempt, MediaKind::SelfieVideo, &submission.selfie)?;
        self.records
            .update(attempt, RecordPatch::status(AttemptStatus::Processing))?;

        let doc_bytes = self.media.read(&doc_handle)?;
        let selfie_bytes = self.media.read(&selfie_handle)?;

        let doc_image = self.decoder.decode_image(&doc_bytes)?;
        let mut face_source = self.decoder.open_video(&selfie_bytes)?;
        let mut liveness_source = self.decoder.open_video(&selfie_bytes)?;

        // Document analysis, the two face extractions, and liveness have no
        // data dependency on each other; comparison and decide join on them.
        let document = Arc::clone(&self.document);
        let doc_face_extractor = Arc::clone(&self.face);
        let selfie_face_extractor = Arc::clone(&self.face);
        let liveness_extractor = Arc::clone(&self.liveness);
        let face_image = doc_image.clone();
        let method = submission.method;

        let (doc_signal, doc_face, selfie_face, liveness_signal) = tokio::join!(
            spawn_blocking(move || document.analyze(&doc_image)),
            spawn_blocking(move || doc_face_extractor.from_document(&face_image)),
            spawn_blocking(move || selfie_face_extractor.from_selfie(face_source.as_mut())),
            spawn_blocking(move || liveness_extractor.assess(liveness_source.as_mut(), method)),
        );
        let doc_signal = doc_signal?;
        let doc_face = doc_face?;
        let selfie_face = selfie_face?;
        let liveness_signal = liveness_signal?;

        let match_signal = FaceExtractor::compare(&doc_face, &selfie_face);

        self.record_audit(
            AuditEventKind::SignalExtracted,
            attempt,
            json!({
                "component": "document",
                "kind": doc_signal.kind.to_string(),
                "valid": doc_signal.valid,
                "confidence": doc_signal.confidence,
            }),
        );
        self.record_audit(
            AuditEventKind::SignalExtracted,
            attempt,
            json!({
                "component": "face",
                "document_face": doc_face.detected,
                "selfie_face": selfie_face.detected,
                "similarity": match_signal.similarity,
            }),
        );
        self.record_audit(
            AuditEventKind::SignalExtracted,
            attempt,
            json!({
                "component": "liveness",
                "method": liveness_signal.method.to_string(),
                "passed": liveness_signal.passed,
                "score": liveness_signal.score,
            }),
        );

        // The document face is the one the decision keys on; a missing
        // selfie face surfaces as zero similarity and is caught by the
        // face-match branch.
        let mut decision = decide(
            &doc_signal,
            &doc_face,
            &match_signal,
            &liveness_signal,
            &self.thresholds,
        );
        decision.processing_time_secs = started.elapsed().as_secs_f64();

        self.records.update(
            attempt,
            RecordPatch {
                status: Some(AttemptStatus::Completed),
                document_valid: Some(doc_signal.valid),
                face_match_score: Some(match_signal.similarity),
                liveness_score: Some(liveness_signal.score),
                decision: Some(decision.outcome),
                decision_reason: Some(decision.reason.clone()),
                processing_time_secs: Some(decision.processing_time_secs),
                error: None,
            },
        )?;
        self.record_audit(
            AuditEventKind::DecisionReached,
            attempt,
            json!({
                "outcome": decision.outcome.to_string(),
                "reason": decision.reason,
                "processing_time_secs": decision.processing_time_secs,
            }),
        );

        Ok(decision)
    }

    /// Fire-and-forget audit write; sink failure never fails the attempt.
    fn record_audit(&self, kind: AuditEventKind, attempt: &AttemptId, details: serde_json::Value) {
        let event = AuditEvent::new(kind, attempt.clone(), details);
        if let Err(e) = self.audit.record(&event) {
            warn!(attempt = %attempt, kind = ?kind, error = %e, "audit sink failure");
        }
    }
}
