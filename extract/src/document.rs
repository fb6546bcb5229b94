//! Document analysis: type classification, field extraction, validity.

use crate::error::ExtractError;
use crate::ocr::OcrEngine;
use attest_media::Frame;
use attest_types::{DocumentKind, DocumentParams, DocumentSignal, Score};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

// ── Field patterns ──────────────────────────────────────────────────────

static PASSPORT_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z]\d{8})").unwrap());
static PASSPORT_NUMBER_STRICT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]\d{8}$").unwrap());
static SURNAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)SURNAME:\s*(\S[^\n\r]*)").unwrap());
static GIVEN_NAMES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)GIVEN NAMES:\s*(\S[^\n\r]*)").unwrap());
static LONG_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2}\s+[A-Z]{3}\s+\d{4})").unwrap());
static ID_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ID[\s:]*([A-Z0-9\-]+)").unwrap());
static ID_NUMBER_STRICT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9\-]{6,}$").unwrap());
static CARD_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)NAME[\s:]*(\S[^\n\r]*)").unwrap());
static CARD_DOB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:DOB|BIRTH)[\s:]*(\S[^\n\r]*)").unwrap());

/// Analyzes an identity document image into a [`DocumentSignal`].
///
/// Classification is purely geometric (aspect ratio); field extraction runs
/// type-specific patterns over the injected [`OcrEngine`]'s text stream.
pub struct DocumentExtractor {
    ocr: Arc<dyn OcrEngine>,
    params: DocumentParams,
}

impl DocumentExtractor {
    pub fn new(ocr: Arc<dyn OcrEngine>, params: DocumentParams) -> Self {
        Self { ocr, params }
    }

    /// Analyze a document image. Never fails: any internal fault yields the
    /// failure-safe signal with the fault recorded in `note`.
    pub fn analyze(&self, image: &Frame) -> DocumentSignal {
        match self.try_analyze(image) {
            Ok(signal) => signal,
            Err(e) => {
                warn!(error = %e, "document analysis fault, returning failure-safe signal");
                DocumentSignal::failure_safe(e.to_string())
            }
        }
    }

    /// Analyze with typed faults, for callers that need to distinguish
    /// "invalid document" from "the OCR engine crashed".
    pub fn try_analyze(&self, image: &Frame) -> Result<DocumentSignal, ExtractError> {
        let kind = classify_kind(image.aspect_ratio());
        let text = self.ocr.recognize(image)?;
        let fields = parse_fields(&text, kind);
        let (valid, confidence) = self.validate(&fields, kind);

        Ok(DocumentSignal {
            kind,
            valid,
            confidence,
            fields,
            note: None,
        })
    }

    /// Validity confidence: weighted required-field completeness plus the
    /// format score of the primary identifier.
    fn validate(&self, fields: &BTreeMap<String, String>, kind: DocumentKind) -> (bool, Score) {
        let required = required_fields(kind);
        let completeness = if required.is_empty() {
            0.0
        } else {
            let present = required
                .iter()
                .filter(|f| fields.get(**f).is_some_and(|v| !v.is_empty()))
                .count();
            present as f64 / required.len() as f64
        };

        let format = primary_identifier_format_score(fields, kind);
        let confidence = Score::clamped(
            completeness * self.params.completeness_weight + format * self.params.format_weight,
        );
        let valid = confidence.value() >= self.params.validity_threshold;
        (valid, confidence)
    }
}

/// Classify document type from the image aspect ratio.
///
/// The bands overlap (1.5–1.7 is both passport- and license-shaped); the
/// passport band is checked first, matching how physical documents skew.
pub fn classify_kind(aspect_ratio: f64) -> DocumentKind {
    if (1.4..=1.7).contains(&aspect_ratio) {
        DocumentKind::Passport
    } else if (0.6..=0.8).contains(&aspect_ratio) {
        DocumentKind::NationalId
    } else if (1.5..=1.8).contains(&aspect_ratio) {
        DocumentKind::DriversLicense
    } else {
        DocumentKind::Unknown
    }
}

fn required_fields(kind: DocumentKind) -> &'static [&'static str] {
    match kind {
        DocumentKind::Passport => &["passport_number", "full_name", "date_of_birth"],
        DocumentKind::NationalId | DocumentKind::DriversLicense => {
            &["id_number", "full_name", "date_of_birth"]
        }
        DocumentKind::Unknown => &[],
    }
}

fn parse_fields(text: &str, kind: DocumentKind) -> BTreeMap<String, String> {
    match kind {
        DocumentKind::Passport => parse_passport(text),
        DocumentKind::NationalId | DocumentKind::DriversLicense => parse_id_card(text),
        DocumentKind::Unknown => BTreeMap::new(),
    }
}

fn parse_passport(text: &str) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();

    for line in text.lines() {
        let line = line.trim();
        let upper = line.to_uppercase();

        if upper.contains("PASSPORT NO:") || upper.contains("PASS NO:") {
            if let Some(m) = PASSPORT_NUMBER.captures(&upper) {
                fields.insert("passport_number".into(), m[1].to_string());
            }
        } else if upper.starts_with("SURNAME:") {
            if let Some(m) = SURNAME.captures(line) {
                fields.insert("surname".into(), m[1].trim().to_string());
            }
        } else if upper.starts_with("GIVEN NAMES:") {
            if let Some(m) = GIVEN_NAMES.captures(line) {
                fields.insert("given_names".into(), m[1].trim().to_string());
            }
        } else if upper.contains("DATE OF BIRTH:") || upper.contains("DOB:") {
            if let Some(m) = LONG_DATE.captures(&upper) {
                fields.insert("date_of_birth".into(), m[1].to_string());
            }
        } else if upper.contains("DATE OF EXPIRATION:") || upper.contains("EXP:") {
            if let Some(m) = LONG_DATE.captures(&upper) {
                fields.insert("expiration_date".into(), m[1].to_string());
            }
        }
    }

    if let (Some(surname), Some(given)) = (fields.get("surname"), fields.get("given_names")) {
        let full = format!("{given} {surname}");
        fields.insert("full_name".into(), full);
    }

    fields
}

fn parse_id_card(text: &str) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();

    for line in text.lines() {
        let line = line.trim();

        if !fields.contains_key("id_number") {
            if let Some(m) = ID_NUMBER.captures(line) {
                fields.insert("id_number".into(), m[1].to_string());
            }
        }
        if let Some(m) = CARD_NAME.captures(line) {
            fields.insert("full_name".into(), m[1].trim().to_string());
        }
        if let Some(m) = CARD_DOB.captures(line) {
            fields.insert("date_of_birth".into(), m[1].trim().to_string());
        }
    }

    fields
}

/// Format score of the primary identifier: 1.0 for a strict pattern match,
/// 0.5 for a present-but-loose value, 0.0 when absent.
fn primary_identifier_format_score(fields: &BTreeMap<String, String>, kind: DocumentKind) -> f64 {
    let (key, strict): (&str, &Lazy<Regex>) = match kind {
        DocumentKind::Passport => ("passport_number", &PASSPORT_NUMBER_STRICT),
        DocumentKind::NationalId | DocumentKind::DriversLicense => {
            ("id_number", &ID_NUMBER_STRICT)
        }
        DocumentKind::Unknown => return 0.0,
    };

    match fields.get(key) {
        Some(v) if strict.is_match(v) => 1.0,
        Some(v) if !v.is_empty() => 0.5,
        _ => 0.0,
    }
}
