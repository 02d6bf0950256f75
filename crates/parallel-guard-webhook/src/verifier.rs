//! Signature and replay-window verification.

use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::{Choice, ConstantTimeEq};

use crate::secret::WebhookSecret;
use crate::signature::{normalize_token, parse_signature_header, sign};

/// Replay window applied when none is configured.
pub const DEFAULT_TOLERANCE_SECONDS: u64 = 300;

/// Why a delivery was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    /// Inputs could not be interpreted (bad timestamp, missing body, id, secret or signature).
    Malformed,
    /// The timestamp lies outside the tolerance window.
    TimestampExpired,
    /// No presented signature matches the expected digest.
    SignatureMismatch,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::Malformed => f.write_str("malformed webhook input"),
            InvalidReason::TimestampExpired => f.write_str("timestamp outside tolerance window"),
            InvalidReason::SignatureMismatch => f.write_str("signature mismatch"),
        }
    }
}

/// Verdict for one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum VerificationResult {
    /// Signature matched within the window.
    Valid,
    /// Rejected, with the reason.
    Invalid(InvalidReason),
}

impl VerificationResult {
    /// True for [`VerificationResult::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationResult::Valid)
    }

    /// The rejection reason, if any.
    pub fn reason(&self) -> Option<InvalidReason> {
        match self {
            VerificationResult::Valid => None,
            VerificationResult::Invalid(reason) => Some(*reason),
        }
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationResult::Valid => f.write_str("VALID"),
            VerificationResult::Invalid(reason) => write!(f, "INVALID: {reason}"),
        }
    }
}

/// Both checks behind a verdict. Carries no key or digest material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    /// Final verdict.
    pub result: VerificationResult,
    /// Whether any candidate matched.
    pub matched_signature: bool,
    /// Whether the timestamp is inside the window.
    pub within_tolerance: bool,
    /// `|now - timestamp|`, saturated.
    pub age_seconds: u64,
    /// Number of non-blank signature tokens compared.
    pub candidate_count: usize,
}

impl VerificationReport {
    fn malformed() -> Self {
        Self {
            result: VerificationResult::Invalid(InvalidReason::Malformed),
            matched_signature: false,
            within_tolerance: false,
            age_seconds: 0,
            candidate_count: 0,
        }
    }
}

/// Verifies one delivery. See [`inspect`] for the individual checks.
#[allow(clippy::too_many_arguments)]
pub fn verify<S: AsRef<str>>(
    secret: &[u8],
    webhook_id: &str,
    timestamp: &str,
    raw_body: Option<&[u8]>,
    provided_signatures: &[S],
    now: i64,
    tolerance_seconds: u64,
) -> VerificationResult {
    inspect(secret, webhook_id, timestamp, raw_body, provided_signatures, now, tolerance_seconds).result
}

/// Runs the signature and freshness checks and reports both.
///
/// Every candidate is compared in constant time against the expected digest,
/// with no early exit. An expired timestamp wins over a signature mismatch.
#[allow(clippy::too_many_arguments)]
pub fn inspect<S: AsRef<str>>(
    secret: &[u8],
    webhook_id: &str,
    timestamp: &str,
    raw_body: Option<&[u8]>,
    provided_signatures: &[S],
    now: i64,
    tolerance_seconds: u64,
) -> VerificationReport {
    let tokens: Vec<&str> = provided_signatures
        .iter()
        .map(|token| token.as_ref().trim())
        .filter(|token| !token.is_empty())
        .collect();
    let (Some(issued), Some(body)) = (parse_timestamp(timestamp), raw_body) else {
        return VerificationReport::malformed();
    };
    if webhook_id.trim().is_empty() || secret.is_empty() || tokens.is_empty() {
        return VerificationReport::malformed();
    }
    let Ok(expected) = sign(secret, webhook_id, timestamp, body) else {
        return VerificationReport::malformed();
    };

    let mut matched = Choice::from(0u8);
    for token in &tokens {
        matched |= expected.as_bytes().ct_eq(normalize_token(token).as_bytes());
    }
    let matched_signature = bool::from(matched);

    let age = (i128::from(now) - i128::from(issued)).unsigned_abs();
    let within_tolerance = age <= u128::from(tolerance_seconds);

    let result = if !within_tolerance {
        VerificationResult::Invalid(InvalidReason::TimestampExpired)
    } else if !matched_signature {
        VerificationResult::Invalid(InvalidReason::SignatureMismatch)
    } else {
        VerificationResult::Valid
    };
    tracing::debug!(
        verdict = %result,
        candidates = tokens.len(),
        within_tolerance,
        "webhook verified"
    );

    VerificationReport {
        result,
        matched_signature,
        within_tolerance,
        age_seconds: u64::try_from(age).unwrap_or(u64::MAX),
        candidate_count: tokens.len(),
    }
}

fn parse_timestamp(timestamp: &str) -> Option<u64> {
    if timestamp.is_empty() || !timestamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    timestamp.parse().ok()
}

/// Replay-window settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifierConfig {
    /// Allowed distance between `now` and the delivery timestamp.
    pub tolerance_seconds: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            tolerance_seconds: DEFAULT_TOLERANCE_SECONDS,
        }
    }
}

/// The parts of an inbound delivery that verification needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawWebhookEvent {
    /// `webhook-id` header.
    pub webhook_id: String,
    /// `webhook-timestamp` header, as received.
    pub timestamp: String,
    /// Digest candidates from `webhook-signature`.
    pub signatures: Vec<String>,
    /// Raw request body.
    pub body: Vec<u8>,
}

impl RawWebhookEvent {
    /// Collects the webhook headers (case-insensitive, optionally
    /// `parallel-` prefixed). Missing headers are left empty and later
    /// verify as malformed.
    pub fn from_headers<'a, I>(headers: I, body: impl Into<Vec<u8>>) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut event = Self {
            body: body.into(),
            ..Self::default()
        };
        for (name, value) in headers {
            let name = name.trim().to_ascii_lowercase();
            let name = name.strip_prefix("parallel-").unwrap_or(&name);
            match name {
                "webhook-id" => event.webhook_id = value.trim().to_string(),
                "webhook-timestamp" => event.timestamp = value.trim().to_string(),
                "webhook-signature" => {
                    for candidate in parse_signature_header(value) {
                        if !event.signatures.contains(&candidate) {
                            event.signatures.push(candidate);
                        }
                    }
                }
                _ => {}
            }
        }
        event
    }
}

/// A secret plus window settings, for verifying many deliveries.
#[derive(Debug, Clone)]
pub struct WebhookSignatureVerifier {
    secret: WebhookSecret,
    config: VerifierConfig,
}

impl WebhookSignatureVerifier {
    /// Creates a verifier.
    pub fn new(secret: WebhookSecret, config: VerifierConfig) -> Self {
        Self { secret, config }
    }

    /// Active settings.
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verdict for `event` at `now` (unix seconds).
    pub fn verify(&self, event: &RawWebhookEvent, now: i64) -> VerificationResult {
        self.inspect(event, now).result
    }

    /// Both checks for `event` at `now` (unix seconds).
    pub fn inspect(&self, event: &RawWebhookEvent, now: i64) -> VerificationReport {
        inspect(
            self.secret.as_bytes(),
            &event.webhook_id,
            &event.timestamp,
            Some(event.body.as_slice()),
            &event.signatures,
            now,
            self.config.tolerance_seconds,
        )
    }
}
