//! Verification of signed Parallel Task webhook deliveries.
//!
//! A delivery is authentic when `HMAC-SHA256(secret, "<id>.<timestamp>.<body>")`
//! matches one of the presented signatures and the timestamp lies within the
//! replay window. Secrets, digests and bodies are never logged.
//!
#![deny(missing_docs)]

/// Key construction errors.
pub mod errors;
/// Signing secrets.
pub mod secret;
/// Signed content, digests and signature headers.
pub mod signature;
/// Verdicts and the verifier.
pub mod verifier;

pub use errors::WebhookError;
pub use secret::WebhookSecret;
pub use signature::{parse_signature_header, sign, signature_header, signed_content};
pub use verifier::{
    inspect, verify, InvalidReason, RawWebhookEvent, VerificationReport, VerificationResult,
    VerifierConfig, WebhookSignatureVerifier, DEFAULT_TOLERANCE_SECONDS,
};
