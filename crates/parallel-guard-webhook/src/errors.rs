use thiserror::Error;

/// Errors raised while building signing keys.
///
/// Verification outcomes are never errors; see
/// [`VerificationResult`](crate::VerificationResult).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    /// When the signing secret is empty.
    #[error("webhook secret must not be empty")]
    EmptySecret,
    /// When the MAC rejects the key.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),
}
