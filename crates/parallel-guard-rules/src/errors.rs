use thiserror::Error;

/// Errors raised while configuring rule sets.
///
/// Validation itself never fails; defects in a document are reported as
/// [`ValidationFinding`](crate::ValidationFinding)s instead.
#[derive(Debug, Error)]
pub enum RulesError {
    /// When a payload kind name is not recognised.
    #[error("unknown payload kind '{0}' (expected search, extract or task-run)")]
    UnknownKind(String),
    /// When a configured limit is outside its allowed range.
    #[error("{field} ({value}) is out of bounds")]
    OutOfBounds {
        /// Limit name that failed validation.
        field: &'static str,
        /// Offending value.
        value: usize,
    },
}
