//! # Agreement Errors
//!
//! Every variant is a precondition violation of a single call. None is
//! transient, and none leaves the agreement partially mutated.

use thiserror::Error;

/// Construction failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CreateError {
    /// `now + duration` is not a representable timestamp.
    #[error("enrollment deadline overflows: now + {duration_secs}s")]
    Overflow {
        /// The requested enrollment window.
        duration_secs: u64,
    },
}

/// Failures of [`Agreement::enroll`](crate::Agreement::enroll), in check order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnrollError {
    /// Caller is not the designated student.
    #[error("caller is not the designated student")]
    NotTheStudent,

    /// The enrollment window has closed.
    #[error("enrollment deadline has expired")]
    DeadlineExpired,

    /// The agreement is already finalized.
    #[error("agreement is already finalized")]
    AlreadyEnrolled,

    /// The signature is malformed or was not produced by the coordinator
    /// over this exact course list.
    #[error("signature does not authorize this course list: {reason}")]
    InvalidSignature {
        /// What went wrong during recovery or comparison.
        reason: String,
    },
}

/// Failures of [`Agreement::cancel_by_timeout`](crate::Agreement::cancel_by_timeout), in check order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CancelError {
    /// Caller is not the designated coordinator.
    #[error("caller is not the designated coordinator")]
    NotTheCoordinator,

    /// The enrollment window is still open.
    #[error("enrollment deadline has not been reached")]
    DeadlineNotReached,

    /// The agreement is already finalized.
    #[error("agreement is already finalized")]
    AlreadyEnrolled,
}

/// Any agreement failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgreementError {
    /// Construction failed.
    #[error(transparent)]
    Create(#[from] CreateError),

    /// Enrollment rejected.
    #[error(transparent)]
    Enroll(#[from] EnrollError),

    /// Cancellation rejected.
    #[error(transparent)]
    Cancel(#[from] CancelError),

    /// A persisted agreement violates a record invariant.
    #[error("corrupt agreement record: {0}")]
    Corrupt(String),
}

impl CreateError {
    /// Stable error name for tooling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Overflow { .. } => "Overflow",
        }
    }
}

impl EnrollError {
    /// Stable error name for tooling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotTheStudent => "NotTheStudent",
            Self::DeadlineExpired => "DeadlineExpired",
            Self::AlreadyEnrolled => "AlreadyEnrolled",
            Self::InvalidSignature { .. } => "InvalidSignature",
        }
    }
}

impl CancelError {
    /// Stable error name for tooling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotTheCoordinator => "NotTheCoordinator",
            Self::DeadlineNotReached => "DeadlineNotReached",
            Self::AlreadyEnrolled => "AlreadyEnrolled",
        }
    }
}

impl AgreementError {
    /// Stable error name for tooling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Create(e) => e.code(),
            Self::Enroll(e) => e.code(),
            Self::Cancel(e) => e.code(),
            Self::Corrupt(_) => "Corrupt",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_variant_names() {
        assert_eq!(EnrollError::NotTheStudent.code(), "NotTheStudent");
        assert_eq!(EnrollError::DeadlineExpired.code(), "DeadlineExpired");
        assert_eq!(EnrollError::AlreadyEnrolled.code(), "AlreadyEnrolled");
        assert_eq!(
            EnrollError::InvalidSignature { reason: "x".into() }.code(),
            "InvalidSignature"
        );
        assert_eq!(CancelError::NotTheCoordinator.code(), "NotTheCoordinator");
        assert_eq!(CancelError::DeadlineNotReached.code(), "DeadlineNotReached");
        assert_eq!(CancelError::AlreadyEnrolled.code(), "AlreadyEnrolled");
        assert_eq!(CreateError::Overflow { duration_secs: 1 }.code(), "Overflow");
    }

    #[test]
    fn test_aggregate_preserves_code_and_message() {
        let err: AgreementError = CancelError::DeadlineNotReached.into();
        assert_eq!(err.code(), "DeadlineNotReached");
        assert_eq!(err.to_string(), "enrollment deadline has not been reached");
    }
}
