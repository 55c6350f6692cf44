//! # Error Types: Structured Error Hierarchy
//!
//! Defines the low-level error types shared across the CRID workspace. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! Protocol errors (wrong caller, deadline, double finalization, bad
//! signature) live next to the state machine in `crid-state`. The types here
//! describe failures of the building blocks underneath it.

use thiserror::Error;

/// Top-level error type for the foundational layer.
#[derive(Error, Debug)]
pub enum CridError {
    /// Malformed identifier or encoded value.
    #[error("parse error: {0}")]
    Parse(String),

    /// Timestamp construction or arithmetic failed.
    #[error("time error: {0}")]
    Time(String),

    /// Cryptographic failure.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Error in cryptographic operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Signature bytes are not a well-formed enrollment signature.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    KeyError(String),
}
