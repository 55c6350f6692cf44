//! # crid-core: Foundational Types for CRID Agreements
//!
//! This crate is the bedrock of the CRID workspace. It defines the primitive
//! types every other crate builds on. Every other crate in the workspace
//! depends on `crid-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `Identity` (a 20-byte address
//!    derived from an Ed25519 public key) and `AgreementId` (a UUID handle)
//!    are distinct types. A coordinator address cannot be confused with an
//!    agreement handle.
//!
//! 2. **UTC-only timestamps.** The `Timestamp` type enforces UTC with
//!    seconds precision. Deadline arithmetic goes through
//!    [`Timestamp::checked_add_secs()`], which refuses to wrap.
//!
//! 3. **Tagged digests.** `ContentDigest` carries its algorithm so a digest
//!    rendered in a log or a file is self-describing.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `crid-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public data types derive `Debug`, `Clone`, and implement `Serialize`/`Deserialize`.

pub mod digest;
pub mod error;
pub mod hex;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use digest::{sha256_digest, ContentDigest, DigestAlgorithm};
pub use error::{CridError, CryptoError};
pub use identity::{AgreementId, Identity, IDENTITY_LEN};
pub use temporal::Timestamp;
