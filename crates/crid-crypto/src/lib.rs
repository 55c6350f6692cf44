//! # crid-crypto: Cryptographic Primitives
//!
//! Provides the cryptographic building blocks for CRID agreements:
//!
//! - **Ed25519** key pairs, signing, and verification.
//! - **Course-list hash** (`course_list_hash`): the message a coordinator
//!   authorizes.
//! - **Signed-message convention** (`signed_message_digest`): the
//!   domain-separation prefix applied on both the signing and the
//!   verifying side.
//! - **Signer recovery** (`recover_signer`): a pure function from
//!   `(digest, signature bytes)` to the signing `Identity`.
//!
//! ## Crate Policy
//!
//! - Depends only on `crid-core` internally.
//! - No mocking of cryptographic operations in tests. All tests use real
//!   SHA-256 and real Ed25519.

pub mod ed25519;
pub mod message;

pub use ed25519::{verify, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use message::{
    course_list_hash, recover_signer, sign_enrollment, signed_message_digest,
    EnrollmentSignature, SignedMessageDigest, ENROLLMENT_SIGNATURE_LEN, SIGNED_MESSAGE_PREFIX,
};
