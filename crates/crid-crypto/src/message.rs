//! # Enrollment Message Hashing and Signer Recovery
//!
//! Binds an ordered course list to a coordinator signature.
//!
//! ## Course-List Hash
//!
//! [`course_list_hash()`] encodes the list as
//!
//! ```text
//! "crid.courses.v1" || u64_be(count) || for each course: u64_be(len) || utf8 bytes
//! ```
//!
//! and hashes it with SHA-256. Every course is length-prefixed, so
//! `["ab", "c"]` and `["a", "bc"]` encode differently, and order is part of
//! the encoding.
//!
//! ## Signed-Message Convention
//!
//! The coordinator never signs the course-list hash directly. Both sides go
//! through [`signed_message_digest()`], which hashes
//! `"\x19CRID Signed Message:\n32" || hash`. [`SignedMessageDigest`] has no
//! other constructor, and both [`Ed25519KeyPair::sign()`] and
//! [`recover_signer()`] accept only that type.
//!
//! ## Recovery
//!
//! Ed25519 has no public-key recovery, so an [`EnrollmentSignature`] carries
//! the signer's public key after the 64-byte signature. Recovery verifies the
//! signature under that key and returns the key's identity. A signature made
//! by any other key, or over any other digest, recovers to a different
//! identity or fails outright.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crid_core::error::CryptoError;
use crid_core::{hex, sha256_digest, ContentDigest, DigestAlgorithm, Identity};

use crate::ed25519::{verify, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

/// Domain tag for the course-list encoding.
pub const COURSE_LIST_DOMAIN: &[u8] = b"crid.courses.v1";

/// Prefix applied to a 32-byte hash before signing.
pub const SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19CRID Signed Message:\n32";

/// Length of an encoded enrollment signature: 64-byte signature + 32-byte key.
pub const ENROLLMENT_SIGNATURE_LEN: usize = 96;

/// Compute the message hash for an ordered course list.
pub fn course_list_hash<S: AsRef<str>>(courses: &[S]) -> ContentDigest {
    let mut encoded = Vec::with_capacity(
        COURSE_LIST_DOMAIN.len()
            + 8
            + courses.iter().map(|c| 8 + c.as_ref().len()).sum::<usize>(),
    );
    encoded.extend_from_slice(COURSE_LIST_DOMAIN);
    encoded.extend_from_slice(&(courses.len() as u64).to_be_bytes());
    for course in courses {
        let bytes = course.as_ref().as_bytes();
        encoded.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
        encoded.extend_from_slice(bytes);
    }
    sha256_digest(&encoded)
}

/// A message hash with the signed-message prefix applied.
///
/// The only constructor is [`signed_message_digest()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignedMessageDigest(ContentDigest);

impl SignedMessageDigest {
    /// Access the prefixed digest bytes (the exact bytes that are signed).
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// The prefixed digest as a tagged content digest.
    pub fn digest(&self) -> &ContentDigest {
        &self.0
    }
}

/// Apply the signed-message prefix to a message hash.
pub fn signed_message_digest(hash: &ContentDigest) -> SignedMessageDigest {
    let mut hasher = Sha256::new();
    hasher.update(SIGNED_MESSAGE_PREFIX);
    hasher.update(hash.as_bytes());
    let out = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&out);
    SignedMessageDigest(ContentDigest::new(DigestAlgorithm::Sha256, bytes))
}

/// A coordinator's authorization over a course list: the Ed25519 signature
/// followed by the signer's public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentSignature {
    /// Signature over the signed-message digest.
    pub signature: Ed25519Signature,
    /// Public key of the signer.
    pub public_key: Ed25519PublicKey,
}

impl EnrollmentSignature {
    /// Encode as 96 bytes: signature then public key.
    pub fn to_bytes(&self) -> [u8; ENROLLMENT_SIGNATURE_LEN] {
        let mut out = [0u8; ENROLLMENT_SIGNATURE_LEN];
        out[..64].copy_from_slice(self.signature.as_bytes());
        out[64..].copy_from_slice(self.public_key.as_bytes());
        out
    }

    /// Decode from exactly 96 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != ENROLLMENT_SIGNATURE_LEN {
            return Err(CryptoError::MalformedSignature(format!(
                "enrollment signature must be {ENROLLMENT_SIGNATURE_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut sig = [0u8; 64];
        sig.copy_from_slice(&bytes[..64]);
        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes[64..]);
        Ok(Self {
            signature: Ed25519Signature::from_bytes(sig),
            public_key: Ed25519PublicKey::from_bytes(key),
        })
    }

    /// Render as a lowercase hex string (192 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(&self.to_bytes())
    }

    /// Parse from hex.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s)
            .map_err(|e| CryptoError::MalformedSignature(format!("invalid signature hex: {e}")))?;
        Self::from_bytes(&bytes)
    }
}

impl Serialize for EnrollmentSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for EnrollmentSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for EnrollmentSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Sign an ordered course list: hash, prefix, sign.
pub fn sign_enrollment<S: AsRef<str>>(key: &Ed25519KeyPair, courses: &[S]) -> EnrollmentSignature {
    let digest = signed_message_digest(&course_list_hash(courses));
    EnrollmentSignature {
        signature: key.sign(&digest),
        public_key: key.public_key(),
    }
}

/// Recover the identity that signed `digest`.
///
/// Fails with `MalformedSignature` if `signature` is not a well-formed
/// enrollment signature, and with `KeyError` / `VerificationFailed` if the
/// embedded key is invalid or did not sign this digest.
pub fn recover_signer(
    digest: &SignedMessageDigest,
    signature: &[u8],
) -> Result<Identity, CryptoError> {
    let parsed = EnrollmentSignature::from_bytes(signature)?;
    verify(digest, &parsed.signature, &parsed.public_key)?;
    Ok(parsed.public_key.identity())
}
