//! # Identity Newtypes
//!
//! `Identity` is the address of a participant (coordinator or student).
//! `AgreementId` is the handle of one agreement. They are distinct types,
//! so an agreement handle can never be passed where a participant is
//! expected.
//!
//! ## Address Derivation
//!
//! An identity is the first [`IDENTITY_LEN`] bytes of
//! `SHA-256("crid.identity.v1" || public_key)`. Two identities are equal iff
//! they were derived from the same public key (up to hash collisions).
//! Rendered as `0x` followed by 40 lowercase hex characters.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::CridError;
use crate::hex;

/// Length of an identity address in bytes.
pub const IDENTITY_LEN: usize = 20;

const IDENTITY_DOMAIN: &[u8] = b"crid.identity.v1";

/// A participant address derived from an Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity([u8; IDENTITY_LEN]);

impl Identity {
    /// Derive the identity for a 32-byte public key.
    pub fn from_public_key_bytes(public_key: &[u8; 32]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(IDENTITY_DOMAIN);
        hasher.update(public_key);
        let hash = hasher.finalize();
        let mut bytes = [0u8; IDENTITY_LEN];
        bytes.copy_from_slice(&hash[..IDENTITY_LEN]);
        Self(bytes)
    }

    /// Wrap raw address bytes.
    pub fn from_bytes(bytes: [u8; IDENTITY_LEN]) -> Self {
        Self(bytes)
    }

    /// Return the raw address bytes.
    pub fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }

    /// Render as `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }

    /// Parse a 40-character hex address, with or without `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CridError> {
        hex::decode_array::<IDENTITY_LEN>(s)
            .map(Self)
            .map_err(|e| CridError::Parse(format!("invalid identity {s:?}: {e}")))
    }
}

impl std::str::FromStr for Identity {
    type Err = CridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Identity({}...)", hex::prefix(&self.0))
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Unique handle for a deployed agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgreementId(Uuid);

impl AgreementId {
    /// Generate a new random agreement handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AgreementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AgreementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "agreement:{}", self.0)
    }
}
