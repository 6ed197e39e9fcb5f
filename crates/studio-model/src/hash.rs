//! Content fingerprints
//!
//! Presentation payloads and configuration snapshots are fingerprinted with
//! Blake3 so a render surface can tell a real change from a resend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const DIGEST_LEN: usize = blake3::OUT_LEN;

/// Blake3 digest of some piece of configuration content
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ContentHash([u8; DIGEST_LEN]);

impl ContentHash {
    /// Digest of a byte string
    #[inline]
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    /// Start a field-by-field fingerprint
    #[inline]
    #[must_use]
    pub fn builder() -> FingerprintBuilder {
        FingerprintBuilder {
            hasher: blake3::Hasher::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// First 8 bytes as hex, for log lines
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short())
    }
}

impl FromStr for ContentHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = hex::decode(s)?;
        let bytes: [u8; DIGEST_LEN] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| HashError::Length(decoded.len()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// Accumulates fields into one fingerprint
///
/// Each field is terminated by a zero byte so `("ab", "c")` and
/// `("a", "bc")` never collide.
#[derive(Debug, Clone)]
pub struct FingerprintBuilder {
    hasher: blake3::Hasher,
}

impl FingerprintBuilder {
    #[must_use]
    pub fn field(mut self, bytes: &[u8]) -> Self {
        self.hasher.update(bytes);
        self.hasher.update(&[0]);
        self
    }

    #[must_use]
    pub fn text(self, value: &str) -> Self {
        self.field(value.as_bytes())
    }

    #[must_use]
    pub fn nested(self, hash: &ContentHash) -> Self {
        self.field(hash.as_bytes())
    }

    #[must_use]
    pub fn finish(self) -> ContentHash {
        ContentHash(*self.hasher.finalize().as_bytes())
    }
}

/// A fingerprint string that is not a 32-byte hex digest
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("fingerprint is not hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("fingerprint has {0} bytes, expected 32")]
    Length(usize),
}
