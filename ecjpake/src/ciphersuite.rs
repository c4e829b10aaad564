//! Hash and curve selection.
//!
//! EC-JPAKE as used by Thread and the TLS `ecjpake_key_kp_pair` extension is
//! only defined for NIST P-256 with SHA-256. The identifiers below exist so
//! that callers negotiating parameters can hand over whatever the peer
//! offered and get a clean [`Error::Configuration`] instead of silently
//! running the protocol over a different group.

use crate::{Error, Result};
use core::fmt;

/// Hash function identifier.
#[non_exhaustive]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HashAlgorithm {
    /// SHA-1
    Sha1,
    /// SHA-224
    Sha224,
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

/// Elliptic curve identifier.
#[non_exhaustive]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CurveId {
    /// NIST P-256 (`secp256r1`)
    Secp256r1,
    /// NIST P-384 (`secp384r1`)
    Secp384r1,
    /// NIST P-521 (`secp521r1`)
    Secp521r1,
    /// `secp256k1`
    Secp256k1,
    /// Curve25519
    Curve25519,
}

/// The (hash, curve) pair a context runs with.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Ciphersuite {
    /// Hash used for proofs, the password scalar and the session key
    pub hash: HashAlgorithm,
    /// Group the protocol runs in
    pub curve: CurveId,
}

impl Ciphersuite {
    /// P-256 with SHA-256, the only supported pairing.
    pub const P256_SHA256: Ciphersuite = Ciphersuite {
        hash: HashAlgorithm::Sha256,
        curve: CurveId::Secp256r1,
    };

    /// Create a ciphersuite from its parts. No validation happens here.
    pub const fn new(hash: HashAlgorithm, curve: CurveId) -> Self {
        Self { hash, curve }
    }

    /// Check that this is a pairing the protocol is defined for.
    pub fn validate(&self) -> Result<()> {
        if *self == Self::P256_SHA256 {
            Ok(())
        } else {
            Err(Error::Configuration)
        }
    }
}

impl Default for Ciphersuite {
    fn default() -> Self {
        Self::P256_SHA256
    }
}

impl fmt::Display for Ciphersuite {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{:?}/{:?}", self.curve, self.hash)
    }
}
