//! Schnorr non-interactive zero-knowledge proofs.
//!
//! A proof shows knowledge of `x` such that `X = x*B` for a base point `B`,
//! bound to an identity string so that a proof made by one party for one
//! key cannot be replayed as another party's or another key's proof.
//!
//! ```text
//! prove:  v = random, V = v*B, h = H(B || V || X || id), r = v - x*h
//! verify: r*B + h*X == V
//! ```
//!
//! `H` is SHA-256 over each point as a 4-byte big-endian length followed by
//! its uncompressed SEC1 encoding, then the 4-byte length of `id` and `id`
//! itself; the digest is read big-endian and reduced mod `n`.

use crate::{
    codec::{Reader, Writer, MAX_SCALAR_LEN, POINT_LEN},
    group::{element_to_bytes, ensure_not_identity, random_scalar, reduce_digest},
    Error, Result, Role,
};
use p256::{ProjectivePoint, Scalar};
use rand_core::CryptoRngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Proof of knowledge of a discrete logarithm.
#[derive(Copy, Clone, Debug)]
pub(crate) struct SchnorrProof {
    /// `V = v*B`
    pub(crate) commitment: ProjectivePoint,
    /// `r = v - x*h mod n`
    pub(crate) response: Scalar,
}

impl SchnorrProof {
    pub(crate) const MAX_LEN: usize = POINT_LEN + MAX_SCALAR_LEN;

    pub(crate) fn encode(&self, w: &mut Writer) {
        w.put_point(&self.commitment);
        w.put_scalar(&self.response);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let commitment = r.get_point()?;
        let response = r.get_scalar()?;
        Ok(Self {
            commitment,
            response,
        })
    }
}

/// The three proofs each side produces.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum ProofKind {
    /// Round one, first ephemeral key
    FirstKey,
    /// Round one, second ephemeral key
    SecondKey,
    /// Round two, password-blinded share
    RoundTwo,
}

/// Identity string a proof of `kind` made by `role` is bound to.
pub(crate) fn proof_id(role: Role, kind: ProofKind) -> &'static [u8] {
    match (role, kind) {
        (Role::Initiator, ProofKind::FirstKey) => b"client1",
        (Role::Initiator, ProofKind::SecondKey) => b"client2",
        (Role::Initiator, ProofKind::RoundTwo) => b"client2round",
        (Role::Responder, ProofKind::FirstKey) => b"server1",
        (Role::Responder, ProofKind::SecondKey) => b"server2",
        (Role::Responder, ProofKind::RoundTwo) => b"server2round",
    }
}

/// Fiat-Shamir challenge `h = H(B || V || X || id) mod n`.
pub(crate) fn challenge(
    base: &ProjectivePoint,
    commitment: &ProjectivePoint,
    public: &ProjectivePoint,
    id: &[u8],
) -> Scalar {
    let mut hasher = Sha256::new();
    for point in [base, commitment, public] {
        let encoded = element_to_bytes(point);
        let bytes = encoded.as_bytes();
        hasher.update((bytes.len() as u32).to_be_bytes());
        hasher.update(bytes);
    }
    hasher.update((id.len() as u32).to_be_bytes());
    hasher.update(id);
    reduce_digest(hasher)
}

/// Prove knowledge of `secret` for `X = secret*base`, returning `X` and the
/// proof.
pub(crate) fn prove<R>(
    base: &ProjectivePoint,
    secret: &Scalar,
    id: &[u8],
    rng: &mut R,
) -> Result<(ProjectivePoint, SchnorrProof)>
where
    R: CryptoRngCore + ?Sized,
{
    let nonce = Zeroizing::new(random_scalar(rng)?);
    Ok(prove_with_nonce(base, secret, &nonce, id))
}

/// Deterministic core of [`prove`]; `nonce` must be fresh and secret.
pub(crate) fn prove_with_nonce(
    base: &ProjectivePoint,
    secret: &Scalar,
    nonce: &Scalar,
    id: &[u8],
) -> (ProjectivePoint, SchnorrProof) {
    let public = *base * secret;
    let commitment = *base * nonce;
    let h = challenge(base, &commitment, &public, id);
    let response = *nonce - *secret * h;

    (
        public,
        SchnorrProof {
            commitment,
            response,
        },
    )
}

/// Check `proof` for `public` over `base` under `id`.
pub(crate) fn verify(
    base: &ProjectivePoint,
    public: &ProjectivePoint,
    proof: &SchnorrProof,
    id: &[u8],
) -> Result<()> {
    ensure_not_identity(base)?;
    ensure_not_identity(public)?;

    let h = challenge(base, &proof.commitment, public, id);
    let recomputed = *base * proof.response + *public * h;

    if bool::from(recomputed.ct_eq(&proof.commitment)) {
        Ok(())
    } else {
        Err(Error::Authentication)
    }
}
