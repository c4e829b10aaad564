//! Round two: the password-blinded share.
//!
//! With the initiator holding `x1, x2` and the responder `x3, x4`:
//!
//! ```text
//! initiator: GA = X1 + X3 + X4, A = (x2*s)*GA, ZKP(x2*s) over GA
//! responder: GB = X3 + X1 + X2, B = (x4*s)*GB, ZKP(x4*s) over GB
//! ```
//!
//! Each side sums its own first key with both of the peer's keys, so the
//! generator a receiver checks against is the peer's first key plus both of
//! its own.

use crate::{
    codec::{Reader, Writer},
    group::ensure_not_identity,
    round_one::KeyShare,
    zkp::{proof_id, ProofKind},
    Result, Role,
};
use p256::{ProjectivePoint, Scalar};
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

/// `first + peer_first + peer_second`, which must not be the identity.
pub(crate) fn combined_generator(
    first: &ProjectivePoint,
    peer_first: &ProjectivePoint,
    peer_second: &ProjectivePoint,
) -> Result<ProjectivePoint> {
    let base = *first + peer_first + peer_second;
    ensure_not_identity(&base)?;
    Ok(base)
}

/// Password-blinded second secret `x2*s` (or `x4*s`).
pub(crate) fn blinded_secret(second_secret: &Scalar, password: &Scalar) -> Zeroizing<Scalar> {
    Zeroizing::new(*second_secret * password)
}

/// `(S, ZKP(x*s))` for one side.
#[derive(Copy, Clone, Debug)]
pub(crate) struct RoundTwo {
    pub(crate) share: KeyShare,
}

impl RoundTwo {
    pub(crate) const MAX_LEN: usize = KeyShare::MAX_LEN;

    pub(crate) fn generate<R>(
        role: Role,
        own_first: &ProjectivePoint,
        peer_keys: &[ProjectivePoint; 2],
        second_secret: &Scalar,
        password: &Scalar,
        rng: &mut R,
    ) -> Result<Self>
    where
        R: CryptoRngCore + ?Sized,
    {
        let base = combined_generator(own_first, &peer_keys[0], &peer_keys[1])?;
        let blinded = blinded_secret(second_secret, password);
        let share =
            KeyShare::generate(&base, &blinded, proof_id(role, ProofKind::RoundTwo), rng)?;
        Ok(Self { share })
    }

    pub(crate) fn encode(&self, w: &mut Writer) {
        self.share.encode(w);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            share: KeyShare::decode(r)?,
        })
    }

    /// Check the share as made by `sender` whose first key is `peer_first`,
    /// against our own two round-one keys. Returns the share point.
    pub(crate) fn verify(
        &self,
        sender: Role,
        peer_first: &ProjectivePoint,
        own_keys: &[ProjectivePoint; 2],
    ) -> Result<ProjectivePoint> {
        let base = combined_generator(peer_first, &own_keys[0], &own_keys[1])?;
        self.share
            .verify(&base, proof_id(sender, ProofKind::RoundTwo))?;
        Ok(self.share.public)
    }
}
