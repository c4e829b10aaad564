//! Round one: each side publishes two ephemeral public keys, each with a
//! proof of knowledge of its discrete log.

use crate::{
    codec::{Reader, Writer, POINT_LEN},
    group::generator,
    zkp::{self, proof_id, ProofKind, SchnorrProof},
    Result, Role,
};
use p256::{ProjectivePoint, Scalar};
use rand_core::CryptoRngCore;

/// A public point together with the proof that authenticates it.
#[derive(Copy, Clone, Debug)]
pub(crate) struct KeyShare {
    pub(crate) public: ProjectivePoint,
    pub(crate) proof: SchnorrProof,
}

impl KeyShare {
    pub(crate) const MAX_LEN: usize = POINT_LEN + SchnorrProof::MAX_LEN;

    pub(crate) fn encode(&self, w: &mut Writer) {
        w.put_point(&self.public);
        self.proof.encode(w);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let public = r.get_point()?;
        let proof = SchnorrProof::decode(r)?;
        Ok(Self { public, proof })
    }

    /// Create `secret * base` with a proof bound to `id`.
    pub(crate) fn generate<R>(
        base: &ProjectivePoint,
        secret: &Scalar,
        id: &[u8],
        rng: &mut R,
    ) -> Result<Self>
    where
        R: CryptoRngCore + ?Sized,
    {
        let (public, proof) = zkp::prove(base, secret, id, rng)?;
        Ok(Self { public, proof })
    }

    pub(crate) fn verify(&self, base: &ProjectivePoint, id: &[u8]) -> Result<()> {
        zkp::verify(base, &self.public, &self.proof, id)
    }
}

/// `[(X1, ZKP(x1)), (X2, ZKP(x2))]` for one side.
#[derive(Copy, Clone, Debug)]
pub(crate) struct RoundOne {
    pub(crate) first: KeyShare,
    pub(crate) second: KeyShare,
}

impl RoundOne {
    pub(crate) const MAX_LEN: usize = 2 * KeyShare::MAX_LEN;

    pub(crate) fn generate<R>(
        role: Role,
        first_secret: &Scalar,
        second_secret: &Scalar,
        rng: &mut R,
    ) -> Result<Self>
    where
        R: CryptoRngCore + ?Sized,
    {
        let g = generator();
        let first = KeyShare::generate(
            &g,
            first_secret,
            proof_id(role, ProofKind::FirstKey),
            rng,
        )?;
        let second = KeyShare::generate(
            &g,
            second_secret,
            proof_id(role, ProofKind::SecondKey),
            rng,
        )?;
        Ok(Self { first, second })
    }

    pub(crate) fn encode(&self, w: &mut Writer) {
        self.first.encode(w);
        self.second.encode(w);
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self> {
        let first = KeyShare::decode(r)?;
        let second = KeyShare::decode(r)?;
        Ok(Self { first, second })
    }

    /// Check both proofs as made by `sender`, returning the two keys.
    pub(crate) fn verify(&self, sender: Role) -> Result<[ProjectivePoint; 2]> {
        let g = generator();
        self.first
            .verify(&g, proof_id(sender, ProofKind::FirstKey))?;
        self.second
            .verify(&g, proof_id(sender, ProofKind::SecondKey))?;
        Ok([self.first.public, self.second.public])
    }
}
