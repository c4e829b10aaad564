//! NIST P-256 group operations.

use crate::{Error, Result};
use p256::{
    elliptic_curve::{
        group::Group,
        ops::Reduce,
        point::AffineCoordinates,
        sec1::{FromEncodedPoint, ToEncodedPoint},
        Field, PrimeField,
    },
    AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar, U256,
};
use rand_core::CryptoRngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// Length of an uncompressed SEC1 point encoding.
pub(crate) const ELEMENT_LENGTH: usize = 65;

/// Length of a big-endian scalar.
pub(crate) const SCALAR_LENGTH: usize = 32;

/// Rejection sampling gives up after this many draws. For P-256 a single
/// draw is rejected with probability below 2^-32.
const MAX_SCALAR_ATTEMPTS: usize = 30;

/// Fixed generator `G`.
pub(crate) fn generator() -> ProjectivePoint {
    ProjectivePoint::GENERATOR
}

/// Draw a uniformly random scalar in `[1, n-1]`.
pub(crate) fn random_scalar<R>(rng: &mut R) -> Result<Scalar>
where
    R: CryptoRngCore + ?Sized,
{
    let mut bytes = [0u8; SCALAR_LENGTH];

    for _ in 0..MAX_SCALAR_ATTEMPTS {
        if rng.try_fill_bytes(&mut bytes).is_err() {
            bytes.zeroize();
            return Err(Error::Entropy);
        }

        let candidate = Scalar::from_repr(FieldBytes::clone_from_slice(&bytes));
        bytes.zeroize();

        if let Some(scalar) = Option::<Scalar>::from(candidate) {
            if !bool::from(scalar.is_zero()) {
                return Ok(scalar);
            }
        }
    }

    Err(Error::Entropy)
}

/// Hash arbitrary bytes with SHA-256 and reduce the digest mod `n`.
pub(crate) fn hash_to_scalar(data: &[u8]) -> Scalar {
    reduce_digest(Sha256::new_with_prefix(data))
}

/// Finish `hasher` and interpret the digest as a big-endian integer mod `n`.
pub(crate) fn reduce_digest(hasher: Sha256) -> Scalar {
    <Scalar as Reduce<U256>>::reduce_bytes(&hasher.finalize())
}

/// Uncompressed SEC1 encoding of `e`.
pub(crate) fn element_to_bytes(e: &ProjectivePoint) -> EncodedPoint {
    e.to_affine().to_encoded_point(false)
}

/// Decode a SEC1 point (compressed or uncompressed).
///
/// Bytes that are not a SEC1 encoding at all are a [`Error::Parse`];
/// a well-formed encoding that is off the curve or the identity is an
/// [`Error::Authentication`].
pub(crate) fn bytes_to_element(bytes: &[u8]) -> Result<ProjectivePoint> {
    let encoded = EncodedPoint::from_bytes(bytes).map_err(|_| Error::Parse)?;
    let affine = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
        .ok_or(Error::Authentication)?;
    let element = ProjectivePoint::from(affine);
    ensure_not_identity(&element)?;
    Ok(element)
}

/// Reject the point at infinity.
pub(crate) fn ensure_not_identity(e: &ProjectivePoint) -> Result<()> {
    if bool::from(e.is_identity()) {
        Err(Error::Authentication)
    } else {
        Ok(())
    }
}

/// Parse a 32-byte big-endian scalar, rejecting values `>= n`.
pub(crate) fn bytes_to_scalar(bytes: &FieldBytes) -> Result<Scalar> {
    Option::<Scalar>::from(Scalar::from_repr(*bytes)).ok_or(Error::Parse)
}

/// Big-endian x-coordinate of `e`.
pub(crate) fn x_coordinate(e: &ProjectivePoint) -> FieldBytes {
    e.to_affine().x()
}
