//! Shared point and session key.
//!
//! ```text
//! initiator: K = (B - (x2*s)*X4) * x2
//! responder: K = (A - (x4*s)*X2) * x4
//! ```
//!
//! Both equal `x2*x4*s*(x1 + x3)*G`. The session key is the SHA-256 digest of
//! the big-endian x-coordinate of `K`.

use crate::{
    group::{ensure_not_identity, x_coordinate},
    round_two::blinded_secret,
    Result,
};
use core::fmt;
use p256::{ProjectivePoint, Scalar};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

/// Remove our blinding term from the peer's share and rescale by our second
/// secret.
pub(crate) fn shared_point(
    peer_share: &ProjectivePoint,
    peer_second: &ProjectivePoint,
    second_secret: &Scalar,
    password: &Scalar,
) -> Result<Zeroizing<ProjectivePoint>> {
    let blinded = blinded_secret(second_secret, password);
    let unblinded = Zeroizing::new(*peer_share - *peer_second * *blinded);
    let shared = Zeroizing::new(*unblinded * second_secret);
    ensure_not_identity(&shared)?;
    Ok(shared)
}

/// Hash the x-coordinate of `shared` down to the session key.
pub(crate) fn session_key(shared: &ProjectivePoint) -> SessionKey {
    let mut x = x_coordinate(shared);
    let key = SessionKey(Sha256::digest(&x).into());
    x.as_mut_slice().zeroize();
    key
}

/// The 32-byte key both sides agree on.
///
/// Comparison is constant time and the bytes are wiped on drop.
#[derive(Clone)]
pub struct SessionKey([u8; SessionKey::LEN]);

impl SessionKey {
    /// Key length in bytes.
    pub const LEN: usize = 32;

    /// Borrow the key bytes.
    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

impl AsRef<[u8]> for SessionKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl ConstantTimeEq for SessionKey {
    fn ct_eq(&self, other: &Self) -> subtle::Choice {
        self.0[..].ct_eq(&other.0[..])
    }
}

impl PartialEq for SessionKey {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for SessionKey {}

impl fmt::Debug for SessionKey {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str("SessionKey(..)")
    }
}

impl Drop for SessionKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
