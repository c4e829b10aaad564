//! Protocol context.

use crate::{
    codec::{Reader, Writer},
    group::{generator, hash_to_scalar, random_scalar},
    kdf::{session_key, shared_point, SessionKey},
    round_one::RoundOne,
    round_two::RoundTwo,
    Ciphersuite, Error, Result,
};
use alloc::vec::Vec;
use core::fmt;
use p256::{elliptic_curve::Field, ProjectivePoint, Scalar};
use rand_core::CryptoRngCore;
use tracing::{debug, trace};
use zeroize::{Zeroize, Zeroizing};

#[cfg(feature = "getrandom")]
use rand_core::OsRng;

/// Largest initiator round-one payload.
pub const MAX_ROUND_ONE_LEN: usize = RoundOne::MAX_LEN;

/// Largest round-two payload.
pub const MAX_ROUND_TWO_LEN: usize = RoundTwo::MAX_LEN;

/// Largest responder payload (round one followed by round two).
pub const MAX_RESPONDER_PAYLOAD_LEN: usize = RoundOne::MAX_LEN + RoundTwo::MAX_LEN;

/// Which side of the exchange a context plays.
///
/// The initiator is the TLS client and sends the first message.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Role {
    /// Client side; proofs are labelled `"client"`
    Initiator,
    /// Server side; proofs are labelled `"server"`
    Responder,
}

impl Role {
    /// The role the other side plays.
    pub fn peer(self) -> Role {
        match self {
            Role::Initiator => Role::Responder,
            Role::Responder => Role::Initiator,
        }
    }
}

/// Progress of a context through the exchange.
///
/// Stages only move forward. The initiator goes through every stage in
/// order; the responder emits both rounds in one payload and so moves from
/// [`Stage::Round1Received`] straight to [`Stage::Round2Emitted`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Stage {
    /// Set up, nothing exchanged yet
    Init,
    /// Own round-one keys sent
    Round1Emitted,
    /// Peer's round-one keys verified
    Round1Received,
    /// Own round-two share sent
    Round2Emitted,
    /// Both round-two shares known; the key can be derived
    Round2Received,
    /// Key derived, all secrets wiped
    Complete,
}

/// Password shared by both sides.
///
/// The bytes are wiped when the value is dropped.
#[derive(Clone, Eq, PartialEq)]
pub struct Password(Vec<u8>);

impl Password {
    /// Create a new password.
    pub fn new(p: impl AsRef<[u8]>) -> Password {
        Password(p.as_ref().to_vec())
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for Password {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// One EC-JPAKE session with one peer.
///
/// A context runs exactly once. All scalar material is wiped when the key
/// is derived, when [`EcJpake::destroy`] is called, and when the context is
/// dropped, whichever comes first.
pub struct EcJpake {
    ciphersuite: Ciphersuite,
    role: Role,
    stage: Stage,
    /// `x1` (initiator) or `x3` (responder)
    first_secret: Zeroizing<Scalar>,
    /// `x2` (initiator) or `x4` (responder)
    second_secret: Zeroizing<Scalar>,
    /// `s = H(password) mod n`
    password: Zeroizing<Scalar>,
    own_keys: [ProjectivePoint; 2],
    peer_keys: Option<[ProjectivePoint; 2]>,
    peer_share: Option<ProjectivePoint>,
}

impl EcJpake {
    /// Set up a context for `role` with the default ciphersuite.
    ///
    /// Uses the system RNG.
    #[cfg(feature = "getrandom")]
    #[cfg_attr(docsrs, doc(cfg(feature = "getrandom")))]
    pub fn new(role: Role, password: &Password) -> Result<EcJpake> {
        Self::setup(role, Ciphersuite::default(), password, &mut OsRng)
    }

    /// Set up a context with the default ciphersuite and the provided
    /// cryptographically secure RNG.
    pub fn new_with_rng<R>(role: Role, password: &Password, rng: &mut R) -> Result<EcJpake>
    where
        R: CryptoRngCore + ?Sized,
    {
        Self::setup(role, Ciphersuite::default(), password, rng)
    }

    /// Set up a context.
    ///
    /// Fails with [`Error::Configuration`] unless `ciphersuite` is P-256 with
    /// SHA-256, and with [`Error::Entropy`] if `rng` fails while drawing the
    /// two ephemeral secrets. Nothing survives a failed setup.
    pub fn setup<R>(
        role: Role,
        ciphersuite: Ciphersuite,
        password: &Password,
        rng: &mut R,
    ) -> Result<EcJpake>
    where
        R: CryptoRngCore + ?Sized,
    {
        ciphersuite
            .validate()
            .inspect_err(|_| debug!(%ciphersuite, "unsupported ciphersuite"))?;

        let password_scalar = Zeroizing::new(hash_to_scalar(password.as_bytes()));
        if bool::from(password_scalar.is_zero()) {
            return Err(Error::Configuration);
        }

        let first_secret = Zeroizing::new(random_scalar(rng)?);
        let second_secret = Zeroizing::new(random_scalar(rng)?);

        debug!(?role, %ciphersuite, "ec-jpake context set up");
        Ok(Self::with_secrets(
            role,
            ciphersuite,
            first_secret,
            second_secret,
            password_scalar,
        ))
    }

    pub(crate) fn with_secrets(
        role: Role,
        ciphersuite: Ciphersuite,
        first_secret: Zeroizing<Scalar>,
        second_secret: Zeroizing<Scalar>,
        password: Zeroizing<Scalar>,
    ) -> EcJpake {
        let g = generator();
        let own_keys = [g * *first_secret, g * *second_secret];

        EcJpake {
            ciphersuite,
            role,
            stage: Stage::Init,
            first_secret,
            second_secret,
            password,
            own_keys,
            peer_keys: None,
            peer_share: None,
        }
    }

    /// Role of this context.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Ciphersuite this context was set up with.
    pub fn ciphersuite(&self) -> Ciphersuite {
        self.ciphersuite
    }

    /// Initiator: write the round-one payload (ClientHello extension).
    ///
    /// Returns the number of bytes written to `out`, at most
    /// [`MAX_ROUND_ONE_LEN`].
    pub fn write_initiator_payload<R>(&mut self, out: &mut [u8], rng: &mut R) -> Result<usize>
    where
        R: CryptoRngCore + ?Sized,
    {
        self.require(Role::Initiator, Stage::Init)?;

        let round_one = self.round_one(rng)?;
        let mut w = Writer::with_capacity(RoundOne::MAX_LEN);
        round_one.encode(&mut w);
        let written = w.copy_to(out)?;

        debug!(len = written, "wrote initiator round one");
        self.advance(Stage::Round1Emitted);
        Ok(written)
    }

    /// Responder: read and verify the initiator's round-one payload.
    pub fn read_initiator_payload(&mut self, input: &[u8]) -> Result<()> {
        self.require(Role::Responder, Stage::Init)?;

        let peer_keys = self
            .parse_round_one(input)
            .inspect_err(|e| debug!(error = %e, "rejected initiator round one"))?;

        debug!("accepted initiator round one");
        self.peer_keys = Some(peer_keys);
        self.advance(Stage::Round1Received);
        Ok(())
    }

    /// Responder: write round one followed by round two (ServerHello
    /// extension).
    ///
    /// Returns the number of bytes written to `out`, at most
    /// [`MAX_RESPONDER_PAYLOAD_LEN`].
    pub fn write_responder_payload<R>(&mut self, out: &mut [u8], rng: &mut R) -> Result<usize>
    where
        R: CryptoRngCore + ?Sized,
    {
        self.require(Role::Responder, Stage::Round1Received)?;

        let round_one = self.round_one(rng)?;
        let round_two = self.round_two(rng)?;
        let mut w = Writer::with_capacity(MAX_RESPONDER_PAYLOAD_LEN);
        round_one.encode(&mut w);
        round_two.encode(&mut w);
        let written = w.copy_to(out)?;

        debug!(len = written, "wrote responder round one and round two");
        self.advance(Stage::Round2Emitted);
        Ok(written)
    }

    /// Initiator: read and verify the responder's round one and round two.
    ///
    /// Nothing is stored unless every proof in the payload checks out.
    pub fn read_responder_payload(&mut self, input: &[u8]) -> Result<()> {
        self.require(Role::Initiator, Stage::Round1Emitted)?;

        let (peer_keys, peer_share) = self
            .parse_responder_payload(input)
            .inspect_err(|e| debug!(error = %e, "rejected responder payload"))?;

        debug!("accepted responder round one and round two");
        self.peer_keys = Some(peer_keys);
        self.peer_share = Some(peer_share);
        self.advance(Stage::Round1Received);
        Ok(())
    }

    /// Initiator: write the round-two payload (ClientKeyExchange).
    ///
    /// The responder's share has already been verified, so this completes
    /// the exchange on the initiator side. Returns the number of bytes
    /// written, at most [`MAX_ROUND_TWO_LEN`].
    pub fn write_initiator_round_two<R>(&mut self, out: &mut [u8], rng: &mut R) -> Result<usize>
    where
        R: CryptoRngCore + ?Sized,
    {
        self.require(Role::Initiator, Stage::Round1Received)?;

        let round_two = self.round_two(rng)?;
        let mut w = Writer::with_capacity(RoundTwo::MAX_LEN);
        round_two.encode(&mut w);
        let written = w.copy_to(out)?;

        debug!(len = written, "wrote initiator round two");
        self.advance(Stage::Round2Emitted);
        self.advance(Stage::Round2Received);
        Ok(written)
    }

    /// Responder: read and verify the initiator's round-two payload.
    pub fn read_initiator_round_two(&mut self, input: &[u8]) -> Result<()> {
        self.require(Role::Responder, Stage::Round2Emitted)?;

        let peer_share = self
            .parse_round_two(input)
            .inspect_err(|e| debug!(error = %e, "rejected initiator round two"))?;

        debug!("accepted initiator round two");
        self.peer_share = Some(peer_share);
        self.advance(Stage::Round2Received);
        Ok(())
    }

    /// Derive the session key.
    ///
    /// Only valid once both round-two shares are known. The context is spent
    /// afterwards, whether or not derivation succeeds: secrets are wiped and
    /// further calls return [`Error::Sequence`].
    pub fn derive_session_key(&mut self) -> Result<SessionKey> {
        if self.stage != Stage::Round2Received {
            debug!(stage = ?self.stage, "session key requested out of sequence");
            return Err(Error::Sequence);
        }
        let (peer_keys, peer_share) = match (self.peer_keys, self.peer_share) {
            (Some(keys), Some(share)) => (keys, share),
            _ => return Err(Error::Sequence),
        };

        let key = shared_point(
            &peer_share,
            &peer_keys[1],
            &self.second_secret,
            &self.password,
        )
        .map(|shared| session_key(&shared));

        self.wipe();
        self.advance(Stage::Complete);
        key.inspect_err(|e| debug!(error = %e, "session key derivation failed"))
    }

    /// Wipe all secrets and discard all points.
    pub fn destroy(mut self) {
        self.wipe();
        trace!(role = ?self.role, stage = ?self.stage, "ec-jpake context destroyed");
    }

    fn require(&self, role: Role, stage: Stage) -> Result<()> {
        if self.role == role && self.stage == stage {
            Ok(())
        } else {
            debug!(
                role = ?self.role,
                stage = ?self.stage,
                expected_role = ?role,
                expected_stage = ?stage,
                "operation called out of sequence"
            );
            Err(Error::Sequence)
        }
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(next > self.stage);
        trace!(role = ?self.role, from = ?self.stage, to = ?next, "stage transition");
        self.stage = next;
    }

    fn round_one<R>(&self, rng: &mut R) -> Result<RoundOne>
    where
        R: CryptoRngCore + ?Sized,
    {
        RoundOne::generate(self.role, &self.first_secret, &self.second_secret, rng)
    }

    fn round_two<R>(&self, rng: &mut R) -> Result<RoundTwo>
    where
        R: CryptoRngCore + ?Sized,
    {
        let peer_keys = self.peer_keys.as_ref().ok_or(Error::Sequence)?;
        RoundTwo::generate(
            self.role,
            &self.own_keys[0],
            peer_keys,
            &self.second_secret,
            &self.password,
            rng,
        )
    }

    fn parse_round_one(&self, input: &[u8]) -> Result<[ProjectivePoint; 2]> {
        let mut r = Reader::new(input);
        let round_one = RoundOne::decode(&mut r)?;
        r.finish()?;
        round_one.verify(self.role.peer())
    }

    fn parse_responder_payload(
        &self,
        input: &[u8],
    ) -> Result<([ProjectivePoint; 2], ProjectivePoint)> {
        let mut r = Reader::new(input);
        let round_one = RoundOne::decode(&mut r)?;
        let round_two = RoundTwo::decode(&mut r)?;
        r.finish()?;

        let peer = self.role.peer();
        let peer_keys = round_one.verify(peer)?;
        let peer_share = round_two.verify(peer, &peer_keys[0], &self.own_keys)?;
        Ok((peer_keys, peer_share))
    }

    fn parse_round_two(&self, input: &[u8]) -> Result<ProjectivePoint> {
        let peer_keys = self.peer_keys.as_ref().ok_or(Error::Sequence)?;
        let mut r = Reader::new(input);
        let round_two = RoundTwo::decode(&mut r)?;
        r.finish()?;
        round_two.verify(self.role.peer(), &peer_keys[0], &self.own_keys)
    }

    #[cfg(test)]
    pub(crate) fn is_wiped(&self) -> bool {
        use p256::elliptic_curve::group::Group;

        bool::from(
            self.first_secret.is_zero()
                & self.second_secret.is_zero()
                & self.password.is_zero()
                & self.own_keys[0].is_identity()
                & self.own_keys[1].is_identity(),
        ) && self.peer_keys.is_none()
            && self.peer_share.is_none()
    }

    fn wipe(&mut self) {
        self.first_secret.zeroize();
        self.second_secret.zeroize();
        self.password.zeroize();
        self.own_keys.zeroize();
        self.peer_keys = None;
        self.peer_share = None;
    }
}

impl Drop for EcJpake {
    fn drop(&mut self) {
        self.wipe();
    }
}

impl fmt::Debug for EcJpake {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("EcJpake")
            .field("ciphersuite", &self.ciphersuite)
            .field("role", &self.role)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}
