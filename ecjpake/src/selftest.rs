//! Power-on self-test.
//!
//! Runs known-answer vectors for the proof challenge, a Schnorr proof and the
//! key agreement, then a complete deterministic exchange between two
//! contexts. Integrations that must check the primitive before first use
//! (FIPS-style start-up tests) call [`self_test`] once at boot.

use crate::{
    codec::{Reader, Writer},
    context::{MAX_RESPONDER_PAYLOAD_LEN, MAX_ROUND_ONE_LEN, MAX_ROUND_TWO_LEN},
    group::{bytes_to_element, bytes_to_scalar, element_to_bytes, generator, hash_to_scalar},
    kdf::{session_key, shared_point, SessionKey},
    round_one::KeyShare,
    round_two::RoundTwo,
    zkp::{challenge, prove_with_nonce},
    Ciphersuite, EcJpake, Role,
};
use core::fmt;
use p256::{elliptic_curve::PrimeField, FieldBytes, ProjectivePoint, Scalar};
use rand_core::{impls, CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// A self-test case produced the wrong answer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SelfTestError {
    case: &'static str,
}

impl SelfTestError {
    /// Name of the failing case.
    pub fn case(&self) -> &'static str {
        self.case
    }
}

impl fmt::Display for SelfTestError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "ec-jpake self-test failed: {}", self.case)
    }
}

impl core::error::Error for SelfTestError {}

fn check(case: &'static str, ok: bool) -> Result<(), SelfTestError> {
    if ok {
        Ok(())
    } else {
        tracing::debug!(case, "self-test case failed");
        Err(SelfTestError { case })
    }
}

/// Run every self-test case, stopping at the first failure.
pub fn self_test() -> Result<(), SelfTestError> {
    challenge_vector()?;
    proof_vector()?;
    key_agreement_vector()?;
    deterministic_exchange()?;
    tracing::debug!("ec-jpake self-test passed");
    Ok(())
}

fn scalar(bytes: &[u8; 32]) -> Result<Scalar, SelfTestError> {
    bytes_to_scalar(&FieldBytes::clone_from_slice(bytes))
        .map_err(|_| SelfTestError { case: "vector scalar" })
}

fn point(bytes: &[u8]) -> Result<ProjectivePoint, SelfTestError> {
    bytes_to_element(bytes).map_err(|_| SelfTestError { case: "vector point" })
}

fn challenge_vector() -> Result<(), SelfTestError> {
    let commitment = point(&HASH_COMMITMENT)?;
    let public = point(&HASH_PUBLIC)?;
    let h = challenge(&generator(), &commitment, &public, b"client");
    check("challenge hash", h.to_repr().as_slice() == HASH_CHALLENGE)
}

fn proof_vector() -> Result<(), SelfTestError> {
    let secret = Zeroizing::new(scalar(&X1_SECRET)?);
    let nonce = Zeroizing::new(scalar(&PROOF_NONCE)?);
    let g = generator();
    let (public, proof) = prove_with_nonce(&g, &secret, &nonce, b"client1");

    check(
        "proof public key",
        element_to_bytes(&public).as_bytes() == X1_PUBLIC,
    )?;
    check(
        "proof commitment",
        element_to_bytes(&proof.commitment).as_bytes() == PROOF_COMMITMENT,
    )?;
    check(
        "proof response",
        proof.response.to_repr().as_slice() == PROOF_RESPONSE,
    )?;

    let share = KeyShare { public, proof };
    check("proof verifies", share.verify(&g, b"client1").is_ok())?;
    check("proof bound to id", share.verify(&g, b"client2").is_err())?;

    let mut w = Writer::with_capacity(KeyShare::MAX_LEN);
    share.encode(&mut w);
    let mut encoded = [0u8; KeyShare::MAX_LEN];
    let len = w
        .copy_to(&mut encoded)
        .map_err(|_| SelfTestError { case: "proof encoding" })?;

    for i in 0..len {
        encoded[i] ^= 0x01;
        let accepted = decode_share(&encoded[..len])
            .map(|share| share.verify(&g, b"client1").is_ok())
            .unwrap_or(false);
        encoded[i] ^= 0x01;
        check("corrupted proof rejected", !accepted)?;
    }

    check(
        "encoded proof verifies",
        decode_share(&encoded[..len])
            .map(|share| share.verify(&g, b"client1").is_ok())
            .unwrap_or(false),
    )
}

fn decode_share(bytes: &[u8]) -> crate::Result<KeyShare> {
    let mut r = Reader::new(bytes);
    let share = KeyShare::decode(&mut r)?;
    r.finish()?;
    Ok(share)
}

fn key_agreement_vector() -> Result<(), SelfTestError> {
    let g = generator();
    let x1 = Zeroizing::new(scalar(&X1_SECRET)?);
    let x2 = Zeroizing::new(scalar(&X2_SECRET)?);
    let x3 = Zeroizing::new(scalar(&X3_SECRET)?);
    let x4 = Zeroizing::new(scalar(&X4_SECRET)?);
    let password = Zeroizing::new(hash_to_scalar(KAT_PASSWORD));

    let initiator_keys = [g * *x1, g * *x2];
    let responder_keys = [g * *x3, g * *x4];
    let mut rng = KatRng::new(b"key agreement");

    let initiator_share = RoundTwo::generate(
        Role::Initiator,
        &initiator_keys[0],
        &responder_keys,
        &x2,
        &password,
        &mut rng,
    )
    .map_err(|_| SelfTestError { case: "initiator share" })?;
    let responder_share = RoundTwo::generate(
        Role::Responder,
        &responder_keys[0],
        &initiator_keys,
        &x4,
        &password,
        &mut rng,
    )
    .map_err(|_| SelfTestError { case: "responder share" })?;

    check(
        "initiator share",
        element_to_bytes(&initiator_share.share.public).as_bytes() == INITIATOR_SHARE,
    )?;
    check(
        "responder share",
        element_to_bytes(&responder_share.share.public).as_bytes() == RESPONDER_SHARE,
    )?;

    let a = initiator_share
        .verify(Role::Initiator, &initiator_keys[0], &responder_keys)
        .map_err(|_| SelfTestError { case: "initiator share proof" })?;
    let b = responder_share
        .verify(Role::Responder, &responder_keys[0], &initiator_keys)
        .map_err(|_| SelfTestError { case: "responder share proof" })?;

    let initiator_key = shared_point(&b, &responder_keys[1], &x2, &password)
        .map(|k| session_key(&k))
        .map_err(|_| SelfTestError { case: "initiator session key" })?;
    let responder_key = shared_point(&a, &initiator_keys[1], &x4, &password)
        .map(|k| session_key(&k))
        .map_err(|_| SelfTestError { case: "responder session key" })?;

    check(
        "initiator session key",
        initiator_key.as_bytes() == &SESSION_KEY,
    )?;
    check("responder session key", responder_key == initiator_key)
}

fn deterministic_exchange() -> Result<(), SelfTestError> {
    let password = Zeroizing::new(hash_to_scalar(KAT_PASSWORD));
    let mut initiator = EcJpake::with_secrets(
        Role::Initiator,
        Ciphersuite::P256_SHA256,
        Zeroizing::new(scalar(&X1_SECRET)?),
        Zeroizing::new(scalar(&X2_SECRET)?),
        password.clone(),
    );
    let mut responder = EcJpake::with_secrets(
        Role::Responder,
        Ciphersuite::P256_SHA256,
        Zeroizing::new(scalar(&X3_SECRET)?),
        Zeroizing::new(scalar(&X4_SECRET)?),
        password,
    );

    let (initiator_key, responder_key) =
        exchange(&mut initiator, &mut responder, &mut KatRng::new(b"exchange"))
            .map_err(|_| SelfTestError { case: "exchange" })?;

    check("exchange keys agree", initiator_key == responder_key)?;
    check(
        "exchange session key",
        initiator_key.as_bytes() == &SESSION_KEY,
    )
}

/// Run all four messages between two fresh contexts.
pub(crate) fn exchange<R>(
    initiator: &mut EcJpake,
    responder: &mut EcJpake,
    rng: &mut R,
) -> crate::Result<(SessionKey, SessionKey)>
where
    R: rand_core::CryptoRngCore + ?Sized,
{
    let mut e1 = [0u8; MAX_ROUND_ONE_LEN];
    let mut e2 = [0u8; MAX_RESPONDER_PAYLOAD_LEN];
    let mut e3 = [0u8; MAX_ROUND_TWO_LEN];

    let n = initiator.write_initiator_payload(&mut e1, rng)?;
    responder.read_initiator_payload(&e1[..n])?;
    let n = responder.write_responder_payload(&mut e2, rng)?;
    initiator.read_responder_payload(&e2[..n])?;
    let n = initiator.write_initiator_round_two(&mut e3, rng)?;
    responder.read_initiator_round_two(&e3[..n])?;

    Ok((
        initiator.derive_session_key()?,
        responder.derive_session_key()?,
    ))
}

/// SHA-256 in counter mode over a fixed label.
///
/// Only for reproducible self-test runs: its output is fully determined by
/// the label.
pub(crate) struct KatRng {
    block: [u8; 32],
    label: &'static [u8],
    counter: u64,
    used: usize,
}

impl KatRng {
    pub(crate) fn new(label: &'static [u8]) -> Self {
        Self {
            block: [0u8; 32],
            label,
            counter: 0,
            used: 32,
        }
    }

    fn refill(&mut self) {
        let digest = Sha256::new()
            .chain_update(self.label)
            .chain_update(self.counter.to_be_bytes())
            .finalize();
        self.block.copy_from_slice(&digest);
        self.counter += 1;
        self.used = 0;
    }
}

impl RngCore for KatRng {
    fn next_u32(&mut self) -> u32 {
        impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest {
            if self.used == self.block.len() {
                self.refill();
            }
            *byte = self.block[self.used];
            self.used += 1;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for KatRng {}

// Challenge vector: h = H(G || V || X || "client").

pub(crate) const HASH_COMMITMENT: [u8; 65] = [
    0x04, 0xfa, 0x9a, 0x24, 0x9d, 0x73, 0x6e, 0x30, 0x28, 0xd1, 0x2d, 0xf1,
    0xdc, 0xfa, 0x22, 0xd1, 0xed, 0x62, 0x82, 0xbf, 0xab, 0x27, 0x7c, 0x7c,
    0x52, 0x56, 0xf3, 0xfd, 0x38, 0x07, 0xa5, 0xae, 0xe0, 0x72, 0xfb, 0x4d,
    0x9c, 0x2b, 0xd6, 0xa4, 0x70, 0xf7, 0xb4, 0xd0, 0xbd, 0xfb, 0x4a, 0x94,
    0x96, 0xcf, 0xcd, 0xd3, 0x53, 0xf9, 0x90, 0x3c, 0x0a, 0x69, 0xa4, 0x4b,
    0x18, 0xc6, 0xd2, 0x9b, 0xb8,
];

pub(crate) const HASH_PUBLIC: [u8; 65] = [
    0x04, 0x52, 0xa4, 0xda, 0x90, 0xa5, 0x15, 0x7f, 0xc0, 0xe5, 0x1f, 0x79,
    0x4b, 0xe3, 0xbb, 0x3f, 0x1d, 0xf8, 0xdf, 0xb1, 0xe3, 0x18, 0xa8, 0x10,
    0xf2, 0x05, 0x2e, 0x64, 0xa8, 0xe8, 0x35, 0x64, 0xe8, 0xe2, 0x8c, 0x17,
    0x15, 0xab, 0xf7, 0x8d, 0x1f, 0x8b, 0x18, 0x99, 0x6d, 0x6a, 0xb7, 0xbd,
    0xcc, 0xbe, 0x52, 0x08, 0x1a, 0x3a, 0xe7, 0x65, 0x4b, 0xdf, 0x66, 0x62,
    0xf5, 0x74, 0xe0, 0xfd, 0x80,
];

pub(crate) const HASH_CHALLENGE: [u8; 32] = [
    0xec, 0xf3, 0x24, 0x46, 0x16, 0xce, 0xa5, 0x34, 0x58, 0x46, 0xd2, 0x45,
    0xba, 0x27, 0x63, 0x36, 0x50, 0xc4, 0x70, 0x3d, 0x56, 0x0c, 0x7a, 0x7c,
    0x51, 0x69, 0xfe, 0xa7, 0xa3, 0xf7, 0x79, 0x10,
];

// Key agreement vectors. Each secret is SHA-256("ecjpake kat x<i>") mod n,
// the nonce SHA-256("ecjpake kat nonce") mod n.

pub(crate) const KAT_PASSWORD: &[u8] = b"threadjpaketest";

pub(crate) const X1_SECRET: [u8; 32] = [
    0x09, 0x77, 0x59, 0x99, 0xed, 0xb9, 0xe1, 0x9d, 0x96, 0x28, 0xa5, 0x38,
    0x97, 0xea, 0xf2, 0x9f, 0xf3, 0xf6, 0x7f, 0xc6, 0x34, 0xe0, 0x16, 0xf7,
    0x6d, 0x0b, 0xab, 0xef, 0x8c, 0x0e, 0xed, 0xf7,
];

pub(crate) const X2_SECRET: [u8; 32] = [
    0xc7, 0x3e, 0x39, 0x92, 0x52, 0xce, 0x1f, 0xe6, 0xeb, 0x12, 0x3c, 0x14,
    0x13, 0x01, 0x35, 0xa2, 0xf9, 0xae, 0xe9, 0x83, 0x63, 0xd3, 0x59, 0xc2,
    0x79, 0xe1, 0x97, 0xa7, 0xdc, 0xd9, 0xb3, 0x13,
];

pub(crate) const X3_SECRET: [u8; 32] = [
    0x7b, 0xe5, 0x8e, 0x3e, 0x78, 0xeb, 0x30, 0x6e, 0xca, 0x75, 0x5b, 0x22,
    0x4f, 0xe8, 0x23, 0x41, 0x57, 0x41, 0x01, 0xb7, 0x93, 0x25, 0x26, 0x81,
    0xa6, 0x3e, 0x52, 0x98, 0xf0, 0x04, 0x79, 0x61,
];

pub(crate) const X4_SECRET: [u8; 32] = [
    0x10, 0xeb, 0x7d, 0xd2, 0xd6, 0xaf, 0x08, 0x15, 0xf0, 0xf2, 0x04, 0xf9,
    0x96, 0x80, 0x4f, 0x6f, 0xc6, 0x53, 0xb5, 0x2a, 0xc6, 0x31, 0x95, 0x38,
    0x54, 0xa4, 0xa7, 0x06, 0x78, 0x1d, 0x67, 0xb9,
];

pub(crate) const X1_PUBLIC: [u8; 65] = [
    0x04, 0x8a, 0x1a, 0x95, 0xac, 0x6b, 0x1d, 0xdc, 0xf8, 0xe4, 0x24, 0x88,
    0x53, 0x1e, 0xc4, 0xc1, 0x30, 0xf7, 0x85, 0x21, 0x50, 0xcf, 0x63, 0x17,
    0x14, 0x12, 0x4d, 0xab, 0x71, 0xc7, 0x68, 0xd6, 0x51, 0x7c, 0x41, 0x95,
    0x4e, 0x2a, 0x10, 0xd8, 0xb3, 0x9b, 0xb6, 0x64, 0x6b, 0xee, 0x84, 0x5a,
    0xf7, 0x3f, 0xa1, 0xa1, 0xf7, 0x1d, 0x7c, 0x5e, 0xd3, 0x12, 0x4c, 0x1e,
    0x80, 0x71, 0x4a, 0x9a, 0xf9,
];

pub(crate) const INITIATOR_SHARE: [u8; 65] = [
    0x04, 0x61, 0xc6, 0x89, 0xce, 0x46, 0x65, 0x89, 0x22, 0xec, 0x93, 0x1f,
    0x85, 0x23, 0xde, 0x69, 0x68, 0xfe, 0xe8, 0xab, 0x73, 0xb2, 0x0f, 0x3f,
    0x6b, 0x00, 0x7a, 0xa5, 0x83, 0xe0, 0x2c, 0x8f, 0xf0, 0xb7, 0xe2, 0x87,
    0x6d, 0x14, 0x43, 0x18, 0x2f, 0x61, 0x27, 0x95, 0x89, 0x1a, 0x2d, 0xf7,
    0xd9, 0xa5, 0xcf, 0xcd, 0xae, 0x6a, 0xc7, 0x5b, 0x7b, 0xa0, 0x3d, 0x5e,
    0x66, 0x97, 0xa5, 0xc1, 0xfb,
];

pub(crate) const RESPONDER_SHARE: [u8; 65] = [
    0x04, 0x68, 0x42, 0x11, 0x75, 0x6f, 0x29, 0xb0, 0x1d, 0x30, 0xf2, 0x8a,
    0x20, 0x88, 0x61, 0x18, 0xdb, 0x86, 0x84, 0x06, 0xce, 0x61, 0xd4, 0x48,
    0xc0, 0x4a, 0x1c, 0xde, 0xc4, 0x0d, 0x58, 0x7e, 0xad, 0x55, 0x07, 0x31,
    0xc3, 0xf0, 0x90, 0x73, 0xa7, 0x7b, 0x09, 0x23, 0xc7, 0xbc, 0xc4, 0xa1,
    0x92, 0x43, 0x14, 0x65, 0xe5, 0x75, 0x9f, 0x78, 0xd7, 0x96, 0x88, 0xed,
    0xf2, 0xba, 0xac, 0x7d, 0x6a,
];

pub(crate) const SESSION_KEY: [u8; 32] = [
    0xaf, 0xaf, 0x15, 0x1d, 0x8a, 0xcf, 0xe8, 0xae, 0xb7, 0x60, 0xb4, 0x50,
    0x1a, 0xc2, 0x27, 0xf9, 0x85, 0x8b, 0x58, 0x8b, 0x00, 0xd5, 0x2b, 0x4b,
    0x52, 0x26, 0x75, 0x4b, 0x07, 0xc0, 0xa1, 0xf7,
];

pub(crate) const PROOF_NONCE: [u8; 32] = [
    0xd7, 0x6b, 0x21, 0xae, 0x9e, 0x48, 0xe1, 0xe7, 0xd6, 0x5f, 0xd5, 0xb8,
    0x74, 0x76, 0x6c, 0x52, 0xb2, 0x4b, 0x49, 0x99, 0x9d, 0xc9, 0x91, 0xf6,
    0x60, 0xc3, 0xbe, 0xb2, 0xdc, 0xce, 0x27, 0xdc,
];

pub(crate) const PROOF_COMMITMENT: [u8; 65] = [
    0x04, 0x97, 0x9e, 0x6e, 0x8d, 0xf5, 0x2d, 0x70, 0xc2, 0x82, 0xc5, 0x31,
    0x02, 0xd9, 0xe9, 0x88, 0x2a, 0xe4, 0x81, 0x15, 0x53, 0xea, 0x64, 0xd2,
    0xaa, 0x57, 0x3d, 0xaa, 0x7d, 0x70, 0x95, 0x89, 0x46, 0x00, 0xee, 0x93,
    0x7c, 0x39, 0xf8, 0x70, 0x9e, 0xa8, 0xb0, 0x2f, 0x24, 0x09, 0x19, 0x2f,
    0xa4, 0xf3, 0x80, 0x3a, 0x54, 0x04, 0xfe, 0x6a, 0xb5, 0xdb, 0x02, 0xe3,
    0x20, 0x0e, 0x6b, 0x48, 0xdb,
];

pub(crate) const PROOF_RESPONSE: [u8; 32] = [
    0xd4, 0x3e, 0x7c, 0xbb, 0xd8, 0x67, 0x0b, 0x72, 0xf0, 0x20, 0xda, 0xe3,
    0x14, 0x06, 0x2d, 0x81, 0x60, 0x05, 0xfd, 0xee, 0x94, 0x4d, 0xb5, 0xff,
    0x2b, 0xcb, 0x57, 0xc0, 0x91, 0x8a, 0x90, 0xfd,
];
