//! Known-answer and internal tests.
//!
//! The P-256 vectors were computed with an independent Python implementation
//! of the same algebra; the challenge vector is the one shipped with the
//! Thread / mbed TLS EC-JPAKE self-test.
use super::*;
use crate::{
    codec::{Reader, Writer},
    group::{generator, hash_to_scalar, random_scalar},
    kdf::shared_point,
    round_two::{blinded_secret, combined_generator},
    selftest::*,
    zkp::{challenge, proof_id, prove, prove_with_nonce, verify, ProofKind},
};
use core::num::NonZeroU32;
use p256::{
    elliptic_curve::{sec1::ToEncodedPoint, PrimeField},
    FieldBytes, Scalar,
};
use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRng, RngCore, SeedableRng};
use std::{format, vec, vec::Vec};
use zeroize::Zeroizing;

fn scalar(bytes: &[u8; 32]) -> Scalar {
    Scalar::from_repr(FieldBytes::clone_from_slice(bytes)).unwrap()
}

/// Writes the same byte forever, or fails.
struct FixedRng(Option<u8>);

impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        rand_core::impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.try_fill_bytes(dest).unwrap()
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), rand_core::Error> {
        match self.0 {
            Some(b) => {
                dest.fill(b);
                Ok(())
            }
            None => Err(NonZeroU32::new(rand_core::Error::CUSTOM_START).unwrap().into()),
        }
    }
}

impl CryptoRng for FixedRng {}

fn kat_context(role: Role) -> EcJpake {
    let (first, second) = match role {
        Role::Initiator => (&X1_SECRET, &X2_SECRET),
        Role::Responder => (&X3_SECRET, &X4_SECRET),
    };
    EcJpake::with_secrets(
        role,
        Ciphersuite::P256_SHA256,
        Zeroizing::new(scalar(first)),
        Zeroizing::new(scalar(second)),
        Zeroizing::new(hash_to_scalar(KAT_PASSWORD)),
    )
}

#[test]
fn test_challenge_hash() {
    let g = generator();
    let v = crate::group::bytes_to_element(&HASH_COMMITMENT).unwrap();
    let x = crate::group::bytes_to_element(&HASH_PUBLIC).unwrap();
    let h = challenge(&g, &v, &x, b"client");
    assert_eq!(
        hex::encode(h.to_repr()),
        "ecf3244616cea5345846d245ba27633650c4703d560c7a7c5169fea7a3f77910"
    );

    // any change to the id changes the challenge
    assert_ne!(challenge(&g, &v, &x, b"server"), h);
    assert_ne!(challenge(&g, &v, &x, b"client1"), h);
}

#[test]
fn test_password_to_scalar() {
    let s = hash_to_scalar(b"threadjpaketest");
    assert_eq!(
        hex::encode(s.to_repr()),
        "c0648bf9f50a5f7476265a03b4e81416aedfc7ef71c6c01c5d66ecab09a5700d"
    );
}

#[test]
fn test_proof_vector() {
    let (public, proof) = prove_with_nonce(
        &generator(),
        &scalar(&X1_SECRET),
        &scalar(&PROOF_NONCE),
        b"client1",
    );
    assert_eq!(public.to_affine().to_encoded_point(false).as_bytes(), X1_PUBLIC);
    assert_eq!(
        proof.commitment.to_affine().to_encoded_point(false).as_bytes(),
        PROOF_COMMITMENT
    );
    assert_eq!(
        hex::encode(proof.response.to_repr()),
        "d43e7cbbd8670b72f020dae314062d816005fdee944db5ff2bcb57c0918a90fd"
    );
    assert!(verify(&generator(), &public, &proof, b"client1").is_ok());
}

#[test]
fn test_proof_bound_to_id_and_base() {
    let mut rng = ChaCha20Rng::seed_from_u64(1);
    let g = generator();
    let secret = random_scalar(&mut rng).unwrap();
    let id = proof_id(Role::Initiator, ProofKind::FirstKey);
    let (public, proof) = prove(&g, &secret, id, &mut rng).unwrap();
    assert_eq!(verify(&g, &public, &proof, id), Ok(()));

    for role in [Role::Initiator, Role::Responder] {
        for kind in [ProofKind::FirstKey, ProofKind::SecondKey, ProofKind::RoundTwo] {
            let other = proof_id(role, kind);
            if other != id {
                assert_eq!(
                    verify(&g, &public, &proof, other),
                    Err(Error::Authentication)
                );
            }
        }
    }

    let other_base = g * Scalar::from(7u64);
    assert_eq!(
        verify(&other_base, &public, &proof, id),
        Err(Error::Authentication)
    );

    let mut bad = proof;
    bad.response += Scalar::ONE;
    assert_eq!(verify(&g, &public, &bad, id), Err(Error::Authentication));

    let mut bad = proof;
    bad.commitment += g;
    assert_eq!(verify(&g, &public, &bad, id), Err(Error::Authentication));
}

#[test]
fn test_proof_ids() {
    let ids: Vec<&[u8]> = vec![
        proof_id(Role::Initiator, ProofKind::FirstKey),
        proof_id(Role::Initiator, ProofKind::SecondKey),
        proof_id(Role::Initiator, ProofKind::RoundTwo),
        proof_id(Role::Responder, ProofKind::FirstKey),
        proof_id(Role::Responder, ProofKind::SecondKey),
        proof_id(Role::Responder, ProofKind::RoundTwo),
    ];
    assert_eq!(
        ids,
        vec![
            &b"client1"[..],
            b"client2",
            b"client2round",
            b"server1",
            b"server2",
            b"server2round",
        ]
    );
}

#[test]
fn test_scalar_encoding() {
    let mut w = Writer::default();
    w.put_scalar(&Scalar::ONE);
    w.put_scalar(&Scalar::ZERO);
    w.put_scalar(&Scalar::from(0x1234u64));
    assert_eq!(hex::encode(w.into_vec()), "00010100010000021234");

    let mut r = Reader::new(&[0x00, 0x01, 0x01, 0x00, 0x02, 0x12, 0x34]);
    assert_eq!(r.get_scalar(), Ok(Scalar::ONE));
    assert_eq!(r.get_scalar(), Ok(Scalar::from(0x1234u64)));
    assert_eq!(r.finish(), Ok(()));

    // leading zero
    let mut r = Reader::new(&[0x00, 0x02, 0x00, 0x01]);
    assert_eq!(r.get_scalar(), Err(Error::Parse));
    // empty
    let mut r = Reader::new(&[0x00, 0x00]);
    assert_eq!(r.get_scalar(), Err(Error::Parse));
    // longer than the group order
    let mut long = vec![0x00, 0x21];
    long.extend_from_slice(&[0x01; 33]);
    assert_eq!(Reader::new(&long).get_scalar(), Err(Error::Parse));
    // truncated
    assert_eq!(Reader::new(&[0x00, 0x03, 0x01]).get_scalar(), Err(Error::Parse));

    // the group order itself is not a valid scalar
    let mut n = vec![0x00, 0x20];
    n.extend_from_slice(
        &hex::decode("ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551").unwrap(),
    );
    assert_eq!(Reader::new(&n).get_scalar(), Err(Error::Parse));
}

#[test]
fn test_point_encoding() {
    let g = generator();
    let mut w = Writer::default();
    w.put_point(&g);
    let encoded = w.into_vec();
    assert_eq!(encoded.len(), 66);
    assert_eq!(&encoded[..2], &[0x41, 0x04]);

    let mut r = Reader::new(&encoded);
    assert_eq!(r.get_point(), Ok(g));
    assert_eq!(r.finish(), Ok(()));

    // compressed points are accepted on read
    let compressed = g.to_affine().to_encoded_point(true);
    let mut bytes = vec![compressed.len() as u8];
    bytes.extend_from_slice(compressed.as_bytes());
    assert_eq!(Reader::new(&bytes).get_point(), Ok(g));

    // off the curve
    let mut off_curve = encoded.clone();
    off_curve[65] ^= 0x01;
    assert_eq!(
        Reader::new(&off_curve).get_point(),
        Err(Error::Authentication)
    );

    // identity
    assert_eq!(
        Reader::new(&[0x01, 0x00]).get_point(),
        Err(Error::Authentication)
    );

    // not SEC1 at all
    let mut bad_tag = encoded.clone();
    bad_tag[1] = 0x07;
    assert_eq!(Reader::new(&bad_tag).get_point(), Err(Error::Parse));
    assert_eq!(Reader::new(&[0x00]).get_point(), Err(Error::Parse));
    assert_eq!(Reader::new(&encoded[..40]).get_point(), Err(Error::Parse));

    // trailing bytes
    let mut r = Reader::new(&[0x41]);
    assert_eq!(r.get_point(), Err(Error::Parse));
    let trailing = [encoded.as_slice(), &[0u8]].concat();
    let mut r = Reader::new(&trailing);
    assert!(r.get_point().is_ok());
    assert_eq!(r.finish(), Err(Error::Parse));
}

#[test]
fn test_copy_to_writes_nothing_when_short() {
    let mut w = Writer::default();
    w.put_point(&generator());
    let mut out = [0xaau8; 65];
    assert_eq!(
        w.copy_to(&mut out),
        Err(Error::BufferTooSmall { required: 66 })
    );
    assert!(out.iter().all(|&b| b == 0xaa));

    let mut out = [0u8; 70];
    assert_eq!(w.copy_to(&mut out), Ok(66));
}

#[test]
fn test_random_scalar() {
    assert_eq!(random_scalar(&mut FixedRng(None)), Err(Error::Entropy));
    // zero is rejected, as is anything not below the group order
    assert_eq!(random_scalar(&mut FixedRng(Some(0x00))), Err(Error::Entropy));
    assert_eq!(random_scalar(&mut FixedRng(Some(0xff))), Err(Error::Entropy));
    assert_eq!(
        random_scalar(&mut FixedRng(Some(0x01))).map(|s| hex::encode(s.to_repr())),
        Ok("0101010101010101010101010101010101010101010101010101010101010101".into())
    );
}

#[test]
fn test_identity_generator_rejected() {
    let g = generator();
    let a = g * Scalar::from(3u64);
    let b = g * Scalar::from(5u64);
    let c = -(a + b);
    assert_eq!(combined_generator(&a, &b, &c), Err(Error::Authentication));
    assert!(combined_generator(&a, &b, &b).is_ok());
}

#[test]
fn test_identity_shared_point_rejected() {
    let g = generator();
    let second = Scalar::from(11u64);
    let password = hash_to_scalar(b"password");
    let peer_second = g * Scalar::from(13u64);
    // a peer share that cancels out exactly
    let peer_share = peer_second * *blinded_secret(&second, &password);
    assert_eq!(
        shared_point(&peer_share, &peer_second, &second, &password).map(|_| ()),
        Err(Error::Authentication)
    );
}

#[test]
fn test_key_agreement_vector() {
    let mut initiator = kat_context(Role::Initiator);
    let mut responder = kat_context(Role::Responder);
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let (k1, k2) = crate::selftest::exchange(&mut initiator, &mut responder, &mut rng).unwrap();
    assert_eq!(k1, k2);
    assert_eq!(
        hex::encode(k1.as_bytes()),
        "afaf151d8acfe8aeb760b4501ac227f9858b588b00d52b4b5226754b07c0a1f7"
    );
}

#[test]
fn test_completion_wipes_secrets() {
    let mut initiator = kat_context(Role::Initiator);
    let mut responder = kat_context(Role::Responder);
    let mut rng = ChaCha20Rng::seed_from_u64(8);
    crate::selftest::exchange(&mut initiator, &mut responder, &mut rng).unwrap();

    for ctx in [&initiator, &responder] {
        assert_eq!(ctx.stage(), Stage::Complete);
        assert!(ctx.is_wiped());
    }

    assert_eq!(initiator.derive_session_key(), Err(Error::Sequence));
}

#[test]
fn test_max_lengths() {
    assert_eq!(MAX_ROUND_ONE_LEN, 332);
    assert_eq!(MAX_ROUND_TWO_LEN, 166);
    assert_eq!(MAX_RESPONDER_PAYLOAD_LEN, 498);
}

#[test]
fn test_self_test() {
    assert_eq!(self_test(), Ok(()));
}

#[test]
fn test_debug() {
    let ctx = kat_context(Role::Responder);
    assert_eq!(
        format!("{:?}", ctx),
        "EcJpake { ciphersuite: Ciphersuite { hash: Sha256, curve: Secp256r1 }, \
         role: Responder, stage: Init, .. }"
    );
}

#[test]
fn test_errors() {
    assert!(Error::Authentication.is_security_event());
    assert!(Error::Parse.is_security_event());
    assert!(!Error::Sequence.is_security_event());
    assert!(!Error::Entropy.is_security_event());
    assert!(!Error::Configuration.is_security_event());
    assert_eq!(
        format!("{}", Error::BufferTooSmall { required: 332 }),
        "output buffer too small, 332 bytes required"
    );
}
