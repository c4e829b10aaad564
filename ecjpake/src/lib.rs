#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg",
    html_favicon_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg"
)]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

//! # Usage
//!
//! Both sides set up a context with the same password and agree ahead of
//! time who plays [`Role::Initiator`] (the TLS client) and who plays
//! [`Role::Responder`]. Four payloads are exchanged; afterwards each side
//! derives the same 32-byte [`SessionKey`] if, and only if, both used the
//! same password and nobody tampered with the messages.
//!
//! ```rust
//! use ecjpake::{
//!     EcJpake, Password, Role, MAX_RESPONDER_PAYLOAD_LEN, MAX_ROUND_ONE_LEN,
//!     MAX_ROUND_TWO_LEN,
//! };
//! use rand_core::OsRng;
//!
//! let password = Password::new(b"correct-password");
//! let mut client = EcJpake::new(Role::Initiator, &password)?;
//! let mut server = EcJpake::new(Role::Responder, &password)?;
//!
//! let mut e1 = [0u8; MAX_ROUND_ONE_LEN];
//! let n = client.write_initiator_payload(&mut e1, &mut OsRng)?;
//! server.read_initiator_payload(&e1[..n])?;
//!
//! let mut e2 = [0u8; MAX_RESPONDER_PAYLOAD_LEN];
//! let n = server.write_responder_payload(&mut e2, &mut OsRng)?;
//! client.read_responder_payload(&e2[..n])?;
//!
//! let mut e3 = [0u8; MAX_ROUND_TWO_LEN];
//! let n = client.write_initiator_round_two(&mut e3, &mut OsRng)?;
//! server.read_initiator_round_two(&e3[..n])?;
//!
//! let client_key = client.derive_session_key()?;
//! let server_key = server.derive_session_key()?;
//! assert_eq!(client_key, server_key);
//! # Ok::<(), ecjpake::Error>(())
//! ```
//!
//! A context is single use. Each operation is only valid for one role at one
//! [`Stage`]; anything else fails with [`Error::Sequence`] before any
//! cryptographic work is done. A payload that fails to parse or verify leaves
//! the context untouched, so the caller decides whether to abort.
//!
//! # Protocol description
//!
//! This is EC-JPAKE as profiled for TLS[1] and described in RFC 8236[2].
//! All arithmetic is on NIST P-256 with generator `G` and order `n`; `H` is
//! SHA-256.
//!
//! |       Initiator (client)        |   Data transfer                          |      Responder (server)         |
//! |---------------------------------|------------------------------------------|---------------------------------|
//! |`x1, x2 = ${1..n-1}`             |                                          |`x3, x4 = ${1..n-1}`             |
//! |`X1 = x1*G`, `X2 = x2*G`         |`X1, X2, ZKP(x1), ZKP(x2)` ->             |verify `ZKP(x1)`, `ZKP(x2)`      |
//! |                                 |                                          |`X3 = x3*G`, `X4 = x4*G`         |
//! |                                 |                                          |`B = (x4*s)*(X3+X1+X2)`          |
//! |verify all three proofs          | <- `X3, X4, ZKP(x3), ZKP(x4), B, ZKP(x4*s)` |                              |
//! |`A = (x2*s)*(X1+X3+X4)`          |`A, ZKP(x2*s)` ->                         |verify `ZKP(x2*s)`               |
//! |`K = (B - (x2*s)*X4)*x2`         |                                          |`K = (A - (x4*s)*X2)*x4`         |
//! |`sk = H(x(K))`                   |                                          |`sk = H(x(K))`                   |
//!
//! Variables and notations have the following meaning:
//!
//! - `s`: the password as a scalar, `H(password) mod n`
//! - `ZKP(x)`: Schnorr proof of knowledge of `x`, bound to the sender's
//!   role and the key's position
//! - `x(K)`: big-endian x-coordinate of `K`
//! - `*`: scalar multiplication
//!
//! Both sides compute `K = x2*x4*s*(x1 + x3)*G`.
//!
//! [1]: https://datatracker.ietf.org/doc/html/draft-cragie-tls-ecjpake-01
//! [2]: https://www.rfc-editor.org/rfc/rfc8236

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

mod ciphersuite;
mod codec;
mod context;
mod error;
mod group;
mod kdf;
mod round_one;
mod round_two;
mod selftest;
mod zkp;

pub use self::{
    ciphersuite::{Ciphersuite, CurveId, HashAlgorithm},
    context::{
        EcJpake, Password, Role, Stage, MAX_RESPONDER_PAYLOAD_LEN, MAX_ROUND_ONE_LEN,
        MAX_ROUND_TWO_LEN,
    },
    error::{Error, Result},
    kdf::SessionKey,
    selftest::{self_test, SelfTestError},
};

pub use rand_core;

#[cfg(feature = "getrandom")]
pub use rand_core::OsRng;

#[cfg(test)]
mod tests;
