//! Payload encoding.
//!
//! | item   | encoding                                                      |
//! |--------|---------------------------------------------------------------|
//! | point  | 1-byte length, SEC1 point (65 bytes uncompressed when written) |
//! | scalar | 2-byte big-endian length, minimal big-endian magnitude        |
//!
//! A scalar of value zero is written as the single byte `0x00`.

use crate::{
    group::{bytes_to_element, bytes_to_scalar, element_to_bytes, SCALAR_LENGTH},
    Error, Result,
};
use alloc::vec::Vec;
use p256::{elliptic_curve::PrimeField, FieldBytes, ProjectivePoint, Scalar};

/// Encoded size of an uncompressed point with its length prefix.
pub(crate) const POINT_LEN: usize = 1 + crate::group::ELEMENT_LENGTH;

/// Largest encoded size of a scalar with its length prefix.
pub(crate) const MAX_SCALAR_LEN: usize = 2 + SCALAR_LENGTH;

/// Accumulates an outgoing payload before it is copied to the caller.
#[derive(Debug, Default)]
pub(crate) struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn put_point(&mut self, e: &ProjectivePoint) {
        let encoded = element_to_bytes(e);
        let bytes = encoded.as_bytes();
        // a SEC1 P-256 encoding is at most 65 bytes
        self.buf.push(bytes.len() as u8);
        self.buf.extend_from_slice(bytes);
    }

    pub(crate) fn put_scalar(&mut self, s: &Scalar) {
        let bytes = s.to_repr();
        let start = bytes
            .iter()
            .position(|&b| b != 0)
            .unwrap_or(SCALAR_LENGTH - 1);
        let magnitude = &bytes[start..];
        self.buf
            .extend_from_slice(&(magnitude.len() as u16).to_be_bytes());
        self.buf.extend_from_slice(magnitude);
    }

    /// Copy the payload into `out`, writing nothing if it does not fit.
    pub(crate) fn copy_to(&self, out: &mut [u8]) -> Result<usize> {
        let required = self.buf.len();
        let dst = out
            .get_mut(..required)
            .ok_or(Error::BufferTooSmall { required })?;
        dst.copy_from_slice(&self.buf);
        Ok(required)
    }

    #[cfg(test)]
    pub(crate) fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

/// Bounds-checked cursor over an incoming payload.
#[derive(Debug)]
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.buf.len() < n {
            return Err(Error::Parse);
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    pub(crate) fn get_point(&mut self) -> Result<ProjectivePoint> {
        let len = self.take(1)?[0] as usize;
        if len == 0 {
            return Err(Error::Parse);
        }
        bytes_to_element(self.take(len)?)
    }

    pub(crate) fn get_scalar(&mut self) -> Result<Scalar> {
        let len_bytes = self.take(2)?;
        let len = u16::from_be_bytes([len_bytes[0], len_bytes[1]]) as usize;
        if len == 0 || len > SCALAR_LENGTH {
            return Err(Error::Parse);
        }

        let magnitude = self.take(len)?;
        if len > 1 && magnitude[0] == 0 {
            return Err(Error::Parse);
        }

        let mut repr = FieldBytes::default();
        repr[SCALAR_LENGTH - len..].copy_from_slice(magnitude);
        bytes_to_scalar(&repr)
    }

    /// Fail unless the whole payload has been consumed.
    pub(crate) fn finish(self) -> Result<()> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(Error::Parse)
        }
    }
}
