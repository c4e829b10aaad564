//! Error types.

use core::fmt;

/// [`Result`][`core::result::Result`] type with `ecjpake`'s [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// EC-JPAKE errors.
///
/// [`Error::Sequence`] signals a bug in the calling code, while
/// [`Error::Authentication`] and [`Error::Parse`] mean the peer (or someone
/// in between) sent something that must not be trusted. See
/// [`Error::is_security_event`].
#[non_exhaustive]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The hash / curve pairing is not the one EC-JPAKE is defined for, or
    /// the password cannot be used.
    Configuration,

    /// The output buffer cannot hold the encoded payload. Nothing was written.
    BufferTooSmall {
        /// Number of bytes the payload needs
        required: usize,
    },

    /// The payload is truncated, has inconsistent lengths or trailing bytes.
    Parse,

    /// A zero-knowledge proof or a received point did not check out.
    Authentication,

    /// The operation is not valid for this role or at this stage.
    Sequence,

    /// The random number generator failed.
    Entropy,
}

impl Error {
    /// Whether this error must be handled as a potential active attack.
    ///
    /// The handshake should be aborted and the peer treated as untrusted.
    pub fn is_security_event(&self) -> bool {
        matches!(self, Error::Authentication | Error::Parse)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration => fmt.write_str("unsupported configuration"),
            Error::BufferTooSmall { required } => {
                write!(fmt, "output buffer too small, {required} bytes required")
            }
            Error::Parse => fmt.write_str("malformed payload"),
            Error::Authentication => fmt.write_str("authentication failed"),
            Error::Sequence => fmt.write_str("operation called out of sequence"),
            Error::Entropy => fmt.write_str("random number generator failure"),
        }
    }
}

impl core::error::Error for Error {}
