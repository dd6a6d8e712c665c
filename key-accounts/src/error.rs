//! Error types for the key-accounts library

use core::fmt;

use std::error;

/// Result type alias for key-accounts operations
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur during account construction and key derivation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The master public key recomputed from a seed does not match the
    /// stored one. Also covers a corrupted master key: the two cases are
    /// deliberately indistinguishable.
    InvalidSeed,
    /// Hex decoding or point decoding of stored key material failed
    MalformedKey(String),
    /// A persisted mapping is missing a field or has the wrong shape
    Serialization(String),
    /// An account with this identifier already exists in the registry
    AccountExists(String),
    /// Hardened child index passed to public-only derivation
    InvalidChildNumber(u32),
    /// A derived tweak scalar fell outside the curve order
    InvalidTweak,
    /// The operation needs a private key, but the account only holds
    /// public derivation material
    WatchOnly,
    /// Secp256k1 error
    Secp256k1(secp256k1::Error),
    /// Base58 decoding error
    Base58,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidSeed => write!(f, "invalid seed: master public key mismatch"),
            Error::MalformedKey(s) => write!(f, "malformed key material: {}", s),
            Error::Serialization(s) => write!(f, "serialization error: {}", s),
            Error::AccountExists(id) => write!(f, "account '{}' already exists", id),
            Error::InvalidChildNumber(n) => {
                write!(f, "child index {} is in the hardened range", n)
            }
            Error::InvalidTweak => write!(f, "derived tweak is out of range"),
            Error::WatchOnly => write!(f, "operation requires private key material"),
            Error::Secp256k1(e) => write!(f, "secp256k1 error: {}", e),
            Error::Base58 => write!(f, "base58 decoding error"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Secp256k1(e) => Some(e),
            _ => None,
        }
    }
}

impl From<secp256k1::Error> for Error {
    fn from(e: secp256k1::Error) -> Self {
        Error::Secp256k1(e)
    }
}

impl From<hex::FromHexError> for Error {
    fn from(e: hex::FromHexError) -> Self {
        Error::MalformedKey(e.to_string())
    }
}
