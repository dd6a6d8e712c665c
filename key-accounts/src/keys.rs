//! Master public keys and WIF private keys

use core::fmt;

use secp256k1::{PublicKey, Secp256k1, SecretKey, Signing};

use crate::address::Network;
use crate::error::{Error, Result};

/// A master public key of the legacy deterministic scheme.
///
/// Stored wallets carry it as a 128-character hex string: the bare 64-byte
/// x/y coordinates of a secp256k1 point, without the `04` prefix. The point
/// is decoded once at construction; hex appears again only when dumping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterPublicKey {
    point: PublicKey,
}

impl MasterPublicKey {
    /// Decode a master public key from its hex representation.
    ///
    /// Accepts the bare 64-byte form as well as full 65-byte uncompressed
    /// and 33-byte compressed point encodings.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)?;
        let point = match bytes.len() {
            64 => {
                let mut full = [0u8; 65];
                full[0] = 0x04;
                full[1..].copy_from_slice(&bytes);
                PublicKey::from_slice(&full)
            }
            33 | 65 => PublicKey::from_slice(&bytes),
            n => {
                return Err(Error::MalformedKey(format!(
                    "master public key has invalid length {}",
                    n
                )))
            }
        };
        point
            .map(|point| Self { point })
            .map_err(|e| Error::MalformedKey(format!("invalid master public key: {}", e)))
    }

    /// Wrap an already-decoded point
    pub fn from_point(point: PublicKey) -> Self {
        Self { point }
    }

    /// The master key as a curve point
    pub fn as_point(&self) -> &PublicKey {
        &self.point
    }

    /// The bare 64-byte x/y coordinates
    pub fn raw_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(&self.point.serialize_uncompressed()[1..]);
        bytes
    }

    /// Encode in the persisted 128-character hex form
    pub fn to_hex(&self) -> String {
        hex::encode(self.raw_bytes())
    }
}

impl fmt::Display for MasterPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A derived private key together with its WIF encoding parameters
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PrivateKey {
    /// The secret key
    pub inner: SecretKey,
    /// Whether the corresponding public key is serialized compressed
    pub compressed: bool,
    /// The network this key is encoded for
    pub network: Network,
}

impl PrivateKey {
    /// Wrap a secret key that spends an uncompressed public key.
    ///
    /// The legacy scheme always spends uncompressed keys.
    pub fn new_uncompressed(inner: SecretKey, network: Network) -> Self {
        Self {
            inner,
            compressed: false,
            network,
        }
    }

    /// The public key for this private key
    pub fn public_key<C: Signing>(&self, secp: &Secp256k1<C>) -> PublicKey {
        self.inner.public_key(secp)
    }

    /// Serialize to WIF
    pub fn to_wif(&self) -> String {
        let mut data = Vec::with_capacity(34);
        data.push(self.network.wif_version());
        data.extend_from_slice(&self.inner.secret_bytes());
        if self.compressed {
            data.push(0x01);
        }
        base58ck::encode_check(&data)
    }

    /// Parse a WIF string
    pub fn from_wif(s: &str) -> Result<Self> {
        let data = base58ck::decode_check(s).map_err(|_| Error::Base58)?;

        let compressed = match data.len() {
            33 => false,
            34 if data[33] == 0x01 => true,
            _ => return Err(Error::MalformedKey("invalid WIF payload".into())),
        };

        let network = match data[0] {
            128 => Network::Bitcoin,
            239 => Network::Testnet,
            v => {
                return Err(Error::MalformedKey(format!(
                    "invalid WIF version byte {}",
                    v
                )))
            }
        };

        Ok(Self {
            inner: SecretKey::from_slice(&data[1..33])?,
            compressed,
            network,
        })
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Don't expose the secret in debug output
        write!(f, "PrivateKey(***)")
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wif())
    }
}
