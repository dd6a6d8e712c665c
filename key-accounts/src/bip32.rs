//! Public (non-hardened) BIP32-style child key derivation
//!
//! Only the public half of hierarchical derivation lives here: accounts in
//! this library hold chain codes and public points, never extended private
//! keys, and derive exactly two levels deep — the change flag, then the
//! address index.

use core::fmt;

use bitcoin_hashes::{sha512, Hash, HashEngine, Hmac, HmacEngine};
use secp256k1::{PublicKey, Scalar, Secp256k1, Verification};

use crate::error::{Error, Result};

/// First index of the hardened range, which public derivation cannot reach
pub const HARDENED_START: u32 = 1 << 31;

/// A chain code: auxiliary entropy paired with a public key, enabling
/// child derivation without the private key
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainCode([u8; 32]);

impl ChainCode {
    /// Wrap raw chain code bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Decode a chain code from its persisted hex form
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::MalformedKey("chain code must be 32 bytes".into()))?;
        Ok(Self(bytes))
    }

    /// Encode in the persisted hex form
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The raw chain code bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for ChainCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainCode({})", self.to_hex())
    }
}

/// An extended public key: a compressed curve point plus its chain code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendedPubKey {
    /// The chain code
    pub chain_code: ChainCode,
    /// The public key
    pub public_key: PublicKey,
}

impl ExtendedPubKey {
    /// Create an extended public key from its parts
    pub fn new(chain_code: ChainCode, public_key: PublicKey) -> Self {
        Self {
            chain_code,
            public_key,
        }
    }

    /// Public->public child key derivation.
    ///
    /// `HMAC-SHA512(chain_code, serialized_compressed(K) || ser32(i))`; the
    /// left half tweaks the parent point, the right half is the child chain
    /// code. Hardened indices are rejected: they require the private key.
    pub fn ckd_pub<C: Verification>(
        &self,
        secp: &Secp256k1<C>,
        i: u32,
    ) -> Result<ExtendedPubKey> {
        if i >= HARDENED_START {
            return Err(Error::InvalidChildNumber(i));
        }

        let mut engine = HmacEngine::<sha512::Hash>::new(self.chain_code.as_bytes());
        engine.input(&self.public_key.serialize());
        engine.input(&i.to_be_bytes());
        let result = Hmac::<sha512::Hash>::from_engine(engine).to_byte_array();

        let mut left = [0u8; 32];
        left.copy_from_slice(&result[..32]);
        let tweak = Scalar::from_be_bytes(left).map_err(|_| Error::InvalidTweak)?;
        let public_key = self.public_key.add_exp_tweak(secp, &tweak)?;

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&result[32..]);

        Ok(ExtendedPubKey {
            chain_code: ChainCode(chain_code),
            public_key,
        })
    }

    /// Derive the leaf public key at the fixed two-level path
    /// `change / index`.
    pub fn derive_leaf<C: Verification>(
        &self,
        secp: &Secp256k1<C>,
        for_change: bool,
        index: u32,
    ) -> Result<PublicKey> {
        let child = self.ckd_pub(secp, u32::from(for_change))?;
        Ok(child.ckd_pub(secp, index)?.public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // master key of BIP32 test vector 1 (seed 000102030405060708090a0b0c0d0e0f)
    fn test_vector_key() -> ExtendedPubKey {
        let chain_code = ChainCode::from_hex(
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508",
        )
        .unwrap();
        let public_key = PublicKey::from_slice(
            &hex::decode("0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2")
                .unwrap(),
        )
        .unwrap();
        ExtendedPubKey::new(chain_code, public_key)
    }

    #[test]
    fn test_two_level_leaf() {
        let secp = Secp256k1::verification_only();
        let key = test_vector_key();

        let leaf = key.derive_leaf(&secp, false, 0).unwrap();
        assert_eq!(
            hex::encode(leaf.serialize()),
            "02756de182c5dd4b717ea87e693006da62dbb3cddaa4a5cad2ed1f5bbab755f0f5"
        );
    }

    #[test]
    fn test_hardened_index_rejected() {
        let secp = Secp256k1::verification_only();
        let key = test_vector_key();

        assert_eq!(
            key.ckd_pub(&secp, HARDENED_START),
            Err(Error::InvalidChildNumber(HARDENED_START))
        );
        assert!(key.derive_leaf(&secp, false, u32::MAX).is_err());
    }

    #[test]
    fn test_chain_code_hex() {
        let hex_str = "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508";
        let code = ChainCode::from_hex(hex_str).unwrap();
        assert_eq!(code.to_hex(), hex_str);

        assert!(ChainCode::from_hex("abcd").is_err());
        assert!(ChainCode::from_hex("xy").is_err());
    }
}
