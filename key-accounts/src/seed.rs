//! Seed stretching for the legacy deterministic scheme
//!
//! A wallet seed is low-entropy text, so it is stretched through a fixed
//! number of hash rounds before it becomes a secret exponent. This is
//! work-factor stretching, not a salted KDF: the same seed bytes always
//! produce the same exponent, on every machine and in every language.

use bitcoin_hashes::{sha256, Hash, HashEngine};
use secp256k1::{Secp256k1, SecretKey};

use crate::error::Result;
use crate::keys::MasterPublicKey;

/// Number of hash rounds applied when stretching a seed.
///
/// Protocol constant. Changing it invalidates every key ever derived from
/// an existing seed, so it is not configurable per call.
pub const STRETCH_ROUNDS: u32 = 100_000;

/// Stretch a seed into the master secret exponent.
///
/// Computes `digest = SHA256(digest || seed)` for [`STRETCH_ROUNDS`]
/// rounds, starting from `digest = seed`, and interprets the final digest
/// as a big-endian scalar.
pub fn stretch_seed(seed: &[u8]) -> Result<SecretKey> {
    let mut digest = round(seed, seed);
    for _ in 1..STRETCH_ROUNDS {
        digest = round(&digest, seed);
    }
    Ok(SecretKey::from_slice(&digest)?)
}

fn round(digest: &[u8], seed: &[u8]) -> [u8; 32] {
    let mut engine = sha256::Hash::engine();
    engine.input(digest);
    engine.input(seed);
    sha256::Hash::from_engine(engine).to_byte_array()
}

/// Recompute the master public key that belongs to a seed.
pub fn master_public_key(seed: &[u8]) -> Result<MasterPublicKey> {
    let secp = Secp256k1::new();
    let exponent = stretch_seed(seed)?;
    Ok(MasterPublicKey::from_point(exponent.public_key(&secp)))
}
