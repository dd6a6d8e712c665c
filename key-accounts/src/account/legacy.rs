//! The legacy ("type-2") deterministic scheme
//!
//! Public keys are derived by an additive tweak of a master point:
//! `pubkey(c, n) = mpk + z·G` with
//! `z = SHA256d("{n}:{c}:" || mpk_bytes)`, so addresses can be produced
//! from the master public key alone. Private keys additionally need the
//! stretched seed: `privkey(c, n) = (stretch(seed) + z) mod order`.

use core::slice;

use bitcoin_hashes::{sha256d, Hash};
use secp256k1::{Scalar, Secp256k1, SecretKey, Verification};
use serde_json::{Map, Value};

use crate::account::{string_field, InputInfo};
use crate::address::{Address, Network};
use crate::error::{Error, Result};
use crate::keys::{MasterPublicKey, PrivateKey};
use crate::script::MultisigScript;
use crate::seed;

/// The master public keys of a legacy account, one per cosigner.
///
/// The key set is fixed at construction; the variant is the spending
/// policy. Both multisig policies require two signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyKeys {
    /// Single-key P2PKH account
    Single(MasterPublicKey),
    /// 2-of-2 multisig account
    TwoOfTwo([MasterPublicKey; 2]),
    /// 2-of-3 multisig account
    TwoOfThree([MasterPublicKey; 3]),
}

impl LegacyKeys {
    /// All master keys in cosigner order
    pub fn all(&self) -> &[MasterPublicKey] {
        match self {
            LegacyKeys::Single(key) => slice::from_ref(key),
            LegacyKeys::TwoOfTwo(keys) => keys,
            LegacyKeys::TwoOfThree(keys) => keys,
        }
    }

    /// The first cosigner: the key the local wallet can sign for
    pub fn primary(&self) -> &MasterPublicKey {
        &self.all()[0]
    }
}

/// A legacy account: 1-3 master public keys and nothing else
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyAccount {
    keys: LegacyKeys,
}

impl LegacyAccount {
    /// Create an account over a fixed key set
    pub fn new(keys: LegacyKeys) -> Self {
        Self { keys }
    }

    /// Create a single-key account whose master key is recomputed from
    /// the seed
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        Ok(Self::new(LegacyKeys::Single(seed::master_public_key(seed)?)))
    }

    /// The account's key set
    pub fn keys(&self) -> &LegacyKeys {
        &self.keys
    }

    /// The per-sequence tweak scalar `z`
    fn sequence_scalar(
        mpk: &MasterPublicKey,
        for_change: bool,
        index: u32,
    ) -> Result<Scalar> {
        let mut data = format!("{}:{}:", index, u8::from(for_change)).into_bytes();
        data.extend_from_slice(&mpk.raw_bytes());
        let digest = sha256d::Hash::hash(&data).to_byte_array();
        Scalar::from_be_bytes(digest).map_err(|_| Error::InvalidTweak)
    }

    fn pubkey_for<C: Verification>(
        secp: &Secp256k1<C>,
        mpk: &MasterPublicKey,
        for_change: bool,
        index: u32,
    ) -> Result<[u8; 65]> {
        let z = Self::sequence_scalar(mpk, for_change, index)?;
        let point = mpk.as_point().add_exp_tweak(secp, &z)?;
        Ok(point.serialize_uncompressed())
    }

    /// The primary cosigner's public key at a sequence, uncompressed
    pub fn derive_pubkey(&self, for_change: bool, index: u32) -> Result<[u8; 65]> {
        let secp = Secp256k1::verification_only();
        Self::pubkey_for(&secp, self.keys.primary(), for_change, index)
    }

    fn cosigner_pubkeys(&self, for_change: bool, index: u32) -> Result<Vec<Vec<u8>>> {
        let secp = Secp256k1::verification_only();
        self.keys
            .all()
            .iter()
            .map(|mpk| Ok(Self::pubkey_for(&secp, mpk, for_change, index)?.to_vec()))
            .collect()
    }

    /// The redeem script at a sequence; `None` for the single-key policy
    pub fn redeem_script(
        &self,
        for_change: bool,
        index: u32,
    ) -> Result<Option<MultisigScript>> {
        match self.keys {
            LegacyKeys::Single(_) => Ok(None),
            LegacyKeys::TwoOfTwo(_) | LegacyKeys::TwoOfThree(_) => Ok(Some(
                MultisigScript::new(2, self.cosigner_pubkeys(for_change, index)?)?,
            )),
        }
    }

    /// The address at a sequence: P2PKH of the derived key, or P2SH of
    /// the redeem script for the multisig policies
    pub fn derive_address(
        &self,
        network: Network,
        for_change: bool,
        index: u32,
    ) -> Result<Address> {
        match self.redeem_script(for_change, index)? {
            None => Ok(Address::p2pkh(
                &self.derive_pubkey(for_change, index)?,
                network,
            )),
            Some(script) => Ok(script.address(network)),
        }
    }

    /// What a spender needs for an input at this sequence.
    ///
    /// The address is always the primary cosigner's single-key address,
    /// because that is the key this wallet can produce; for the multisig
    /// policies the redeem script needed to assemble the spend rides along.
    pub fn input_info(
        &self,
        network: Network,
        for_change: bool,
        index: u32,
    ) -> Result<InputInfo> {
        Ok(InputInfo {
            address: Address::p2pkh(&self.derive_pubkey(for_change, index)?, network),
            redeem_script: self.redeem_script(for_change, index)?,
        })
    }

    /// Derive a private key from an already-stretched secret exponent.
    ///
    /// Callers that hold the exponent must treat it as scoped material:
    /// derive what is needed and drop it.
    pub fn private_key_from_exponent(
        &self,
        exponent: &SecretKey,
        network: Network,
        for_change: bool,
        index: u32,
    ) -> Result<PrivateKey> {
        let z = Self::sequence_scalar(self.keys.primary(), for_change, index)?;
        let secret = exponent.add_tweak(&z)?;
        Ok(PrivateKey::new_uncompressed(secret, network))
    }

    /// Derive the private key for one sequence from the seed
    pub fn private_key(
        &self,
        seed: &[u8],
        network: Network,
        for_change: bool,
        index: u32,
    ) -> Result<PrivateKey> {
        let exponent = seed::stretch_seed(seed)?;
        self.private_key_from_exponent(&exponent, network, for_change, index)
    }

    /// Derive private keys for many sequences, stretching the seed once
    pub fn private_keys(
        &self,
        seed: &[u8],
        network: Network,
        sequences: &[(bool, u32)],
    ) -> Result<Vec<PrivateKey>> {
        let exponent = seed::stretch_seed(seed)?;
        sequences
            .iter()
            .map(|&(for_change, index)| {
                self.private_key_from_exponent(&exponent, network, for_change, index)
            })
            .collect()
    }

    /// Verify that a seed reproduces this account's primary master key.
    ///
    /// A mismatch is reported as [`Error::InvalidSeed`] whether the seed is
    /// wrong or the stored key is corrupt; the two cases are deliberately
    /// indistinguishable.
    pub fn check_seed(&self, seed: &[u8]) -> Result<()> {
        if seed::master_public_key(seed)? != *self.keys.primary() {
            return Err(Error::InvalidSeed);
        }
        Ok(())
    }

    pub(crate) fn dump_into(&self, d: &mut Map<String, Value>) {
        let keys = self.keys.all();
        d.insert("mpk".into(), Value::String(keys[0].to_hex()));
        if let Some(key) = keys.get(1) {
            d.insert("mpk2".into(), Value::String(key.to_hex()));
        }
        if let Some(key) = keys.get(2) {
            d.insert("mpk3".into(), Value::String(key.to_hex()));
        }
    }

    pub(crate) fn from_dump(d: &Map<String, Value>) -> Result<Self> {
        let mpk = MasterPublicKey::from_hex(string_field(d, "mpk")?)?;
        let keys = match (d.contains_key("mpk2"), d.contains_key("mpk3")) {
            (false, false) => LegacyKeys::Single(mpk),
            (true, false) => {
                let mpk2 = MasterPublicKey::from_hex(string_field(d, "mpk2")?)?;
                LegacyKeys::TwoOfTwo([mpk, mpk2])
            }
            (true, true) => {
                let mpk2 = MasterPublicKey::from_hex(string_field(d, "mpk2")?)?;
                let mpk3 = MasterPublicKey::from_hex(string_field(d, "mpk3")?)?;
                LegacyKeys::TwoOfThree([mpk, mpk2, mpk3])
            }
            (false, true) => {
                return Err(Error::Serialization(
                    "field 'mpk3' present without 'mpk2'".into(),
                ))
            }
        };
        Ok(Self::new(keys))
    }
}
