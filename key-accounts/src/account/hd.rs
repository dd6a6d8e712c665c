//! The BIP32-style hierarchical scheme
//!
//! Each cosigner contributes an independent `(chain code, public point)`
//! branch. Branches are derived in lockstep: every branch walks the same
//! two-level `change / index` path, and their leaf keys are combined into
//! the redeem script. Branches are never cross-derived.

use core::slice;

use secp256k1::{PublicKey, Secp256k1};
use serde_json::{Map, Value};

use crate::account::{string_field, InputInfo};
use crate::address::{Address, Network};
use crate::bip32::{ChainCode, ExtendedPubKey};
use crate::error::{Error, Result};
use crate::script::MultisigScript;

/// The derivation branches of a hierarchical account, one per cosigner.
///
/// Like the legacy key set, the variant is the spending policy and both
/// multisig policies require two signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HdKeys {
    /// Single-branch P2PKH account
    Single(ExtendedPubKey),
    /// 2-of-2 multisig account
    TwoOfTwo([ExtendedPubKey; 2]),
    /// 2-of-3 multisig account
    TwoOfThree([ExtendedPubKey; 3]),
}

impl HdKeys {
    /// All branches in cosigner order
    pub fn all(&self) -> &[ExtendedPubKey] {
        match self {
            HdKeys::Single(branch) => slice::from_ref(branch),
            HdKeys::TwoOfTwo(branches) => branches,
            HdKeys::TwoOfThree(branches) => branches,
        }
    }

    /// The first branch: the one the local wallet can sign for
    pub fn primary(&self) -> &ExtendedPubKey {
        &self.all()[0]
    }
}

/// A hierarchical account: public derivation branches and nothing else.
///
/// The account is inherently watch-only; spending keys live with whoever
/// holds the corresponding extended private keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdAccount {
    keys: HdKeys,
}

impl HdAccount {
    /// Create an account over a fixed branch set
    pub fn new(keys: HdKeys) -> Self {
        Self { keys }
    }

    /// The account's branches
    pub fn keys(&self) -> &HdKeys {
        &self.keys
    }

    /// The primary branch's leaf public key at a sequence, compressed
    pub fn derive_pubkey(&self, for_change: bool, index: u32) -> Result<[u8; 33]> {
        let secp = Secp256k1::verification_only();
        let leaf = self.keys.primary().derive_leaf(&secp, for_change, index)?;
        Ok(leaf.serialize())
    }

    /// Leaf public keys of every branch at the same sequence
    fn leaf_pubkeys(&self, for_change: bool, index: u32) -> Result<Vec<PublicKey>> {
        let secp = Secp256k1::verification_only();
        self.keys
            .all()
            .iter()
            .map(|branch| branch.derive_leaf(&secp, for_change, index))
            .collect()
    }

    /// The redeem script at a sequence; `None` for the single-key policy
    pub fn redeem_script(
        &self,
        for_change: bool,
        index: u32,
    ) -> Result<Option<MultisigScript>> {
        match self.keys {
            HdKeys::Single(_) => Ok(None),
            HdKeys::TwoOfTwo(_) | HdKeys::TwoOfThree(_) => {
                let pubkeys = self
                    .leaf_pubkeys(for_change, index)?
                    .iter()
                    .map(|key| key.serialize().to_vec())
                    .collect();
                Ok(Some(MultisigScript::new(2, pubkeys)?))
            }
        }
    }

    /// The address at a sequence: P2PKH of the leaf key, or P2SH of the
    /// redeem script for the multisig policies
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

    /// What a spender needs for an input at this sequence; same contract
    /// as the legacy scheme
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

    pub(crate) fn dump_into(&self, d: &mut Map<String, Value>) {
        for (branch, (c, k, ck)) in self.keys.all().iter().zip([
            ("c", "K", "cK"),
            ("c2", "K2", "cK2"),
            ("c3", "K3", "cK3"),
        ]) {
            d.insert(c.into(), Value::String(branch.chain_code.to_hex()));
            let uncompressed = branch.public_key.serialize_uncompressed();
            d.insert(k.into(), Value::String(hex::encode(&uncompressed[1..])));
            d.insert(
                ck.into(),
                Value::String(hex::encode(branch.public_key.serialize())),
            );
        }
    }

    fn branch_from_dump(
        d: &Map<String, Value>,
        c: &str,
        k: &str,
        ck: &str,
    ) -> Result<ExtendedPubKey> {
        let chain_code = ChainCode::from_hex(string_field(d, c)?)?;
        let compressed = hex::decode(string_field(d, ck)?)?;
        let public_key = PublicKey::from_slice(&compressed)
            .map_err(|e| Error::MalformedKey(format!("invalid public key '{}': {}", ck, e)))?;

        // the redundant uncompressed field must describe the same point
        let uncompressed = public_key.serialize_uncompressed();
        if string_field(d, k)? != hex::encode(&uncompressed[1..]) {
            return Err(Error::MalformedKey(format!(
                "fields '{}' and '{}' disagree",
                k, ck
            )));
        }

        Ok(ExtendedPubKey::new(chain_code, public_key))
    }

    pub(crate) fn from_dump(d: &Map<String, Value>) -> Result<Self> {
        let first = Self::branch_from_dump(d, "c", "K", "cK")?;
        let keys = match (d.contains_key("c2"), d.contains_key("c3")) {
            (false, false) => HdKeys::Single(first),
            (true, false) => {
                let second = Self::branch_from_dump(d, "c2", "K2", "cK2")?;
                HdKeys::TwoOfTwo([first, second])
            }
            (true, true) => {
                let second = Self::branch_from_dump(d, "c2", "K2", "cK2")?;
                let third = Self::branch_from_dump(d, "c3", "K3", "cK3")?;
                HdKeys::TwoOfThree([first, second, third])
            }
            (false, true) => {
                return Err(Error::Serialization(
                    "field 'c3' present without 'c2'".into(),
                ))
            }
        };
        Ok(Self::new(keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // branch rooted at the BIP32 test vector 1 master key
    fn test_branch() -> ExtendedPubKey {
        ExtendedPubKey::new(
            ChainCode::from_hex(
                "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508",
            )
            .unwrap(),
            PublicKey::from_slice(
                &hex::decode(
                    "0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2",
                )
                .unwrap(),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_single_address_vector() {
        let account = HdAccount::new(HdKeys::Single(test_branch()));
        assert_eq!(
            account
                .derive_address(Network::Bitcoin, false, 0)
                .unwrap()
                .to_string(),
            "12CL4K2eVqj7hQTix7dM7CVHCkpP17Pry3"
        );
        assert_eq!(account.redeem_script(false, 0).unwrap(), None);
    }

    #[test]
    fn test_coordinate_swap_changes_address() {
        let account = HdAccount::new(HdKeys::Single(test_branch()));
        let a = account.derive_address(Network::Bitcoin, false, 1).unwrap();
        let b = account.derive_address(Network::Bitcoin, true, 0).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_branch_consistency_check() {
        let account = HdAccount::new(HdKeys::Single(test_branch()));
        let mut d = Map::new();
        account.dump_into(&mut d);

        // tamper with the uncompressed field only
        let k = d.get("K").unwrap().as_str().unwrap().to_owned();
        let mut tampered = k.into_bytes();
        tampered[0] = if tampered[0] == b'0' { b'1' } else { b'0' };
        d.insert(
            "K".into(),
            Value::String(String::from_utf8(tampered).unwrap()),
        );

        assert!(matches!(
            HdAccount::from_dump(&d),
            Err(Error::MalformedKey(_))
        ));
    }
}
