//! Multisignature redeem scripts

use bitcoin_hashes::{hash160, Hash};

use crate::address::{Address, Network};
use crate::error::{Error, Result};

const OP_1: u8 = 0x51;
const OP_CHECKMULTISIG: u8 = 0xae;

/// A threshold multisignature redeem script.
///
/// The script commits to the public keys in the order given; cosigner
/// order is part of the derivation contract and is never sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultisigScript {
    threshold: u8,
    pubkeys: Vec<Vec<u8>>,
    script: Vec<u8>,
}

impl MultisigScript {
    /// Build an m-of-n redeem script over serialized public keys.
    ///
    /// `threshold` must be between 1 and the number of keys, and at most
    /// 16 keys fit the one-opcode count encoding.
    pub fn new(threshold: u8, pubkeys: Vec<Vec<u8>>) -> Result<Self> {
        let n = pubkeys.len();
        if threshold == 0 || usize::from(threshold) > n || n > 16 {
            return Err(Error::MalformedKey(format!(
                "unsupported multisig policy: {}-of-{}",
                threshold, n
            )));
        }

        let mut script = Vec::with_capacity(3 + pubkeys.iter().map(|k| k.len() + 1).sum::<usize>());
        script.push(OP_1 + threshold - 1);
        for pubkey in &pubkeys {
            script.push(pubkey.len() as u8);
            script.extend_from_slice(pubkey);
        }
        script.push(OP_1 + n as u8 - 1);
        script.push(OP_CHECKMULTISIG);

        Ok(Self {
            threshold,
            pubkeys,
            script,
        })
    }

    /// Number of signatures required to spend
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// The cosigner public keys, in script order
    pub fn pubkeys(&self) -> &[Vec<u8>] {
        &self.pubkeys
    }

    /// The raw script bytes
    pub fn script(&self) -> &[u8] {
        &self.script
    }

    /// The script as hex, the form callers persist and display
    pub fn to_hex(&self) -> String {
        hex::encode(&self.script)
    }

    /// The P2SH address paying to this script
    pub fn address(&self, network: Network) -> Address {
        Address::p2sh(hash160::Hash::hash(&self.script), network)
    }
}
