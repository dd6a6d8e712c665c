//! Account variants over the two deterministic schemes
//!
//! An account pairs immutable key material (one scheme, one spending
//! policy) with the append-only caches of addresses it has handed out.
//! Every derived artifact is a pure function of the key material and a
//! `(for_change, index)` sequence; the caches only preserve enumeration
//! order for display and persistence.

pub mod hd;
pub mod legacy;

use core::fmt;

use serde_json::{Map, Value};

use crate::address::{Address, Network};
use crate::error::{Error, Result};
use crate::keys::PrivateKey;
use crate::script::MultisigScript;

pub use hd::{HdAccount, HdKeys};
pub use legacy::{LegacyAccount, LegacyKeys};

/// What a spender needs to sign an input paying to a derived address: the
/// single-key address whose private key the local wallet can produce, and
/// the redeem script for the multisig policies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputInfo {
    /// The first cosigner's single-key address at the sequence
    pub address: Address,
    /// The redeem script, `None` for single-key policies
    pub redeem_script: Option<MultisigScript>,
}

/// The key material of an account: which scheme it derives with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountKind {
    /// Legacy type-2 additive-tweak scheme
    Legacy(LegacyAccount),
    /// BIP32-style hierarchical scheme
    Hd(HdAccount),
}

/// An account: immutable key material plus the append-only address caches.
///
/// The caches never feed back into derivation. The explicit next-index
/// counters, not the cache lengths, decide which sequence
/// [`create_new_address`](Account::create_new_address) derives next;
/// callers must serialize that operation per account, since a lost update
/// would silently reuse an index and therefore an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    kind: AccountKind,
    network: Network,
    receiving: Vec<Address>,
    change: Vec<Address>,
    next_receiving: u32,
    next_change: u32,
}

impl Account {
    /// Create a fresh account with empty caches
    pub fn new(kind: AccountKind, network: Network) -> Self {
        Self {
            kind,
            network,
            receiving: Vec::new(),
            change: Vec::new(),
            next_receiving: 0,
            next_change: 0,
        }
    }

    /// The account's key material
    pub fn kind(&self) -> &AccountKind {
        &self.kind
    }

    /// The network addresses are encoded for
    pub fn network(&self) -> Network {
        self.network
    }

    /// Previously created addresses of one chain, in creation order
    pub fn addresses(&self, for_change: bool) -> &[Address] {
        if for_change {
            &self.change
        } else {
            &self.receiving
        }
    }

    /// The index the next created address of this chain will use
    pub fn next_index(&self, for_change: bool) -> u32 {
        if for_change {
            self.next_change
        } else {
            self.next_receiving
        }
    }

    /// Derive the address at a sequence. Pure: does not touch the caches.
    pub fn derive_address(&self, for_change: bool, index: u32) -> Result<Address> {
        match &self.kind {
            AccountKind::Legacy(account) => {
                account.derive_address(self.network, for_change, index)
            }
            AccountKind::Hd(account) => account.derive_address(self.network, for_change, index),
        }
    }

    /// Derive the primary cosigner's public key at a sequence, in the
    /// serialization the scheme spends (uncompressed for legacy,
    /// compressed for hierarchical)
    pub fn derive_pubkey(&self, for_change: bool, index: u32) -> Result<Vec<u8>> {
        match &self.kind {
            AccountKind::Legacy(account) => {
                Ok(account.derive_pubkey(for_change, index)?.to_vec())
            }
            AccountKind::Hd(account) => Ok(account.derive_pubkey(for_change, index)?.to_vec()),
        }
    }

    /// The redeem script at a sequence; `None` for single-key policies
    pub fn redeem_script(
        &self,
        for_change: bool,
        index: u32,
    ) -> Result<Option<MultisigScript>> {
        match &self.kind {
            AccountKind::Legacy(account) => account.redeem_script(for_change, index),
            AccountKind::Hd(account) => account.redeem_script(for_change, index),
        }
    }

    /// What a spender needs for an input at this sequence
    pub fn input_info(&self, for_change: bool, index: u32) -> Result<InputInfo> {
        match &self.kind {
            AccountKind::Legacy(account) => {
                account.input_info(self.network, for_change, index)
            }
            AccountKind::Hd(account) => account.input_info(self.network, for_change, index),
        }
    }

    /// Derive the private key at a sequence from the seed.
    ///
    /// Only the legacy scheme carries enough material to do this;
    /// hierarchical accounts are watch-only.
    pub fn private_key(
        &self,
        seed: &[u8],
        for_change: bool,
        index: u32,
    ) -> Result<PrivateKey> {
        match &self.kind {
            AccountKind::Legacy(account) => {
                account.private_key(seed, self.network, for_change, index)
            }
            AccountKind::Hd(_) => Err(Error::WatchOnly),
        }
    }

    /// Verify that a seed reproduces this account's master key
    pub fn check_seed(&self, seed: &[u8]) -> Result<()> {
        match &self.kind {
            AccountKind::Legacy(account) => account.check_seed(seed),
            AccountKind::Hd(_) => Err(Error::WatchOnly),
        }
    }

    /// Derive the address at the next index of a chain and append it to
    /// that chain's cache.
    ///
    /// Single-writer per account: see the type-level note.
    pub fn create_new_address(&mut self, for_change: bool) -> Result<Address> {
        let index = self.next_index(for_change);
        let address = self.derive_address(for_change, index)?;
        if for_change {
            self.change.push(address.clone());
            self.next_change += 1;
        } else {
            self.receiving.push(address.clone());
            self.next_receiving += 1;
        }
        Ok(address)
    }

    /// Serialize to the persisted flat mapping: address lists under `"0"`
    /// and `"1"`, scheme key material as hex fields
    pub fn dump(&self) -> Map<String, Value> {
        let mut d = Map::new();
        d.insert("0".into(), address_list_value(&self.receiving));
        d.insert("1".into(), address_list_value(&self.change));
        match &self.kind {
            AccountKind::Legacy(account) => account.dump_into(&mut d),
            AccountKind::Hd(account) => account.dump_into(&mut d),
        }
        d
    }

    /// Reconstruct an account from its persisted mapping.
    ///
    /// The scheme is recognized from the fields present: `mpk` marks a
    /// legacy account, `c` a hierarchical one. Missing address lists are
    /// treated as empty; the next-index counters resume after the cached
    /// addresses.
    pub fn from_dump(network: Network, d: &Map<String, Value>) -> Result<Self> {
        let kind = if d.contains_key("mpk") {
            AccountKind::Legacy(LegacyAccount::from_dump(d)?)
        } else if d.contains_key("c") {
            AccountKind::Hd(HdAccount::from_dump(d)?)
        } else {
            return Err(Error::Serialization(
                "mapping matches no known account scheme".into(),
            ));
        };

        let receiving = address_list(network, d, "0")?;
        let change = address_list(network, d, "1")?;
        Ok(Self {
            kind,
            network,
            next_receiving: receiving.len() as u32,
            next_change: change.len() as u32,
            receiving,
            change,
        })
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = match &self.kind {
            AccountKind::Legacy(_) => "legacy",
            AccountKind::Hd(_) => "hd",
        };
        write!(
            f,
            "Account ({}, {} receiving / {} change)",
            scheme,
            self.receiving.len(),
            self.change.len()
        )
    }
}

fn address_list_value(addresses: &[Address]) -> Value {
    Value::Array(
        addresses
            .iter()
            .map(|address| Value::String(address.to_string()))
            .collect(),
    )
}

fn address_list(network: Network, d: &Map<String, Value>, key: &str) -> Result<Vec<Address>> {
    let Some(value) = d.get(key) else {
        return Ok(Vec::new());
    };
    let list = value
        .as_array()
        .ok_or_else(|| Error::Serialization(format!("field '{}' must be an array", key)))?;
    list.iter()
        .map(|entry| {
            let s = entry.as_str().ok_or_else(|| {
                Error::Serialization(format!("field '{}' must contain strings", key))
            })?;
            Address::parse(s, network)
        })
        .collect()
}

pub(crate) fn string_field<'a>(d: &'a Map<String, Value>, key: &str) -> Result<&'a str> {
    d.get(key)
        .ok_or_else(|| Error::Serialization(format!("missing field '{}'", key)))?
        .as_str()
        .ok_or_else(|| Error::Serialization(format!("field '{}' must be a string", key)))
}
