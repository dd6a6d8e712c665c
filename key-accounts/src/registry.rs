//! Account registry: the mapping from account identifier to account
//!
//! The registry is the unit the storage layer persists. Accounts are
//! registered once, constructed from persisted key material, and live
//! until the wallet itself is deleted; there is deliberately no
//! per-account removal.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::account::Account;
use crate::address::Network;
use crate::error::{Error, Result};

/// All accounts of one wallet, keyed by their identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRegistry {
    network: Network,
    accounts: BTreeMap<String, Account>,
}

impl AccountRegistry {
    /// Create an empty registry
    pub fn new(network: Network) -> Self {
        Self {
            network,
            accounts: BTreeMap::new(),
        }
    }

    /// The network all accounts encode addresses for
    pub fn network(&self) -> Network {
        self.network
    }

    /// Register an account under an identifier.
    ///
    /// Accounts are never re-keyed in place; a duplicate identifier is an
    /// error rather than a replacement.
    pub fn insert(&mut self, id: impl Into<String>, account: Account) -> Result<()> {
        let id = id.into();
        if self.accounts.contains_key(&id) {
            return Err(Error::AccountExists(id));
        }
        self.accounts.insert(id, account);
        Ok(())
    }

    /// Look up an account
    pub fn get(&self, id: &str) -> Option<&Account> {
        self.accounts.get(id)
    }

    /// Look up an account for address creation
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Account> {
        self.accounts.get_mut(id)
    }

    /// All account identifiers, in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.accounts.keys().map(String::as_str)
    }

    /// All accounts with their identifiers, in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Account)> {
        self.accounts.iter().map(|(id, account)| (id.as_str(), account))
    }

    /// Number of registered accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the registry holds no accounts
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Serialize every account into the persisted mapping
    pub fn dump(&self) -> Map<String, Value> {
        self.accounts
            .iter()
            .map(|(id, account)| (id.clone(), Value::Object(account.dump())))
            .collect()
    }

    /// Reconstruct a registry from its persisted mapping
    pub fn from_dump(network: Network, d: &Map<String, Value>) -> Result<Self> {
        let mut registry = Self::new(network);
        for (id, value) in d {
            let account_map = value.as_object().ok_or_else(|| {
                Error::Serialization(format!("account '{}' must be a mapping", id))
            })?;
            let account = Account::from_dump(network, account_map)?;
            registry.insert(id.clone(), account)?;
        }
        Ok(registry)
    }
}
