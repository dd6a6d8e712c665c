//! Key Accounts Library
//!
//! Deterministic account key derivation: this library turns a wallet seed
//! or a set of master public keys into an unbounded stream of addresses,
//! private keys and multisignature redeem scripts, reproducibly and
//! byte-exactly across processes and languages.
//!
//! Two schemes are supported, each with single-key, 2-of-2 and 2-of-3
//! policies:
//!
//! - the legacy "type-2" scheme, which tweaks a master point additively
//!   per `(for_change, index)` sequence and can also recover private keys
//!   from the stretched wallet seed;
//! - a BIP32-style hierarchical scheme that walks a fixed two-level public
//!   derivation path per branch and is inherently watch-only.
//!
//! Accounts cache the addresses they hand out and serialize to a flat
//! string-keyed mapping that is the durable contract with the storage
//! layer; [`AccountRegistry`] gathers the accounts of one wallet.

pub mod account;
pub mod address;
pub mod bip32;
pub mod error;
pub mod keys;
pub mod registry;
pub mod script;
pub mod seed;

pub use account::{
    Account, AccountKind, HdAccount, HdKeys, InputInfo, LegacyAccount, LegacyKeys,
};
pub use address::{Address, AddressType, Network};
pub use bip32::{ChainCode, ExtendedPubKey};
pub use error::{Error, Result};
pub use keys::{MasterPublicKey, PrivateKey};
pub use registry::AccountRegistry;
pub use script::MultisigScript;
pub use seed::{master_public_key, stretch_seed, STRETCH_ROUNDS};

/// Re-export commonly used types
pub mod prelude {
    pub use super::{
        Account, AccountKind, AccountRegistry, Address, Error, ExtendedPubKey, MasterPublicKey,
        Network, Result,
    };
}
