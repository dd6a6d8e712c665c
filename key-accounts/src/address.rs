//! Address generation and encoding

use core::fmt;
use core::str::FromStr;

use bitcoin_hashes::{hash160, Hash};

use crate::error::{Error, Result};

/// Address types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressType {
    /// Pay to public key hash (P2PKH)
    P2PKH,
    /// Pay to script hash (P2SH)
    P2SH,
}

/// Network type for address encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Network {
    /// Bitcoin mainnet
    Bitcoin,
    /// Bitcoin testnet
    Testnet,
}

impl Network {
    /// Get P2PKH version byte
    pub fn p2pkh_version(&self) -> u8 {
        match self {
            Network::Bitcoin => 0,   // '1' prefix
            Network::Testnet => 111, // 'm'/'n' prefix
        }
    }

    /// Get P2SH version byte
    pub fn p2sh_version(&self) -> u8 {
        match self {
            Network::Bitcoin => 5,   // '3' prefix
            Network::Testnet => 196, // '2' prefix
        }
    }

    /// Get WIF version byte
    pub fn wif_version(&self) -> u8 {
        match self {
            Network::Bitcoin => 128,
            Network::Testnet => 239,
        }
    }
}

/// A Bitcoin address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    /// The network this address is valid for
    pub network: Network,
    /// The type of address
    pub address_type: AddressType,
    /// The hash160 of the public key or script
    pub hash: hash160::Hash,
}

impl Address {
    /// Create a P2PKH address from a serialized public key.
    ///
    /// The hash commits to the exact serialization passed in: the legacy
    /// scheme spends uncompressed keys, the hierarchical scheme compressed
    /// ones, and the two forms yield different addresses.
    pub fn p2pkh(pubkey: &[u8], network: Network) -> Self {
        Self {
            network,
            address_type: AddressType::P2PKH,
            hash: hash160::Hash::hash(pubkey),
        }
    }

    /// Create a P2SH address from a script hash
    pub fn p2sh(script_hash: hash160::Hash, network: Network) -> Self {
        Self {
            network,
            address_type: AddressType::P2SH,
            hash: script_hash,
        }
    }

    /// Parse an address string for the given network
    pub fn parse(s: &str, network: Network) -> Result<Self> {
        let data = base58ck::decode_check(s).map_err(|_| Error::Base58)?;

        if data.len() != 21 {
            return Err(Error::MalformedKey("invalid address length".into()));
        }

        let version = data[0];
        let hash = hash160::Hash::from_slice(&data[1..])
            .map_err(|_| Error::MalformedKey("invalid address hash".into()))?;

        let address_type = if version == network.p2pkh_version() {
            AddressType::P2PKH
        } else if version == network.p2sh_version() {
            AddressType::P2SH
        } else {
            return Err(Error::MalformedKey("invalid address version byte".into()));
        };

        Ok(Self {
            network,
            address_type,
            hash,
        })
    }

    /// Get the script pubkey for this address
    pub fn script_pubkey(&self) -> Vec<u8> {
        match self.address_type {
            AddressType::P2PKH => {
                let mut script = Vec::with_capacity(25);
                script.push(0x76); // OP_DUP
                script.push(0xa9); // OP_HASH160
                script.push(0x14); // Push 20 bytes
                script.extend_from_slice(self.hash.as_byte_array());
                script.push(0x88); // OP_EQUALVERIFY
                script.push(0xac); // OP_CHECKSIG
                script
            }
            AddressType::P2SH => {
                let mut script = Vec::with_capacity(23);
                script.push(0xa9); // OP_HASH160
                script.push(0x14); // Push 20 bytes
                script.extend_from_slice(self.hash.as_byte_array());
                script.push(0x87); // OP_EQUAL
                script
            }
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = match self.address_type {
            AddressType::P2PKH => self.network.p2pkh_version(),
            AddressType::P2SH => self.network.p2sh_version(),
        };

        let mut data = Vec::with_capacity(21);
        data.push(version);
        data.extend_from_slice(self.hash.as_byte_array());

        f.write_str(&base58ck::encode_check(&data))
    }
}

impl FromStr for Address {
    type Err = Error;

    /// Parse an address, inferring the network from the version byte
    fn from_str(s: &str) -> Result<Self> {
        for network in [Network::Bitcoin, Network::Testnet] {
            if let Ok(address) = Self::parse(s, network) {
                return Ok(address);
            }
        }
        Err(Error::MalformedKey("unknown address version byte".into()))
    }
}
