//! Basic usage example for key-accounts

use key_accounts::account::{AccountKind, HdAccount, HdKeys, LegacyAccount};
use key_accounts::prelude::*;

fn main() -> core::result::Result<(), Box<dyn std::error::Error>> {
    println!("Key Accounts Example\n");

    // 1. A legacy account recomputed from a seed
    println!("1. Legacy account from seed...");
    let seed = b"test seed";
    let legacy = LegacyAccount::from_seed(seed)?;
    println!("   Master public key: {}", legacy.keys().primary());

    let mut account = Account::new(AccountKind::Legacy(legacy), Network::Bitcoin);

    // 2. Hand out a few receiving addresses
    println!("\n2. Receiving addresses:");
    for _ in 0..5 {
        let address = account.create_new_address(false)?;
        println!("     {}", address);
    }

    // 3. Change addresses advance independently
    println!("\n3. Change addresses:");
    for _ in 0..2 {
        let address = account.create_new_address(true)?;
        println!("     {}", address);
    }

    // 4. Private keys need the seed and are derived on demand
    println!("\n4. Private key for the first receiving address...");
    let private = account.private_key(seed, false, 0)?;
    println!("   WIF: {}", private.to_wif());

    // 5. A watch-only hierarchical account from a chain code and point
    println!("\n5. Watch-only HD account...");
    let branch = ExtendedPubKey::new(
        key_accounts::ChainCode::from_hex(
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508",
        )?,
        "0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2"
            .parse::<secp256k1::PublicKey>()
            .map_err(key_accounts::Error::Secp256k1)?,
    );
    let hd = Account::new(
        AccountKind::Hd(HdAccount::new(HdKeys::Single(branch))),
        Network::Bitcoin,
    );
    println!("   First address: {}", hd.derive_address(false, 0)?);

    // 6. Everything persists through the registry's flat mapping
    println!("\n6. Registry dump...");
    let mut registry = AccountRegistry::new(Network::Bitcoin);
    registry.insert("0", account)?;
    registry.insert("x1", hd)?;
    let dump = registry.dump();
    println!("   {}", serde_json::to_string_pretty(&dump)?);

    let restored = AccountRegistry::from_dump(Network::Bitcoin, &dump)?;
    assert_eq!(restored.dump(), dump);
    println!("\n   Round-trip OK ({} accounts)", restored.len());

    Ok(())
}
