//! Persisted-mapping round-trip tests for every account shape

use key_accounts::account::{AccountKind, HdAccount, HdKeys, LegacyAccount, LegacyKeys};
use key_accounts::bip32::{ChainCode, ExtendedPubKey};
use key_accounts::{Account, AccountRegistry, Error, MasterPublicKey, Network};
use secp256k1::PublicKey;
use serde_json::{json, Map, Value};

const MPK1: &str = "5676cd0d8b8cea10f492b671a5be53d2c0d963035fd5897cdb9595680d23707eb89f2ead1859401569099c24a176c733c5af0361991ce155f08f6dd5e3ec9f25";
const MPK2: &str = "9e492305a556af859319887783f73bf01bd71c2a39cd5fb3bedc6f7692117282cc058cc7052f6bbda560ad329bf4b77dcd4b299d6669e17974a5c4d4e64e4e2b";
const MPK3: &str = "7061166487c44002167805c277611004f29b9e836bee62bcf8990d8d218beedb03ee3ac3cf47eec235b9d85d21e35484dad3f20edb20e1144fe51e4151502e26";

const HD1_C: &str = "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508";
const HD1_K: &str = "39a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c23cbe7ded0e7ce6a594896b8f62888fdbc5c8821305e2ea42bf01e37300116281";
const HD1_CK: &str = "0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2";
const HD2_C: &str = "60499f801b896d83179a4374aeb7822aaeaceaa0db1f85ee3e904c4defbd9689";
const HD2_K: &str = "cbcaa9c98c877a26977d00825c956a238e8dddfbd322cce4f74b0b5bd6ace4a77bd3305d363c26f82c1e41c667e4b3561c06c60a2104d2b548e6dd059056aa51";
const HD2_CK: &str = "03cbcaa9c98c877a26977d00825c956a238e8dddfbd322cce4f74b0b5bd6ace4a7";
const HD3_C: &str = "01d28a3e53cffa419ec122c968b3259e16b65076495494d97cae10bbfec3c36f";
const HD3_K: &str = "683af1ba5743bdfc798cf814efeeab2735ec52d95eced528e692b8e34c4e5669d2f2686ced96d375a75298f07ed30751e2a3f45e2d184b268d02c8d5dd6fbdb5";
const HD3_CK: &str = "03683af1ba5743bdfc798cf814efeeab2735ec52d95eced528e692b8e34c4e5669";

fn as_map(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

fn assert_round_trip(d: &Map<String, Value>) -> Account {
    let account = Account::from_dump(Network::Bitcoin, d).unwrap();
    assert_eq!(&account.dump(), d);
    account
}

#[test]
fn test_legacy_single_round_trip() {
    let d = as_map(json!({ "0": [], "1": [], "mpk": MPK1 }));
    let account = assert_round_trip(&d);

    assert!(matches!(
        account.kind(),
        AccountKind::Legacy(legacy) if matches!(legacy.keys(), LegacyKeys::Single(_))
    ));
}

#[test]
fn test_legacy_2of2_round_trip() {
    let d = as_map(json!({ "0": [], "1": [], "mpk": MPK1, "mpk2": MPK2 }));
    let account = assert_round_trip(&d);

    assert!(matches!(
        account.kind(),
        AccountKind::Legacy(legacy) if matches!(legacy.keys(), LegacyKeys::TwoOfTwo(_))
    ));
}

#[test]
fn test_legacy_2of3_round_trip() {
    let d = as_map(json!({
        "0": [], "1": [],
        "mpk": MPK1, "mpk2": MPK2, "mpk3": MPK3,
    }));
    assert_round_trip(&d);
}

#[test]
fn test_hd_round_trips() {
    let single = as_map(json!({
        "0": [], "1": [],
        "c": HD1_C, "K": HD1_K, "cK": HD1_CK,
    }));
    assert_round_trip(&single);

    let two_of_two = as_map(json!({
        "0": [], "1": [],
        "c": HD1_C, "K": HD1_K, "cK": HD1_CK,
        "c2": HD2_C, "K2": HD2_K, "cK2": HD2_CK,
    }));
    assert_round_trip(&two_of_two);

    let two_of_three = as_map(json!({
        "0": [], "1": [],
        "c": HD1_C, "K": HD1_K, "cK": HD1_CK,
        "c2": HD2_C, "K2": HD2_K, "cK2": HD2_CK,
        "c3": HD3_C, "K3": HD3_K, "cK3": HD3_CK,
    }));
    let account = assert_round_trip(&two_of_three);
    assert!(matches!(
        account.kind(),
        AccountKind::Hd(hd) if matches!(hd.keys(), HdKeys::TwoOfThree(_))
    ));
}

#[test]
fn test_cached_addresses_survive_round_trip() {
    let d = as_map(json!({ "0": [], "1": [], "mpk": MPK1 }));
    let mut account = Account::from_dump(Network::Bitcoin, &d).unwrap();

    let first = account.create_new_address(false).unwrap();
    account.create_new_address(false).unwrap();
    account.create_new_address(true).unwrap();

    let dumped = account.dump();
    assert_eq!(
        dumped["0"].as_array().unwrap()[0].as_str().unwrap(),
        first.to_string()
    );

    let restored = Account::from_dump(Network::Bitcoin, &dumped).unwrap();
    assert_eq!(restored, account);
    assert_eq!(restored.next_index(false), 2);
    assert_eq!(restored.next_index(true), 1);

    // the counter resumes where the cache left off
    let mut restored = restored;
    let third = restored.create_new_address(false).unwrap();
    assert_eq!(third, account.derive_address(false, 2).unwrap());
}

#[test]
fn test_missing_address_lists_default_empty() {
    let d = as_map(json!({ "mpk": MPK1 }));
    let account = Account::from_dump(Network::Bitcoin, &d).unwrap();
    assert!(account.addresses(false).is_empty());
    assert!(account.addresses(true).is_empty());
    assert_eq!(account.next_index(false), 0);
}

#[test]
fn test_malformed_mappings_rejected() {
    // not hex
    let d = as_map(json!({ "mpk": "not hex at all" }));
    assert!(matches!(
        Account::from_dump(Network::Bitcoin, &d),
        Err(Error::MalformedKey(_))
    ));

    // mpk3 without mpk2
    let d = as_map(json!({ "mpk": MPK1, "mpk3": MPK3 }));
    assert!(matches!(
        Account::from_dump(Network::Bitcoin, &d),
        Err(Error::Serialization(_))
    ));

    // c2 present but incomplete
    let d = as_map(json!({
        "c": HD1_C, "K": HD1_K, "cK": HD1_CK,
        "c2": HD2_C,
    }));
    assert!(matches!(
        Account::from_dump(Network::Bitcoin, &d),
        Err(Error::Serialization(_))
    ));

    // address list of the wrong shape
    let d = as_map(json!({ "0": "not a list", "mpk": MPK1 }));
    assert!(matches!(
        Account::from_dump(Network::Bitcoin, &d),
        Err(Error::Serialization(_))
    ));
}

#[test]
fn test_dump_emits_exact_field_names() {
    let account = Account::new(
        AccountKind::Hd(HdAccount::new(HdKeys::TwoOfTwo([
            ExtendedPubKey::new(
                ChainCode::from_hex(HD1_C).unwrap(),
                PublicKey::from_slice(&hex::decode(HD1_CK).unwrap()).unwrap(),
            ),
            ExtendedPubKey::new(
                ChainCode::from_hex(HD2_C).unwrap(),
                PublicKey::from_slice(&hex::decode(HD2_CK).unwrap()).unwrap(),
            ),
        ]))),
        Network::Bitcoin,
    );

    let d = account.dump();
    let mut fields: Vec<&str> = d.keys().map(String::as_str).collect();
    fields.sort_unstable();
    assert_eq!(fields, ["0", "1", "K", "K2", "c", "c2", "cK", "cK2"]);
    assert_eq!(d["K"].as_str().unwrap(), HD1_K);
    assert_eq!(d["cK2"].as_str().unwrap(), HD2_CK);
}

#[test]
fn test_registry_round_trip_mixed() {
    let mut registry = AccountRegistry::new(Network::Bitcoin);

    let mut legacy = Account::new(
        AccountKind::Legacy(LegacyAccount::new(LegacyKeys::Single(
            MasterPublicKey::from_hex(MPK1).unwrap(),
        ))),
        Network::Bitcoin,
    );
    legacy.create_new_address(false).unwrap();
    registry.insert("0", legacy).unwrap();

    let hd = Account::new(
        AccountKind::Hd(HdAccount::new(HdKeys::Single(ExtendedPubKey::new(
            ChainCode::from_hex(HD1_C).unwrap(),
            PublicKey::from_slice(&hex::decode(HD1_CK).unwrap()).unwrap(),
        )))),
        Network::Bitcoin,
    );
    registry.insert("x1", hd).unwrap();

    let d = registry.dump();
    assert_eq!(d.len(), 2);

    let restored = AccountRegistry::from_dump(Network::Bitcoin, &d).unwrap();
    assert_eq!(restored, registry);
    assert_eq!(restored.dump(), d);
    assert_eq!(restored.ids().collect::<Vec<_>>(), vec!["0", "x1"]);
}
