use okchain_sdk::{
    AccAddress, AddressConvertible, AddressValidationError, ConsPubKey, PublicKey, ValAddress,
};

#[test]
fn test_pubkey_to_address() {
    let pubkey: PublicKey = "02fa42bcdb80aae828e480d80ec05c3a8847a2dc150071d08adf2f99fbcb09a3fb"
        .parse()
        .unwrap();
    let ref_addr: AccAddress = "okchain152p8xmejhza7wuhhzut88vkakdgasqwlw2qjcf"
        .parse()
        .unwrap();
    assert_eq!(pubkey.address(), ref_addr);
}

#[test]
fn test_generator_pubkey_to_address() {
    let pubkey: PublicKey = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        .parse()
        .unwrap();
    assert_eq!(
        pubkey.address().to_string(),
        "okchain1w508d6qejxtdg4y5r3zarvary0c5xw7kc8d2em"
    );
}

#[test]
fn test_can_create_from_raw() {
    assert_eq!(
        AccAddress::from([1; 20]).to_bech32(),
        "okchain1qyqszqgpqyqszqgpqyqszqgpqyqszqgpsfmwml"
    );
    assert_eq!(
        AccAddress::from([2; 20]).to_bech32(),
        "okchain1qgpqyqszqgpqyqszqgpqyqszqgpqyqszpdatsf"
    );
    assert_eq!(
        ValAddress::from([1; 20]).to_bech32(),
        "okchainvaloper1qyqszqgpqyqszqgpqyqszqgpqyqszqgpvh2twe"
    );
}

#[test]
fn test_account_validator_conversion() {
    let acc = AccAddress::from([1; 20]);
    let val = ValAddress::from(&acc);
    assert_eq!(val.as_bytes(), acc.as_bytes());
    assert_eq!(AccAddress::from(&val), acc);
}

#[test]
fn test_parse_round_trip() {
    let text = "okchain1g7c3nvac7mjgn2m9mqllgat8wwd3aptdqket5k";
    let addr: AccAddress = text.parse().unwrap();
    assert_eq!(addr.as_bytes().len(), AccAddress::WIDTH);
    assert_eq!(addr.to_string(), text);
    assert_eq!(
        serde_json::to_string(&addr).unwrap(),
        format!("\"{text}\"")
    );
}

#[test]
fn test_wrong_prefix() {
    let val = ValAddress::from([1; 20]).to_bech32();
    assert_eq!(
        val.parse::<AccAddress>(),
        Err(AddressValidationError::WrongPrefix {
            expected: "okchain",
            got: "okchainvaloper".to_string()
        })
    );
}

#[test]
fn test_bad_checksum() {
    assert!(matches!(
        "okchain1g7c3nvac7mjgn2m9mqllgat8wwd3aptdqket5j".parse::<AccAddress>(),
        Err(AddressValidationError::InvalidBech32(_))
    ));
}

#[test]
fn test_bech32m_checksum_rejected() {
    // Same payload ([7; 20]) under both checksum variants.
    assert_eq!(
        "okchain1qurswpc8qurswpc8qurswpc8qurswpc83fa2kz".parse::<AccAddress>(),
        Ok(AccAddress::from([7; 20]))
    );
    assert!(matches!(
        "okchain1qurswpc8qurswpc8qurswpc8qurswpc8y4dxnq".parse::<AccAddress>(),
        Err(AddressValidationError::InvalidBech32(_))
    ));
}

#[test]
fn test_consensus_pubkey() {
    let key = ConsPubKey([7; 32]);
    let text = "okchainvalconspub1zcjduepqqurswpc8qurswpc8qurswpc8qurswpc8qurswpc8qurswpc8qurslkkkzs";
    assert_eq!(key.to_bech32(), text);
    assert_eq!(text.parse::<ConsPubKey>().unwrap(), key);
}
