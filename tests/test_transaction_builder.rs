use okchain_sdk::codec::Codec;
use okchain_sdk::coins::parse_coins;
use okchain_sdk::keys::{KeyLookup, Keybase};
use okchain_sdk::msgs::*;
use okchain_sdk::transaction_builder::*;
use okchain_sdk::transactions::StdFee;
use okchain_sdk::{AccAddress, BuildError, Error, ValidationError};

const MNEMONIC: &str = "total lottery arena when pudding best candy until army spoil drill pool";
const RECIPIENT: &str = "okchain1g7c3nvac7mjgn2m9mqllgat8wwd3aptdqket5k";

fn setup() -> (Keybase, AccAddress) {
    let keybase = Keybase::new();
    let info = keybase
        .create_account_with_mnemonic(MNEMONIC, "alice", "12345678")
        .unwrap();
    (keybase, info.address)
}

/// Decode a leading uvarint, returning the value and its width in bytes.
fn read_uvarint(bytes: &[u8]) -> (u64, usize) {
    let mut value = 0u64;
    for (i, byte) in bytes.iter().enumerate() {
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return (value, i + 1);
        }
    }
    panic!("Truncated uvarint");
}

fn order() -> OrderItem {
    OrderItem::parse("xxb_okt", "BUY", "11.2", "1.23").unwrap()
}

#[test]
fn test_send_scenario() {
    let codec = Codec::new();
    let (keybase, alice) = setup();
    let builder = TxBuilder::new(&codec)
        .account_number(5)
        .sequence(7)
        .memo("my memo")
        .add_msg(MsgSend::new(
            alice.clone(),
            RECIPIENT.parse().unwrap(),
            parse_coins("10.24okt").unwrap(),
        ));
    let tx = builder.build(&keybase, "alice", "12345678").unwrap();
    assert_eq!(tx.msgs.len(), 1);
    assert!(matches!(tx.msgs[0], Msg::Send(_)));
    assert_eq!(tx.signatures.len(), 1);
    assert_eq!(tx.fee, StdFee::zero());
    assert_eq!(tx.memo, "my memo");
    assert_eq!(tx.signers(), vec![alice]);

    let doc = builder.sign_doc().unwrap();
    assert_eq!(doc.chain_id, DEFAULT_CHAIN_ID);
    assert_eq!(doc.bytes().unwrap(), doc.bytes().unwrap());
}

#[test]
fn test_signature_round_trip() {
    let codec = Codec::new();
    let (keybase, alice) = setup();
    let builder = TxBuilder::new(&codec)
        .account_number(5)
        .sequence(7)
        .add_msg(MsgSend::new(
            alice,
            RECIPIENT.parse().unwrap(),
            parse_coins("10.24okt").unwrap(),
        ));
    let tx = builder.build(&keybase, "alice", "12345678").unwrap();
    let signature = &tx.signatures[0];
    assert_eq!(
        signature.pub_key,
        keybase.key_info("alice").unwrap().pub_key
    );

    let mut doc = builder.sign_doc().unwrap();
    assert!(signature.verify(&doc.bytes().unwrap()));

    doc.sequence += 1;
    assert!(!signature.verify(&doc.bytes().unwrap()));
    doc.sequence -= 1;
    doc.memo = "changed".to_string();
    assert!(!signature.verify(&doc.bytes().unwrap()));
}

#[test]
fn test_batch_shares_one_signature() {
    let codec = Codec::new();
    let (keybase, alice) = setup();
    let msgs: Vec<Msg> = vec![
        MsgNewOrders::single(alice.clone(), order()).into(),
        MsgCancelOrders::single(alice.clone(), "ID1").into(),
        MsgDelegate::new(alice, parse_coins("1okt").unwrap().iter().next().unwrap().clone())
            .into(),
    ];
    let tx = TxBuilder::new(&codec)
        .account_number(1)
        .sequence(2)
        .add_msgs(msgs)
        .build(&keybase, "alice", "12345678")
        .unwrap();
    assert_eq!(tx.msgs.len(), 3);
    assert_eq!(tx.signatures.len(), 1);
}

#[test]
fn test_invalid_batch_element_fails_whole_build() {
    let codec = Codec::new();
    let (keybase, alice) = setup();
    let bad = OrderItem::new("xxb_okt", Side::Sell, "0".parse().unwrap(), "1".parse().unwrap());
    let result = TxBuilder::new(&codec)
        .account_number(1)
        .sequence(2)
        .add_msg(MsgNewOrders::new(alice, vec![order(), bad]))
        .build(&keybase, "alice", "12345678");
    assert_eq!(result, Err(ValidationError::NonPositive("price").into()));
}

#[test]
fn test_identical_orders_then_cancel_both() {
    let codec = Codec::new();
    let (keybase, alice) = setup();

    let placed = TxBuilder::new(&codec)
        .account_number(1)
        .sequence(0)
        .add_msg(MsgNewOrders::new(alice.clone(), vec![order(), order()]))
        .build(&keybase, "alice", "12345678")
        .unwrap();
    assert_eq!(placed.signatures.len(), 1);
    match &placed.msgs[..] {
        [Msg::NewOrders(msg)] => assert_eq!(msg.order_items.len(), 2),
        other => panic!("Unexpected messages: {other:?}"),
    }

    let ids = vec!["ID0000000001-1".to_string(), "ID0000000001-2".to_string()];
    let cancelled = TxBuilder::new(&codec)
        .account_number(1)
        .sequence(1)
        .add_msg(MsgCancelOrders::new(alice.clone(), ids.clone()))
        .build(&keybase, "alice", "12345678")
        .unwrap();
    assert_eq!(cancelled.signatures.len(), 1);
    assert_eq!(
        cancelled.msgs,
        vec![Msg::CancelOrders(MsgCancelOrders::new(alice.clone(), ids))]
    );

    let duplicate = TxBuilder::new(&codec)
        .account_number(1)
        .sequence(1)
        .add_msg(MsgCancelOrders::new(
            alice,
            vec!["ID1".to_string(), "ID1".to_string()],
        ))
        .build(&keybase, "alice", "12345678");
    assert_eq!(
        duplicate,
        Err(ValidationError::DuplicateOrderId("ID1".to_string()).into())
    );
}

#[test]
fn test_signer_errors_propagate() {
    let codec = Codec::new();
    let (keybase, alice) = setup();
    let builder = TxBuilder::new(&codec)
        .account_number(1)
        .sequence(1)
        .add_msg(MsgCancelOrders::single(alice, "ID1"));
    assert_eq!(
        builder.build(&keybase, "alice", "wrong"),
        Err(Error::Key(okchain_sdk::keys::KeyError::Authentication))
    );
    assert_eq!(
        builder.build(&keybase, "bob", "12345678"),
        Err(Error::Key(okchain_sdk::keys::KeyError::NotFound(
            "bob".to_string()
        )))
    );
}

#[test]
fn test_build_and_sign_and_encode() {
    let codec = Codec::new();
    let (keybase, alice) = setup();
    let msgs: Vec<Msg> = vec![MsgSend::new(
        alice,
        RECIPIENT.parse().unwrap(),
        parse_coins("10.24okt").unwrap(),
    )
    .into()];
    let encoded = build_and_sign_and_encode(
        &codec,
        &keybase,
        "alice",
        "12345678",
        "my memo",
        msgs.clone(),
        5,
        7,
    )
    .unwrap();
    let built = TxBuilder::new(&codec)
        .account_number(5)
        .sequence(7)
        .memo("my memo")
        .add_msgs(msgs)
        .build(&keybase, "alice", "12345678")
        .unwrap();
    assert_eq!(encoded, built.encode(&codec).unwrap());
    // uvarint length prefix, then the StdTx prefix
    let (len, width) = read_uvarint(&encoded);
    assert_eq!(width, 2);
    assert_eq!(len as usize + width, encoded.len());
    assert_eq!(&encoded[width..width + 4], &[0x28, 0x28, 0x16, 0xa9]);

    assert_eq!(
        build_and_sign_and_encode(&codec, &keybase, "alice", "12345678", "", vec![], 5, 7),
        Err(BuildError::EmptyTransaction.into())
    );
}
