use std::sync::Mutex;

use async_trait::async_trait;

use okchain_sdk::client::*;
use okchain_sdk::codec::Codec;
use okchain_sdk::keys::{KeyError, Keybase};
use okchain_sdk::msgs::Description;
use okchain_sdk::network::*;
use okchain_sdk::{ConsPubKey, Error, ValAddress, ValidationError};

const MNEMONIC: &str = "total lottery arena when pudding best candy until army spoil drill pool";
const RECIPIENT: &str = "okchain1g7c3nvac7mjgn2m9mqllgat8wwd3aptdqket5k";

/// Records every submission and answers with a committed result.
#[derive(Default)]
struct RecordingNode {
    posted: Mutex<Vec<(Vec<u8>, BroadcastMode)>>,
    order_ids: Vec<String>,
}

impl RecordingNode {
    fn posted(&self) -> Vec<(Vec<u8>, BroadcastMode)> {
        self.posted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingNode {
    async fn post(&self, tx: &[u8], mode: BroadcastMode) -> Result<RawResponse, TransportError> {
        self.posted.lock().unwrap().push((tx.to_vec(), mode));
        let attributes = self
            .order_ids
            .iter()
            .map(|id| Attribute {
                key: ORDER_ID_KEY.to_string(),
                value: id.clone(),
            })
            .collect();
        Ok(RawResponse {
            hash: "HASH".to_string(),
            height: 1,
            check_tx: Some(ExecResult::default()),
            deliver_tx: Some(ExecResult {
                events: vec![Event {
                    kind: "message".to_string(),
                    attributes,
                }],
                ..ExecResult::default()
            }),
        })
    }
}

fn client(node: RecordingNode) -> OkChainClient<RecordingNode, Keybase> {
    let keybase = Keybase::new();
    keybase
        .create_account_with_mnemonic(MNEMONIC, "alice", "12345678")
        .unwrap();
    OkChainClient::new(ClientConfig::local(), node, keybase)
}

fn options() -> TxOptions {
    TxOptions::new(5, 7)
}

#[tokio::test]
async fn test_send() {
    let client = client(RecordingNode::default());
    let response = client
        .send("alice", "12345678", RECIPIENT, "10.24okt", &options().memo("my memo"))
        .await
        .unwrap();
    assert_eq!(response.mode, BroadcastMode::Block);
    let posted = client_node(&client).posted();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].1, BroadcastMode::Block);
    // Length prefix, then the StdTx prefix.
    assert_eq!(&posted[0].0[2..6], &[0x28, 0x28, 0x16, 0xa9]);
}

#[tokio::test]
async fn test_invalid_params_never_reach_node() {
    let client = client(RecordingNode::default());
    assert_eq!(
        client
            .send("alice", "12345678", "okchain1short", "1okt", &options())
            .await,
        Err(ValidationError::InvalidAddress("okchain1short".to_string()).into())
    );
    assert_eq!(
        client
            .new_order("alice", "12345678", "xxb_okt", "HOLD", "1", "1", &options())
            .await,
        Err(ValidationError::InvalidSide("HOLD".to_string()).into())
    );
    assert_eq!(
        client
            .cancel_orders("alice", "12345678", &["ID1", "ID1"], &options())
            .await,
        Err(ValidationError::DuplicateOrderId("ID1".to_string()).into())
    );
    assert_eq!(
        client.delegate("alice", "", "1okt", &options()).await,
        Err(ValidationError::EmptyPassphrase.into())
    );
    assert!(client_node(&client).posted().is_empty());
}

#[tokio::test]
async fn test_unknown_key() {
    let client = client(RecordingNode::default());
    assert_eq!(
        client.unjail("bob", "12345678", &options()).await,
        Err(Error::Key(KeyError::NotFound("bob".to_string())))
    );
}

#[tokio::test]
async fn test_new_orders_return_ids() {
    let client = client(RecordingNode {
        order_ids: vec!["ID1".to_string(), "ID2".to_string()],
        ..RecordingNode::default()
    });
    let response = client
        .new_orders(
            "alice",
            "12345678",
            &["xxb_okt", "xxb_okt"],
            &["BUY", "BUY"],
            &["11.2", "11.2"],
            &["1.23", "1.23"],
            &options(),
        )
        .await
        .unwrap();
    assert_eq!(response.order_ids(), vec!["ID1", "ID2"]);

    let ids = response.order_ids();
    client
        .cancel_orders("alice", "12345678", &ids, &options())
        .await
        .unwrap();
    assert_eq!(client_node(&client).posted().len(), 2);
}

#[tokio::test]
async fn test_new_orders_length_mismatch() {
    let client = client(RecordingNode::default());
    assert!(matches!(
        client
            .new_orders(
                "alice",
                "12345678",
                &["xxb_okt"],
                &["BUY"],
                &["11.2", "1"],
                &["1.23"],
                &options(),
            )
            .await,
        Err(Error::Validation(ValidationError::Malformed(_)))
    ));
}

#[tokio::test]
async fn test_staking_operations() {
    let client = client(RecordingNode::default());
    let validator = ValAddress::from([1; 20]).to_bech32();
    client
        .vote("alice", "12345678", &[validator.as_str()], &options())
        .await
        .unwrap();
    client
        .create_validator(
            "alice",
            "12345678",
            &ConsPubKey([7; 32]).to_bech32(),
            Description::new("alice-node"),
            "10000okt",
            &options(),
        )
        .await
        .unwrap();
    client
        .edit_validator("alice", "12345678", Description::new("renamed"), &options())
        .await
        .unwrap();
    client.register_proxy("alice", "12345678", &options()).await.unwrap();
    client
        .bind_proxy("alice", "12345678", RECIPIENT, &options())
        .await
        .unwrap();
    client.unbind_proxy("alice", "12345678", &options()).await.unwrap();
    client.destroy_validator("alice", "12345678", &options()).await.unwrap();
    assert_eq!(client_node(&client).posted().len(), 7);
}

#[tokio::test]
async fn test_bad_consensus_key() {
    let client = client(RecordingNode::default());
    assert!(matches!(
        client
            .create_validator(
                "alice",
                "12345678",
                RECIPIENT,
                Description::new("alice-node"),
                "1okt",
                &options(),
            )
            .await,
        Err(Error::Validation(ValidationError::InvalidConsensusKey(_)))
    ));
}

#[tokio::test]
async fn test_configured_mode_is_used() {
    let keybase = Keybase::new();
    keybase
        .create_account_with_mnemonic(MNEMONIC, "alice", "12345678")
        .unwrap();
    let config = ClientConfig::from_json(r#"{"broadcast_mode": "sync"}"#).unwrap();
    let client = OkChainClient::with_codec(Codec::new(), config, RecordingNode::default(), keybase);
    let response = client
        .multi_send(
            "alice",
            "12345678",
            &format!("{RECIPIENT} 1okt\n{RECIPIENT} 2okt"),
            &options(),
        )
        .await
        .unwrap();
    assert_eq!(response.mode, BroadcastMode::Sync);
}

fn client_node(client: &OkChainClient<RecordingNode, Keybase>) -> &RecordingNode {
    client.transport()
}
