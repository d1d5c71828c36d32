//! Broadcasting signed transactions to a node.
//!
//! The [`Transport`] trait is the only seam to the outside world: it takes
//! encoded transaction bytes and a [`BroadcastMode`] and returns the node's
//! answer. [`broadcast`] turns that answer into a [`TxResponse`] or an
//! [`Error`]. Nothing is retried: re-sending signed bytes after an
//! uncertain failure may submit the transaction twice, so the decision is
//! left to the caller.
//!
//! [`HttpTransport`] (feature `http`) talks to the Tendermint RPC endpoints
//! `broadcast_tx_async`, `broadcast_tx_sync` and `broadcast_tx_commit`.

use std::str::FromStr;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use tracing::{debug, warn};

use crate::error::Error;

/// Event attribute key carrying the id of a freshly placed order.
pub const ORDER_ID_KEY: &str = "orderId";

/// How long the node keeps the caller waiting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastMode {
    /// Return right after submission, without any check
    Async,
    /// Return after the mempool admission check
    Sync,
    /// Return after the transaction is included in a block and executed
    #[default]
    Block,
}

impl BroadcastMode {
    pub const fn as_str(&self) -> &'static str {
        //! Lowercase mode name used in configuration.
        match self {
            Self::Async => "async",
            Self::Sync => "sync",
            Self::Block => "block",
        }
    }

    pub const fn rpc_method(&self) -> &'static str {
        //! Tendermint RPC endpoint implementing this mode.
        match self {
            Self::Async => "broadcast_tx_async",
            Self::Sync => "broadcast_tx_sync",
            Self::Block => "broadcast_tx_commit",
        }
    }
}

impl FromStr for BroadcastMode {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "async" => Ok(Self::Async),
            "sync" => Ok(Self::Sync),
            "block" => Ok(Self::Block),
            other => Err(TransportError::Decode(format!(
                "unknown broadcast mode \"{other}\""
            ))),
        }
    }
}

impl std::fmt::Display for BroadcastMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to reach the node or to understand its answer.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum TransportError {
    /// Connection, timeout or HTTP status failure
    Http(String),
    /// JSON-RPC error object returned by the node
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Short description
        message: String,
        /// Details
        data: String,
    },
    /// Response body cannot be parsed
    Decode(String),
    /// Response lacks a part required by the broadcast mode
    MissingResult(&'static str),
}

impl std::error::Error for TransportError {}
impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(text) => {
                f.write_str("HTTP request failed: ")?;
                f.write_str(text.strip_suffix('\n').unwrap_or(text))
            }
            Self::Rpc {
                code,
                message,
                data,
            } => write!(f, "RPC error {code}: {message} {data}"),
            Self::Decode(text) => write!(f, "Cannot decode node response: {text}"),
            Self::MissingResult(part) => write!(f, "Node response has no `{part}`"),
        }
    }
}

fn decode_attribute_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    Ok(BASE64
        .decode(&raw)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or(raw))
}

/// Key/value pair attached to an event.
///
/// Nodes transmit both parts base64-encoded; they are decoded on parsing
/// and kept verbatim when they are not valid base64 text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute key
    #[serde(deserialize_with = "decode_attribute_text")]
    pub key: String,
    /// Attribute value
    #[serde(default, deserialize_with = "decode_attribute_text")]
    pub value: String,
}

/// Event emitted while checking or executing a transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event type, e.g. `message`
    #[serde(rename = "type")]
    pub kind: String,
    /// Attributes in emission order
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

/// Outcome of a check or execution phase.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecResult {
    /// Result code, zero on success
    #[serde(default)]
    pub code: u32,
    /// Module that produced a non-zero code
    #[serde(default)]
    pub codespace: String,
    /// Raw log
    #[serde(default, deserialize_with = "null_as_default")]
    pub log: String,
    /// Gas limit
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default)]
    pub gas_wanted: u64,
    /// Gas consumed
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default)]
    pub gas_used: u64,
    /// Emitted events
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<Event>,
}

impl ExecResult {
    pub const fn is_ok(&self) -> bool {
        //! Whether the node reported success (code 0).
        self.code == 0
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Node answer as returned by a [`Transport`], before mode-specific checks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawResponse {
    /// Transaction hash (uppercase hex)
    pub hash: String,
    /// Block height, zero unless the transaction was committed
    pub height: u64,
    /// Mempool admission result
    pub check_tx: Option<ExecResult>,
    /// Block execution result
    pub deliver_tx: Option<ExecResult>,
}

/// Something able to deliver encoded transactions to a node.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Submit `tx` and wait as long as `mode` requires.
    async fn post(&self, tx: &[u8], mode: BroadcastMode) -> Result<RawResponse, TransportError>;
}

/// Typed result of a successful broadcast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxResponse {
    /// Mode the transaction was broadcast with
    pub mode: BroadcastMode,
    /// Transaction hash
    pub hash: String,
    /// Block height (`block` mode only)
    pub height: u64,
    /// Admission result (`sync` and `block` modes)
    pub check_tx: Option<ExecResult>,
    /// Execution result (`block` mode only)
    pub deliver_tx: Option<ExecResult>,
}

impl TxResponse {
    pub fn from_raw(mode: BroadcastMode, raw: RawResponse) -> Result<Self, TransportError> {
        //! Ensure the response carries every part `mode` promises.
        match mode {
            BroadcastMode::Async => {}
            BroadcastMode::Sync => {
                if raw.check_tx.is_none() {
                    return Err(TransportError::MissingResult("check_tx"));
                }
            }
            BroadcastMode::Block => {
                if raw.check_tx.is_none() {
                    return Err(TransportError::MissingResult("check_tx"));
                }
                if raw.deliver_tx.is_none() {
                    return Err(TransportError::MissingResult("deliver_tx"));
                }
            }
        }
        Ok(Self {
            mode,
            hash: raw.hash,
            height: raw.height,
            check_tx: raw.check_tx,
            deliver_tx: raw.deliver_tx,
        })
    }

    pub fn rejection(&self) -> Option<&ExecResult> {
        //! First phase that finished with a non-zero code.
        self.check_tx
            .iter()
            .chain(self.deliver_tx.iter())
            .find(|result| !result.is_ok())
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        //! Events of both phases, admission first.
        self.check_tx
            .iter()
            .chain(self.deliver_tx.iter())
            .flat_map(|result| result.events.iter())
    }

    pub fn attributes<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> {
        //! Values of every event attribute named `key`.
        self.events()
            .flat_map(|event| event.attributes.iter())
            .filter(move |attr| attr.key == key)
            .map(|attr| attr.value.as_str())
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        //! Value of the first event attribute named `key`.
        self.events()
            .flat_map(|event| event.attributes.iter())
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.as_str())
    }

    pub fn order_id(&self) -> Option<&str> {
        //! Id assigned to the first order placed by this transaction.
        self.attribute(ORDER_ID_KEY)
    }

    pub fn order_ids(&self) -> Vec<String> {
        //! Ids of all orders placed by this transaction, in emission order.
        self.attributes(ORDER_ID_KEY).map(str::to_string).collect()
    }
}

pub async fn broadcast<T: Transport + ?Sized>(
    transport: &T,
    tx: &[u8],
    mode: BroadcastMode,
) -> Result<TxResponse, Error> {
    //! Submit an encoded transaction and map the answer.
    //!
    //! Transport failures surface as [`Error::Transport`], a non-zero
    //! result code as [`Error::RemoteRejection`] carrying the node's log.
    debug!(%mode, bytes = tx.len(), "broadcasting transaction");
    let raw = transport.post(tx, mode).await?;
    let response = TxResponse::from_raw(mode, raw)?;
    if let Some(rejected) = response.rejection() {
        warn!(
            hash = %response.hash,
            code = rejected.code,
            codespace = %rejected.codespace,
            "transaction rejected by node"
        );
        return Err(Error::RemoteRejection {
            code: rejected.code,
            codespace: rejected.codespace.clone(),
            log: rejected.log.clone(),
        });
    }
    debug!(hash = %response.hash, height = response.height, "broadcast answered");
    Ok(response)
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    data: String,
}

#[derive(Deserialize)]
struct RpcEnvelope {
    result: Option<serde_json::Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct MempoolResult {
    #[serde(flatten)]
    check: ExecResult,
    #[serde(default)]
    hash: String,
}

#[serde_as]
#[derive(Deserialize)]
struct CommitResult {
    check_tx: Option<ExecResult>,
    deliver_tx: Option<ExecResult>,
    #[serde(default)]
    hash: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default)]
    height: u64,
}

pub fn parse_rpc_response(mode: BroadcastMode, body: &str) -> Result<RawResponse, TransportError> {
    //! Decode a Tendermint JSON-RPC broadcast answer.
    let decode = |e: serde_json::Error| TransportError::Decode(e.to_string());
    let envelope: RpcEnvelope = serde_json::from_str(body).map_err(decode)?;
    if let Some(err) = envelope.error {
        return Err(TransportError::Rpc {
            code: err.code,
            message: err.message,
            data: err.data,
        });
    }
    let result = envelope
        .result
        .ok_or(TransportError::MissingResult("result"))?;
    match mode {
        BroadcastMode::Block => {
            let commit: CommitResult = serde_json::from_value(result).map_err(decode)?;
            Ok(RawResponse {
                hash: commit.hash,
                height: commit.height,
                check_tx: commit.check_tx,
                deliver_tx: commit.deliver_tx,
            })
        }
        BroadcastMode::Sync | BroadcastMode::Async => {
            let mempool: MempoolResult = serde_json::from_value(result).map_err(decode)?;
            // Async answers before the admission check runs.
            let check_tx = (mode == BroadcastMode::Sync).then_some(mempool.check);
            Ok(RawResponse {
                hash: mempool.hash,
                height: 0,
                check_tx,
                deliver_tx: None,
            })
        }
    }
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::{Client, Url};

    use super::{parse_rpc_response, BroadcastMode, RawResponse, Transport, TransportError};
    use crate::utils::encode_hex;

    /// Tendermint RPC client (`GET /broadcast_tx_*?tx=0x...`).
    #[derive(Clone, Debug)]
    pub struct HttpTransport {
        /// RPC base url, e.g. `http://127.0.0.1:26657`
        pub base_url: Url,
        client: Client,
    }

    impl HttpTransport {
        pub fn new(base_url: Url) -> Self {
            //! Transport without a request timeout.
            Self {
                base_url,
                client: Client::new(),
            }
        }

        pub fn with_timeout(base_url: Url, timeout: Duration) -> Result<Self, TransportError> {
            //! Transport aborting requests after `timeout`.
            let client = Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| TransportError::Http(e.to_string()))?;
            Ok(Self { base_url, client })
        }

        pub fn from_config(config: &crate::client::ClientConfig) -> Result<Self, TransportError> {
            //! Build from [`ClientConfig`](crate::client::ClientConfig).
            let base_url = config
                .node_url
                .parse::<Url>()
                .map_err(|e| TransportError::Http(format!("{}: {e}", config.node_url)))?;
            match config.timeout_secs {
                Some(secs) => Self::with_timeout(base_url, Duration::from_secs(secs)),
                None => Ok(Self::new(base_url)),
            }
        }
    }

    #[async_trait]
    impl Transport for HttpTransport {
        async fn post(
            &self,
            tx: &[u8],
            mode: BroadcastMode,
        ) -> Result<RawResponse, TransportError> {
            let http = |e: reqwest::Error| TransportError::Http(e.to_string());
            let url = self
                .base_url
                .join(mode.rpc_method())
                .map_err(|e| TransportError::Http(e.to_string()))?;
            let body = self
                .client
                .get(url)
                .query(&[("tx", format!("0x{}", encode_hex(tx)))])
                .send()
                .await
                .map_err(http)?
                .text()
                .await
                .map_err(http)?;
            parse_rpc_response(mode, &body)
        }
    }
}
