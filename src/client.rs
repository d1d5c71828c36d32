//! High-level operations: validate parameters, build, sign and broadcast.
//!
//! Every method of [`OkChainClient`] runs the same pipeline: pre-flight
//! [`params`](crate::params) checks, message construction, signing through
//! [`TxBuilder`] and a single [`broadcast`] call. The client never tracks
//! sequence numbers: callers pass the current account number and sequence
//! in [`TxOptions`] and advance the sequence themselves between dependent
//! calls.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::address::{AccAddress, ConsPubKey, ValAddress};
use crate::codec::Codec;
use crate::coins::{parse_coin, parse_coins, parse_transfers};
use crate::error::{Error, ValidationError};
use crate::keys::{KeyLookup, Signer};
use crate::msgs::{
    Description, Msg, MsgBindProxy, MsgCancelOrders, MsgCreateValidator, MsgDelegate,
    MsgDestroyValidator, MsgEditValidator, MsgMint, MsgMultiSend, MsgNewOrders, MsgRegProxy,
    MsgSend, MsgUnbindProxy, MsgUndelegate, MsgUnjail, MsgVote, OrderItem,
};
use crate::network::{broadcast, BroadcastMode, Transport, TxResponse};
use crate::params;
use crate::transaction_builder::{TxBuilder, DEFAULT_CHAIN_ID};

/// Default Tendermint RPC endpoint of a local node.
pub const DEFAULT_NODE_URL: &str = "http://127.0.0.1:26657";

/// Connection and broadcast settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Tendermint RPC base url
    pub node_url: String,
    /// Chain identifier written into every sign document
    pub chain_id: String,
    /// How long [`OkChainClient`] waits for each broadcast
    pub broadcast_mode: BroadcastMode,
    /// Request timeout in seconds, if any
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            node_url: DEFAULT_NODE_URL.to_string(),
            chain_id: DEFAULT_CHAIN_ID.to_string(),
            broadcast_mode: BroadcastMode::Block,
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn local() -> Self {
        //! Local node on the default port, block mode.
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self, Error> {
        //! Parse a JSON document, missing keys fall back to [`ClientConfig::local`].
        //!
        //! ```rust
        //! use okchain_sdk::client::ClientConfig;
        //! use okchain_sdk::network::BroadcastMode;
        //!
        //! let config = ClientConfig::from_json(r#"{"broadcast_mode": "sync"}"#)?;
        //! assert_eq!(config.broadcast_mode, BroadcastMode::Sync);
        //! assert_eq!(config.chain_id, "okchain");
        //! # Ok::<(), okchain_sdk::Error>(())
        //! ```
        serde_json::from_str(text)
            .map_err(|e| ValidationError::Malformed(format!("client config: {e}")).into())
    }
}

/// Per-transaction signing parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxOptions {
    /// Free-form note
    pub memo: String,
    /// On-chain account number of the signer
    pub account_number: u64,
    /// Current sequence of the signer
    pub sequence: u64,
}

impl TxOptions {
    pub fn new(account_number: u64, sequence: u64) -> Self {
        //! Options for the given account number and sequence, with an empty memo.
        Self {
            memo: String::new(),
            account_number,
            sequence,
        }
    }

    #[must_use]
    pub fn memo<S: Into<String>>(mut self, memo: S) -> Self {
        //! Attach a memo.
        self.memo = memo.into();
        self
    }
}

/// Transaction client bound to a node and a key store.
#[derive(Debug)]
pub struct OkChainClient<T, K> {
    codec: Codec,
    config: ClientConfig,
    transport: T,
    keys: K,
}

impl<T, K> OkChainClient<T, K>
where
    T: Transport,
    K: Signer + KeyLookup + Sync,
{
    pub fn new(config: ClientConfig, transport: T, keys: K) -> Self {
        //! Client with the default message registry.
        Self::with_codec(Codec::new(), config, transport, keys)
    }

    pub fn with_codec(codec: Codec, config: ClientConfig, transport: T, keys: K) -> Self {
        //! Client with an explicitly constructed codec.
        Self {
            codec,
            config,
            transport,
            keys,
        }
    }

    pub const fn config(&self) -> &ClientConfig {
        //! Client configuration.
        &self.config
    }

    pub const fn keys(&self) -> &K {
        //! Key store used for signing.
        &self.keys
    }

    pub const fn transport(&self) -> &T {
        //! Underlying transport.
        &self.transport
    }

    fn address_of(&self, name: &str) -> Result<AccAddress, Error> {
        Ok(self.keys.key_info(name)?.address)
    }

    async fn submit(
        &self,
        name: &str,
        passphrase: &str,
        options: &TxOptions,
        msgs: Vec<Msg>,
    ) -> Result<TxResponse, Error> {
        let tx = TxBuilder::new(&self.codec)
            .chain_id(self.config.chain_id.as_str())
            .account_number(options.account_number)
            .sequence(options.sequence)
            .memo(options.memo.as_str())
            .add_msgs(msgs)
            .build_and_encode(&self.keys, name, passphrase)?;
        broadcast(&self.transport, &tx, self.config.broadcast_mode).await
    }

    pub async fn send(
        &self,
        name: &str,
        passphrase: &str,
        to: &str,
        coins: &str,
        options: &TxOptions,
    ) -> Result<TxResponse, Error> {
        //! Transfer `coins` (e.g. `"10.24okt"`) to the account `to`.
        let to = params::check_send_params(name, passphrase, to)?;
        let amount = parse_coins(coins)?;
        let msg = MsgSend::new(self.address_of(name)?, to, amount);
        self.submit(name, passphrase, options, vec![msg.into()]).await
    }

    pub async fn multi_send(
        &self,
        name: &str,
        passphrase: &str,
        transfers: &str,
        options: &TxOptions,
    ) -> Result<TxResponse, Error> {
        //! Pay several recipients at once, one `<address> <coins>` per line.
        let transfers = parse_transfers(transfers)?;
        params::check_transfer_units_params(name, passphrase, &transfers)?;
        let msg = MsgMultiSend::new(self.address_of(name)?, transfers);
        self.submit(name, passphrase, options, vec![msg.into()]).await
    }

    pub async fn mint(
        &self,
        name: &str,
        passphrase: &str,
        symbol: &str,
        amount: i64,
        options: &TxOptions,
    ) -> Result<TxResponse, Error> {
        //! Issue `amount` more units of a token owned by the key.
        params::check_key_params(name, passphrase)?;
        let msg = MsgMint::new(symbol, amount, self.address_of(name)?);
        self.submit(name, passphrase, options, vec![msg.into()]).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn new_order(
        &self,
        name: &str,
        passphrase: &str,
        product: &str,
        side: &str,
        price: &str,
        quantity: &str,
        options: &TxOptions,
    ) -> Result<TxResponse, Error> {
        //! Place one limit order. The assigned id is available through
        //! [`TxResponse::order_id`].
        params::check_new_order_params(name, passphrase, product, side)?;
        let item = OrderItem::parse(product, side, price, quantity)?;
        let msg = MsgNewOrders::single(self.address_of(name)?, item);
        self.submit(name, passphrase, options, vec![msg.into()]).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn new_orders<S: AsRef<str>>(
        &self,
        name: &str,
        passphrase: &str,
        products: &[S],
        sides: &[S],
        prices: &[S],
        quantities: &[S],
        options: &TxOptions,
    ) -> Result<TxResponse, Error> {
        //! Place a batch of orders under one signature. All lists must have
        //! the same length; the ids come back in
        //! [`TxResponse::order_ids`].
        params::check_new_orders_params(name, passphrase, products, sides)?;
        if prices.len() != products.len() || quantities.len() != products.len() {
            return Err(ValidationError::Malformed(format!(
                "{} products, {} prices and {} quantities",
                products.len(),
                prices.len(),
                quantities.len()
            ))
            .into());
        }
        let items = itertools::izip!(products, sides, prices, quantities)
            .map(|(product, side, price, quantity)| {
                OrderItem::parse(
                    product.as_ref(),
                    side.as_ref(),
                    price.as_ref(),
                    quantity.as_ref(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        let msg = MsgNewOrders::new(self.address_of(name)?, items);
        self.submit(name, passphrase, options, vec![msg.into()]).await
    }

    pub async fn cancel_order(
        &self,
        name: &str,
        passphrase: &str,
        order_id: &str,
        options: &TxOptions,
    ) -> Result<TxResponse, Error> {
        //! Cancel a single order by id.
        self.cancel_orders(name, passphrase, &[order_id], options)
            .await
    }

    pub async fn cancel_orders<S: AsRef<str>>(
        &self,
        name: &str,
        passphrase: &str,
        order_ids: &[S],
        options: &TxOptions,
    ) -> Result<TxResponse, Error> {
        //! Cancel several orders under one signature.
        params::check_cancel_orders_params(name, passphrase, order_ids)?;
        let ids = order_ids.iter().map(|id| id.as_ref().to_string()).collect();
        let msg = MsgCancelOrders::new(self.address_of(name)?, ids);
        self.submit(name, passphrase, options, vec![msg.into()]).await
    }

    pub async fn delegate(
        &self,
        name: &str,
        passphrase: &str,
        quantity: &str,
        options: &TxOptions,
    ) -> Result<TxResponse, Error> {
        //! Stake `quantity` (e.g. `"100okt"`).
        params::check_key_params(name, passphrase)?;
        let msg = MsgDelegate::new(self.address_of(name)?, parse_coin(quantity)?);
        self.submit(name, passphrase, options, vec![msg.into()]).await
    }

    pub async fn undelegate(
        &self,
        name: &str,
        passphrase: &str,
        quantity: &str,
        options: &TxOptions,
    ) -> Result<TxResponse, Error> {
        //! Withdraw staked tokens.
        params::check_key_params(name, passphrase)?;
        let msg = MsgUndelegate::new(self.address_of(name)?, parse_coin(quantity)?);
        self.submit(name, passphrase, options, vec![msg.into()]).await
    }

    pub async fn vote<S: AsRef<str>>(
        &self,
        name: &str,
        passphrase: &str,
        validators: &[S],
        options: &TxOptions,
    ) -> Result<TxResponse, Error> {
        //! Vote for up to thirty validators given as `okchainvaloper...`.
        let validators = params::check_vote_params(name, passphrase, validators)?;
        let msg = MsgVote::new(self.address_of(name)?, validators);
        self.submit(name, passphrase, options, vec![msg.into()]).await
    }

    pub async fn create_validator(
        &self,
        name: &str,
        passphrase: &str,
        consensus_pubkey: &str,
        description: Description,
        min_self_delegation: &str,
        options: &TxOptions,
    ) -> Result<TxResponse, Error> {
        //! Register the key's account as a validator operator.
        //! `consensus_pubkey` is an `okchainvalconspub...` string.
        params::check_key_params(name, passphrase)?;
        let pubkey = ConsPubKey::from_bech32(consensus_pubkey)
            .map_err(|e| ValidationError::InvalidConsensusKey(e.to_string()))?;
        let msg = MsgCreateValidator::new(
            description,
            parse_coin(min_self_delegation)?,
            self.address_of(name)?,
            pubkey,
        );
        self.submit(name, passphrase, options, vec![msg.into()]).await
    }

    pub async fn edit_validator(
        &self,
        name: &str,
        passphrase: &str,
        description: Description,
        options: &TxOptions,
    ) -> Result<TxResponse, Error> {
        //! Update the description of the validator operated by `name`.
        params::check_key_params(name, passphrase)?;
        let operator = ValAddress::from(&self.address_of(name)?);
        let msg = MsgEditValidator::new(description, operator);
        self.submit(name, passphrase, options, vec![msg.into()]).await
    }

    pub async fn destroy_validator(
        &self,
        name: &str,
        passphrase: &str,
        options: &TxOptions,
    ) -> Result<TxResponse, Error> {
        //! Retire the validator operated by `name`.
        params::check_key_params(name, passphrase)?;
        let msg = MsgDestroyValidator::new(self.address_of(name)?);
        self.submit(name, passphrase, options, vec![msg.into()]).await
    }

    pub async fn unjail(
        &self,
        name: &str,
        passphrase: &str,
        options: &TxOptions,
    ) -> Result<TxResponse, Error> {
        //! Release the key's validator from jail.
        params::check_key_params(name, passphrase)?;
        let operator = ValAddress::from(&self.address_of(name)?);
        let msg = MsgUnjail::new(operator);
        self.submit(name, passphrase, options, vec![msg.into()]).await
    }

    pub async fn register_proxy(
        &self,
        name: &str,
        passphrase: &str,
        options: &TxOptions,
    ) -> Result<TxResponse, Error> {
        //! Let other delegators bind their votes to this account.
        self.reg_or_unreg_proxy(name, passphrase, true, options)
            .await
    }

    pub async fn unregister_proxy(
        &self,
        name: &str,
        passphrase: &str,
        options: &TxOptions,
    ) -> Result<TxResponse, Error> {
        //! Stop acting as a proxy.
        self.reg_or_unreg_proxy(name, passphrase, false, options)
            .await
    }

    async fn reg_or_unreg_proxy(
        &self,
        name: &str,
        passphrase: &str,
        reg: bool,
        options: &TxOptions,
    ) -> Result<TxResponse, Error> {
        params::check_key_params(name, passphrase)?;
        let msg = MsgRegProxy::new(self.address_of(name)?, reg);
        self.submit(name, passphrase, options, vec![msg.into()]).await
    }

    pub async fn bind_proxy(
        &self,
        name: &str,
        passphrase: &str,
        proxy: &str,
        options: &TxOptions,
    ) -> Result<TxResponse, Error> {
        //! Delegate voting to the registered proxy account `proxy`.
        let proxy = params::check_send_params(name, passphrase, proxy)?;
        let msg = MsgBindProxy::new(self.address_of(name)?, proxy);
        self.submit(name, passphrase, options, vec![msg.into()]).await
    }

    pub async fn unbind_proxy(
        &self,
        name: &str,
        passphrase: &str,
        options: &TxOptions,
    ) -> Result<TxResponse, Error> {
        //! Detach the account from its proxy.
        params::check_key_params(name, passphrase)?;
        let msg = MsgUnbindProxy::new(self.address_of(name)?);
        self.submit(name, passphrase, options, vec![msg.into()]).await
    }
}

impl FromStr for ClientConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}
