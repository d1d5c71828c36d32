#![doc(html_root_url = "https://docs.rs/okchain-sdk/0.1.0")]
#![warn(rust_2018_idioms, missing_docs)]
#![deny(dead_code, unused_imports, unused_mut)]

//! Rust library to aid coding with OKChain: keys, message construction,
//! transaction signing, encoding and broadcasting.
//!
//! The node does all the hard work (execution, order matching, balances).
//! This crate only turns typed intents into signed, wire-ready
//! transactions and hands them over to a node.
//!
//! ## Usage
//!
//! Let's transfer some OKT to another account.
//!
//! To do so, we need a key, a message and the current account number and
//! sequence of the sender. The result is a length-prefixed binary
//! transaction that any Tendermint RPC node accepts.
//!
//! ```rust
//! use okchain_sdk::codec::Codec;
//! use okchain_sdk::coins::parse_coins;
//! use okchain_sdk::keys::Keybase;
//! use okchain_sdk::msgs::MsgSend;
//! use okchain_sdk::transaction_builder::TxBuilder;
//!
//! let keybase = Keybase::new();
//! let alice = keybase
//!     .create_account_with_mnemonic(
//!         "total lottery arena when pudding best candy until army spoil drill pool",
//!         "alice",
//!         "12345678",
//!     )
//!     .expect("Must be correct");
//! let codec = Codec::new();
//! let tx = TxBuilder::new(&codec)
//!     .account_number(5)
//!     .sequence(7)
//!     .memo("my memo")
//!     .add_msg(MsgSend::new(
//!         alice.address,
//!         "okchain1g7c3nvac7mjgn2m9mqllgat8wwd3aptdqket5k"
//!             .parse()
//!             .unwrap(),
//!         parse_coins("10.24okt").unwrap(),
//!     ))
//!     .build(&keybase, "alice", "12345678")
//!     .expect("Builds");
//! println!("{}", tx.hash(&codec).unwrap());
//! println!("{:02x?}", tx.encode(&codec).unwrap());
//! ```
//!
//! [`client::OkChainClient`] wraps the whole pipeline (parameter checks,
//! building, signing and broadcasting) behind one method per operation.
//! Enable the `http` feature to get `network::HttpTransport`, a ready-made
//! transport for the Tendermint RPC of a node.
//!
//! ## Examples
//!
//! You can check out sample usage of this crate in the `demos/` folder.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events at `debug` level when a transaction
//! is assembled, encoded and broadcast, and at `warn` level when the node
//! rejects it. No subscriber is installed by the library. Passphrases and
//! key material are never logged.
//!
//! ### MSRV
//!
//! Currently it requires rust `1.69.0` or higher to build.

mod address;
pub use address::{
    AccAddress, AddressConvertible, AddressValidationError, ConsPubKey, PrivateKey, PublicKey,
    ValAddress, ACCOUNT_HRP, CONSENSUS_PUBKEY_HRP, VALIDATOR_HRP,
};
pub mod amino;
pub mod client;
pub mod codec;
pub mod coins;
pub mod decimal;
mod error;
pub use error::{BuildError, Error, Result, ValidationError};
pub mod keys;
pub mod msgs;
pub mod network;
pub mod params;
pub mod transaction_builder;
pub mod transactions;
mod utils;
pub use decimal::Dec;
pub use utils::{decode_hex, encode_hex, ripemd160, sha256};
