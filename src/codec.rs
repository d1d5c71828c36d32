//! Type registry and canonical serialization.
//!
//! The [`Codec`] maps every versioned type identifier (e.g.
//! `"okchain/order/MsgNew"`) to the 4-byte prefix used in binary encoding.
//! The node keeps the same table, so additions must be coordinated with it.
//! A codec is an ordinary immutable value: build it once with
//! [`Codec::new`] and hand it to [`TxBuilder`](crate::transaction_builder::TxBuilder).
//!
//! Canonical JSON ([`to_sorted_json`]) re-emits a document with object keys
//! sorted at every level and with the chain's string escaping. These bytes
//! are exactly what gets signed.

use std::collections::HashMap;
use std::io;

use serde::Serialize;
use serde_json::ser::{CharEscape, CompactFormatter, Formatter};

use crate::amino::{AminoEncode, AminoWriter};
use crate::error::BuildError;
use crate::msgs;
use crate::transactions::StdTx;
use crate::utils::sha256;

/// Type identifier of the transaction envelope.
pub const STD_TX_NAME: &str = "cosmos-sdk/StdTx";
/// Type identifier of secp256k1 account public keys.
pub const PUBKEY_SECP256K1_NAME: &str = "tendermint/PubKeySecp256k1";
/// Type identifier of ed25519 consensus public keys.
pub const PUBKEY_ED25519_NAME: &str = "tendermint/PubKeyEd25519";

pub fn name_to_prefix(name: &str) -> [u8; 4] {
    //! Derive the amino prefix: `sha256(name)`, skip leading zero bytes,
    //! drop 3 disambiguation bytes, skip zero bytes again, take 4.
    let hash = sha256(name.as_bytes());
    let mut rest = hash.iter().copied().skip_while(|&b| b == 0).skip(3).skip_while(|&b| b == 0);
    let mut prefix = [0u8; 4];
    for byte in prefix.iter_mut() {
        *byte = rest.next().unwrap_or_default();
    }
    prefix
}

/// Immutable registry of type identifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Codec {
    prefixes: HashMap<&'static str, [u8; 4]>,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec {
    pub fn new() -> Self {
        //! Registry with the envelope, public key and all message types.
        [STD_TX_NAME, PUBKEY_SECP256K1_NAME, PUBKEY_ED25519_NAME]
            .into_iter()
            .chain(msgs::REGISTERED_TYPES.iter().copied())
            .fold(Self::empty(), Self::register)
    }

    pub fn empty() -> Self {
        //! Registry without any types.
        Self {
            prefixes: HashMap::new(),
        }
    }

    #[must_use]
    pub fn register(mut self, name: &'static str) -> Self {
        //! Add a type identifier.
        self.prefixes.insert(name, name_to_prefix(name));
        self
    }

    pub fn prefix(&self, name: &str) -> Result<[u8; 4], BuildError> {
        //! Prefix of a registered identifier.
        self.prefixes
            .get(name)
            .copied()
            .ok_or_else(|| BuildError::UnregisteredType(name.to_string()))
    }

    pub fn resolve_prefix(&self, prefix: [u8; 4]) -> Option<&'static str> {
        //! Reverse lookup, as performed by the decoding side.
        self.prefixes
            .iter()
            .find(|(_, p)| **p == prefix)
            .map(|(name, _)| *name)
    }

    pub fn contains(&self, name: &str) -> bool {
        //! Whether `name` is registered.
        self.prefixes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        //! Number of registered types.
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        //! Whether nothing is registered.
        self.prefixes.is_empty()
    }

    pub fn marshal_binary_bare<T: AminoEncode + ?Sized>(
        &self,
        name: &str,
        value: &T,
    ) -> Result<Vec<u8>, BuildError> {
        //! Registered value: prefix followed by struct fields.
        let mut out = AminoWriter::new();
        out.put_raw(&self.prefix(name)?);
        value.encode_amino(self, &mut out)?;
        Ok(out.into_inner())
    }

    pub fn encode_tx(&self, tx: &StdTx) -> Result<Vec<u8>, BuildError> {
        //! Length-prefixed binary form of a signed transaction, ready to broadcast.
        let bare = self.marshal_binary_bare(STD_TX_NAME, tx)?;
        let mut out = AminoWriter::new();
        out.put_uvarint(bare.len() as u64);
        out.put_raw(&bare);
        Ok(out.into_inner())
    }
}

/// JSON formatter reproducing the node's string escaping.
///
/// `<`, `>`, `&`, U+2028 and U+2029 are written as `\uXXXX`; control
/// characters without a two-letter escape use lowercase `\u00XX`.
#[derive(Clone, Copy, Debug, Default)]
struct ChainJsonFormatter;

impl Formatter for ChainJsonFormatter {
    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (idx, ch) in fragment.char_indices() {
            let escaped = match ch {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            writer.write_all(fragment[start..idx].as_bytes())?;
            writer.write_all(escaped.as_bytes())?;
            start = idx + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn write_char_escape<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        char_escape: CharEscape,
    ) -> io::Result<()> {
        match char_escape {
            CharEscape::Backspace => writer.write_all(b"\\u0008"),
            CharEscape::FormFeed => writer.write_all(b"\\u000c"),
            other => CompactFormatter.write_char_escape(writer, other),
        }
    }
}

pub fn to_sorted_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, BuildError> {
    //! Serialize with keys sorted lexicographically at every nesting level.
    let value = serde_json::to_value(value)?;
    let mut out = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(&mut out, ChainJsonFormatter);
    value.serialize(&mut ser)?;
    Ok(out)
}

pub fn sort_json(bytes: &[u8]) -> Result<Vec<u8>, BuildError> {
    //! Re-emit arbitrary JSON bytes in canonical form.
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    to_sorted_json(&value)
}
