//! Transaction assembly and signing.
//!
//! ```rust
//! use okchain_sdk::codec::Codec;
//! use okchain_sdk::coins::parse_coins;
//! use okchain_sdk::keys::Keybase;
//! use okchain_sdk::msgs::MsgSend;
//! use okchain_sdk::transaction_builder::TxBuilder;
//! use okchain_sdk::AccAddress;
//!
//! let keybase = Keybase::new();
//! let alice = keybase.create_account_with_mnemonic(
//!     "total lottery arena when pudding best candy until army spoil drill pool",
//!     "alice",
//!     "12345678",
//! )?;
//! let codec = Codec::new();
//! let tx = TxBuilder::new(&codec)
//!     .account_number(5)
//!     .sequence(7)
//!     .memo("my memo")
//!     .add_msg(MsgSend::new(
//!         alice.address.clone(),
//!         "okchain1g7c3nvac7mjgn2m9mqllgat8wwd3aptdqket5k".parse()?,
//!         parse_coins("10.24okt")?,
//!     ))
//!     .build(&keybase, "alice", "12345678")?;
//! assert_eq!(tx.signatures.len(), 1);
//! let bytes = tx.encode(&codec)?;
//! # let _ = bytes;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use tracing::debug;

use crate::address::AddressConvertible;
use crate::codec::Codec;
use crate::error::{BuildError, Error};
use crate::keys::Signer;
use crate::msgs::Msg;
use crate::transactions::{StdFee, StdSignMsg, StdSignature, StdTx};

/// Chain identifier used unless overridden.
pub const DEFAULT_CHAIN_ID: &str = "okchain";

#[derive(Clone, Debug, Eq, PartialEq, Default)]
struct TxTemplate {
    chain_id: Option<String>,
    account_number: Option<u64>,
    sequence: Option<u64>,
    memo: String,
    msgs: Vec<Msg>,
}

/// Transaction builder: collects messages and signing parameters, then
/// produces a signed [`StdTx`] in one all-or-nothing step.
#[derive(Clone, Debug)]
pub struct TxBuilder<'a> {
    codec: &'a Codec,
    template: TxTemplate,
}

impl<'a> TxBuilder<'a> {
    #[must_use]
    pub fn new(codec: &'a Codec) -> Self {
        //! Create a new builder using the given type registry.
        Self {
            codec,
            template: TxTemplate::default(),
        }
    }
    #[must_use]
    pub fn chain_id<S: Into<String>>(mut self, chain_id: S) -> Self {
        //! Override the chain identifier (default: [`DEFAULT_CHAIN_ID`]).
        self.template.chain_id = Some(chain_id.into());
        self
    }
    #[must_use]
    pub const fn account_number(mut self, account_number: u64) -> Self {
        //! Set the signer's on-chain account number.
        self.template.account_number = Some(account_number);
        self
    }
    #[must_use]
    pub const fn sequence(mut self, sequence: u64) -> Self {
        //! Set the signer's current sequence.
        self.template.sequence = Some(sequence);
        self
    }
    #[must_use]
    pub fn memo<S: Into<String>>(mut self, memo: S) -> Self {
        //! Attach a memo.
        self.template.memo = memo.into();
        self
    }
    #[must_use]
    pub fn add_msg<M: Into<Msg>>(mut self, msg: M) -> Self {
        //! Append a message.
        self.template.msgs.push(msg.into());
        self
    }
    #[must_use]
    pub fn add_msgs<I: IntoIterator<Item = Msg>>(mut self, msgs: I) -> Self {
        //! Append several messages, preserving order.
        self.template.msgs.extend(msgs);
        self
    }

    pub fn sign_doc(&self) -> Result<StdSignMsg, Error> {
        //! Validated sign document, without signing it.
        let template = &self.template;
        let account_number = template
            .account_number
            .ok_or(BuildError::MissingAccountNumber)?;
        let sequence = template.sequence.ok_or(BuildError::MissingSequence)?;
        let doc = StdSignMsg {
            chain_id: template
                .chain_id
                .clone()
                .unwrap_or_else(|| DEFAULT_CHAIN_ID.to_string()),
            account_number,
            sequence,
            fee: StdFee::zero(),
            msgs: template.msgs.clone(),
            memo: template.memo.clone(),
        };
        unsigned(&doc).validate_basic()?;
        Ok(doc)
    }

    pub fn build<S: Signer + ?Sized>(
        &self,
        signer: &S,
        name: &str,
        passphrase: &str,
    ) -> Result<StdTx, Error> {
        //! Validate, sign with the key `name` and assemble the transaction.
        //!
        //! The key must belong to the single account required by the
        //! messages, otherwise [`BuildError::SignerMismatch`] is returned.
        let doc = self.sign_doc()?;
        let sign_bytes = doc.bytes()?;
        debug!(
            chain_id = %doc.chain_id,
            account_number = doc.account_number,
            sequence = doc.sequence,
            msgs = doc.msgs.len(),
            "assembled sign document"
        );
        let (pub_key, signature) = signer.sign(name, passphrase, &sign_bytes)?;

        let mut tx = unsigned(&doc);
        let expected = tx.signers();
        let actual = pub_key.address();
        if expected != [actual.clone()] {
            return Err(BuildError::SignerMismatch {
                expected: expected.iter().map(ToString::to_string).collect(),
                actual: actual.to_string(),
            }
            .into());
        }
        tx.signatures.push(StdSignature { pub_key, signature });
        Ok(tx)
    }

    pub fn build_and_encode<S: Signer + ?Sized>(
        &self,
        signer: &S,
        name: &str,
        passphrase: &str,
    ) -> Result<Vec<u8>, Error> {
        //! [`TxBuilder::build`] followed by binary encoding.
        let tx = self.build(signer, name, passphrase)?;
        let encoded = tx.encode(self.codec)?;
        debug!(
            bytes = encoded.len(),
            hash = %tx.hash(self.codec)?,
            "encoded transaction"
        );
        Ok(encoded)
    }
}

fn unsigned(doc: &StdSignMsg) -> StdTx {
    StdTx {
        msgs: doc.msgs.clone(),
        fee: doc.fee.clone(),
        signatures: Vec::new(),
        memo: doc.memo.clone(),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn build_and_sign_and_encode<S: Signer + ?Sized>(
    codec: &Codec,
    signer: &S,
    name: &str,
    passphrase: &str,
    memo: &str,
    msgs: Vec<Msg>,
    account_number: u64,
    sequence: u64,
) -> Result<Vec<u8>, Error> {
    //! One-shot helper on the default chain: the whole batch shares one
    //! signature and one sequence number.
    TxBuilder::new(codec)
        .account_number(account_number)
        .sequence(sequence)
        .memo(memo)
        .add_msgs(msgs)
        .build_and_encode(signer, name, passphrase)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ValidationError;
    use crate::keys::Keybase;
    use crate::msgs::{MsgCancelOrders, MsgSend};
    use crate::AccAddress;

    const MNEMONIC: &str =
        "total lottery arena when pudding best candy until army spoil drill pool";

    fn keybase() -> (Keybase, AccAddress) {
        let keybase = Keybase::new();
        let info = keybase
            .create_account_with_mnemonic(MNEMONIC, "alice", "pass")
            .unwrap();
        (keybase, info.address)
    }

    #[test]
    fn test_missing_numbers() {
        let codec = Codec::new();
        let (keybase, alice) = keybase();
        let msg = MsgCancelOrders::single(alice, "ID1");
        assert_eq!(
            TxBuilder::new(&codec)
                .sequence(1)
                .add_msg(msg.clone())
                .build(&keybase, "alice", "pass"),
            Err(BuildError::MissingAccountNumber.into())
        );
        assert_eq!(
            TxBuilder::new(&codec)
                .account_number(1)
                .add_msg(msg)
                .build(&keybase, "alice", "pass"),
            Err(BuildError::MissingSequence.into())
        );
    }

    #[test]
    fn test_empty_transaction() {
        let codec = Codec::new();
        let (keybase, _) = keybase();
        assert_eq!(
            TxBuilder::new(&codec)
                .account_number(1)
                .sequence(1)
                .build(&keybase, "alice", "pass"),
            Err(BuildError::EmptyTransaction.into())
        );
    }

    #[test]
    fn test_memo_too_long() {
        let codec = Codec::new();
        let (keybase, alice) = keybase();
        let result = TxBuilder::new(&codec)
            .account_number(1)
            .sequence(1)
            .memo("m".repeat(257))
            .add_msg(MsgCancelOrders::single(alice, "ID1"))
            .build(&keybase, "alice", "pass");
        assert_eq!(
            result,
            Err(ValidationError::MemoTooLong { limit: 256, got: 257 }.into())
        );
    }

    #[test]
    fn test_signer_mismatch() {
        let codec = Codec::new();
        let (keybase, _) = keybase();
        let other = AccAddress::from([9; 20]);
        let result = TxBuilder::new(&codec)
            .account_number(1)
            .sequence(1)
            .add_msg(MsgSend::new(
                other.clone(),
                AccAddress::from([2; 20]),
                crate::coins::parse_coins("1okt").unwrap(),
            ))
            .build(&keybase, "alice", "pass");
        assert!(matches!(
            result,
            Err(Error::Build(BuildError::SignerMismatch { .. }))
        ));
    }

    #[test]
    fn test_custom_chain_id() {
        let codec = Codec::new();
        let (_, alice) = keybase();
        let doc = TxBuilder::new(&codec)
            .chain_id("okchain-testnet")
            .account_number(0)
            .sequence(0)
            .add_msg(MsgCancelOrders::single(alice, "ID1"))
            .sign_doc()
            .unwrap();
        assert_eq!(doc.chain_id, "okchain-testnet");
    }
}
