//! Transaction envelope, sign document and binary encoding.

use itertools::Itertools;
use secp256k1::{ecdsa::Signature, Message, Secp256k1};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::address::{AccAddress, PublicKey};
use crate::amino::{AminoEncode, AminoWriter};
use crate::codec::{to_sorted_json, Codec, PUBKEY_SECP256K1_NAME};
use crate::coins::Coins;
use crate::error::{BuildError, Error, ValidationError};
use crate::msgs::Msg;
use crate::utils::{encode_hex, sha256};

/// Maximal memo length in characters.
pub const MAX_MEMO_CHARACTERS: usize = 256;

/// Transaction fee. The chain does not charge fees yet, see [`StdFee::zero`].
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdFee {
    /// Fee amount
    pub amount: Coins,
    /// Gas limit
    #[serde_as(as = "DisplayFromStr")]
    pub gas: u64,
}

impl StdFee {
    pub const fn zero() -> Self {
        //! Empty amount and zero gas.
        Self {
            amount: Coins::empty(),
            gas: 0,
        }
    }
}

impl AminoEncode for StdFee {
    fn encode_amino(&self, codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
        out.repeated_struct_field(codec, 1, self.amount.iter())?;
        out.uvarint_field(2, self.gas);
        Ok(())
    }
}

/// Signature over a sign document together with the signer's public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StdSignature {
    /// Compressed secp256k1 public key of the signer
    pub pub_key: PublicKey,
    /// Compact 64-byte `r || s` signature
    pub signature: Vec<u8>,
}

impl StdSignature {
    pub fn verify(&self, sign_bytes: &[u8]) -> bool {
        //! Check the signature against `sha256(sign_bytes)`.
        let Ok(signature) = Signature::from_compact(&self.signature) else {
            return false;
        };
        let Ok(message) = Message::from_slice(&sha256(sign_bytes)) else {
            return false;
        };
        Secp256k1::verification_only()
            .verify_ecdsa(&message, &signature, &self.pub_key)
            .is_ok()
    }
}

impl AminoEncode for StdSignature {
    fn encode_amino(&self, codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
        let key = self.pub_key.serialize();
        let mut body = AminoWriter::new();
        body.put_uvarint(key.len() as u64);
        body.put_raw(&key);
        out.interface_field(1, codec.prefix(PUBKEY_SECP256K1_NAME)?, body.as_slice());
        out.bytes_field(2, &self.signature);
        Ok(())
    }
}

/// Everything a signature commits to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StdSignMsg {
    /// Network identifier
    pub chain_id: String,
    /// On-chain account number of the signer
    pub account_number: u64,
    /// Replay-protection counter of the signer
    pub sequence: u64,
    /// Fee
    pub fee: StdFee,
    /// Messages, in order
    pub msgs: Vec<Msg>,
    /// Free-form note
    pub memo: String,
}

impl StdSignMsg {
    pub fn bytes(&self) -> Result<Vec<u8>, BuildError> {
        //! Canonical sign document.
        //!
        //! Integers are rendered as strings and keys are sorted at every
        //! level, so equal documents always produce identical bytes:
        //!
        //! ```text
        //! {"account_number":"5","chain_id":"okchain","fee":{"amount":[],"gas":"0"},
        //!  "memo":"...","msgs":[...],"sequence":"7"}
        //! ```
        let msgs = self
            .msgs
            .iter()
            .map(Msg::sign_value)
            .collect::<Result<Vec<_>, _>>()?;
        to_sorted_json(&serde_json::json!({
            "account_number": self.account_number.to_string(),
            "chain_id": self.chain_id,
            "fee": self.fee,
            "memo": self.memo,
            "msgs": msgs,
            "sequence": self.sequence.to_string(),
        }))
    }
}

/// Signed transaction, ready to be encoded and broadcast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StdTx {
    /// Messages, in order
    pub msgs: Vec<Msg>,
    /// Fee
    pub fee: StdFee,
    /// One signature per signer
    pub signatures: Vec<StdSignature>,
    /// Free-form note
    pub memo: String,
}

impl StdTx {
    pub fn validate_basic(&self) -> Result<(), Error> {
        //! Reject empty transactions, overlong memos and invalid messages.
        if self.msgs.is_empty() {
            return Err(BuildError::EmptyTransaction.into());
        }
        check_memo(&self.memo)?;
        for msg in &self.msgs {
            msg.validate_basic()?;
        }
        Ok(())
    }

    pub fn signers(&self) -> Vec<AccAddress> {
        //! Required signers: first appearance order, without duplicates.
        self.msgs.iter().flat_map(Msg::signers).unique().collect()
    }

    pub fn encode(&self, codec: &Codec) -> Result<Vec<u8>, BuildError> {
        //! Length-prefixed binary form, see [`Codec::encode_tx`].
        codec.encode_tx(self)
    }

    pub fn hash(&self, codec: &Codec) -> Result<String, BuildError> {
        //! Transaction hash as reported by the node: uppercase hex of
        //! `sha256(encoded bytes)`.
        Ok(encode_hex(sha256(self.encode(codec)?)).to_uppercase())
    }
}

impl AminoEncode for StdTx {
    fn encode_amino(&self, codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
        for msg in &self.msgs {
            let mut body = AminoWriter::new();
            msg.encode_amino(codec, &mut body)?;
            out.interface_field(1, codec.prefix(msg.type_name())?, body.as_slice());
        }
        out.struct_field(codec, 2, &self.fee)?;
        out.repeated_struct_field(codec, 3, self.signatures.iter())?;
        out.string_field(4, &self.memo);
        Ok(())
    }
}

pub(crate) fn check_memo(memo: &str) -> Result<(), ValidationError> {
    let len = memo.chars().count();
    if len > MAX_MEMO_CHARACTERS {
        Err(ValidationError::MemoTooLong {
            limit: MAX_MEMO_CHARACTERS,
            got: len,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coins::parse_coins;
    use crate::msgs::MsgSend;

    fn send() -> Msg {
        MsgSend::new(
            AccAddress::from([1; 20]),
            AccAddress::from([2; 20]),
            parse_coins("10.24okt").unwrap(),
        )
        .into()
    }

    #[test]
    fn test_sign_doc_layout() {
        let doc = StdSignMsg {
            chain_id: "okchain".to_string(),
            account_number: 5,
            sequence: 7,
            fee: StdFee::zero(),
            msgs: vec![send()],
            memo: "my memo".to_string(),
        };
        let text = String::from_utf8(doc.bytes().unwrap()).unwrap();
        assert!(text.starts_with(
            r#"{"account_number":"5","chain_id":"okchain","fee":{"amount":[],"gas":"0"},"memo":"my memo","msgs":[{"amount":"#
        ));
        assert!(text.ends_with(r#"}],"sequence":"7"}"#));
    }

    #[test]
    fn test_signers_are_deduplicated() {
        let tx = StdTx {
            msgs: vec![send(), send()],
            fee: StdFee::zero(),
            signatures: vec![],
            memo: String::new(),
        };
        assert_eq!(tx.signers(), vec![AccAddress::from([1; 20])]);
    }

    #[test]
    fn test_memo_limit() {
        assert!(check_memo(&"ы".repeat(MAX_MEMO_CHARACTERS)).is_ok());
        assert_eq!(
            check_memo(&"a".repeat(MAX_MEMO_CHARACTERS + 1)),
            Err(ValidationError::MemoTooLong {
                limit: MAX_MEMO_CHARACTERS,
                got: MAX_MEMO_CHARACTERS + 1
            })
        );
    }

    #[test]
    fn test_empty_tx_is_rejected() {
        let tx = StdTx {
            msgs: vec![],
            fee: StdFee::zero(),
            signatures: vec![],
            memo: String::new(),
        };
        assert_eq!(tx.validate_basic(), Err(BuildError::EmptyTransaction.into()));
    }
}
