use serde::{Deserialize, Serialize};

use super::{check_batch_size, TypedMsg};
use crate::address::AccAddress;
use crate::amino::{AminoEncode, AminoWriter};
use crate::codec::Codec;
use crate::coins::{validate_denom, Coins, TransferUnit};
use crate::error::{BuildError, ValidationError};

/// Transfer coins from one account to another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSend {
    /// Sender
    pub from_address: AccAddress,
    /// Recipient
    pub to_address: AccAddress,
    /// Coins to transfer
    pub amount: Coins,
}

impl MsgSend {
    pub const fn new(from_address: AccAddress, to_address: AccAddress, amount: Coins) -> Self {
        //! Transfer of `amount` between two accounts.
        Self {
            from_address,
            to_address,
            amount,
        }
    }
}

impl TypedMsg for MsgSend {
    const TYPE_NAME: &'static str = "okchain/token/MsgTransfer";
    const ROUTE: &'static str = "token";
    const TYPE: &'static str = "send";

    fn validate_basic(&self) -> Result<(), ValidationError> {
        self.from_address.check("from_address")?;
        self.to_address.check("to_address")?;
        if self.amount.is_empty() {
            return Err(ValidationError::EmptyList("amount"));
        }
        self.amount.validate()
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![self.from_address.clone()]
    }
}

impl AminoEncode for MsgSend {
    fn encode_amino(&self, codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
        out.bytes_field(1, self.from_address.as_bytes());
        out.bytes_field(2, self.to_address.as_bytes());
        out.repeated_struct_field(codec, 3, self.amount.iter())
    }
}

/// Transfer coins from one account to many.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgMultiSend {
    /// Sender
    pub from: AccAddress,
    /// Transfer legs
    pub transfers: Vec<TransferUnit>,
}

impl MsgMultiSend {
    pub const fn new(from: AccAddress, transfers: Vec<TransferUnit>) -> Self {
        //! Transfer from one account to many.
        Self { from, transfers }
    }
}

impl TypedMsg for MsgMultiSend {
    const TYPE_NAME: &'static str = "okchain/token/MsgMultiTransfer";
    const ROUTE: &'static str = "token";
    const TYPE: &'static str = "multiSend";

    fn validate_basic(&self) -> Result<(), ValidationError> {
        self.from.check("from")?;
        validate_transfers(&self.transfers)
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![self.from.clone()]
    }
}

impl AminoEncode for MsgMultiSend {
    fn encode_amino(&self, codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
        out.bytes_field(1, self.from.as_bytes());
        out.repeated_struct_field(codec, 2, self.transfers.iter())
    }
}

pub(crate) fn validate_transfers(transfers: &[TransferUnit]) -> Result<(), ValidationError> {
    //! Every leg must carry strictly positive amounts.
    check_batch_size("transfers", transfers.len())?;
    transfers.iter().try_for_each(TransferUnit::validate)
}

/// Mint additional supply of an owned token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgMint {
    /// Token symbol
    pub symbol: String,
    /// Amount to mint, in whole tokens
    pub amount: i64,
    /// Token owner
    pub owner: AccAddress,
}

impl MsgMint {
    pub fn new<S: Into<String>>(symbol: S, amount: i64, owner: AccAddress) -> Self {
        //! Mint `amount` whole units of `symbol` to `owner`.
        Self {
            symbol: symbol.into(),
            amount,
            owner,
        }
    }
}

impl TypedMsg for MsgMint {
    const TYPE_NAME: &'static str = "okchain/token/MsgMint";
    const ROUTE: &'static str = "token";
    const TYPE: &'static str = "mint";

    fn validate_basic(&self) -> Result<(), ValidationError> {
        self.owner.check("owner")?;
        validate_denom(&self.symbol)
            .map_err(|_| ValidationError::InvalidSymbol(self.symbol.clone()))?;
        if self.amount <= 0 {
            return Err(ValidationError::NonPositive("amount"));
        }
        Ok(())
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![self.owner.clone()]
    }
}

impl AminoEncode for MsgMint {
    fn encode_amino(&self, _codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
        out.string_field(1, &self.symbol);
        out.varint_field(2, self.amount);
        out.bytes_field(3, self.owner.as_bytes());
        Ok(())
    }
}
