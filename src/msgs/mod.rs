//! Message catalog: typed intents that can be placed into a transaction.
//!
//! Every payload type implements [`TypedMsg`], which ties it to a fixed,
//! versioned type identifier and describes how it is validated, who must
//! sign it and how its sign bytes are produced. [`Msg`] is the closed sum
//! over all of them.
//!
//! ```rust
//! use okchain_sdk::msgs::{Msg, MsgNewOrders, OrderItem, Side};
//! use okchain_sdk::AccAddress;
//!
//! let sender = AccAddress::from([1; 20]);
//! let item = OrderItem::new("xxb_okt", Side::Buy, "11.2".parse()?, "1.23".parse()?);
//! let msg: Msg = MsgNewOrders::single(sender, item).into();
//! assert_eq!(msg.type_name(), "okchain/order/MsgNew");
//! msg.validate_basic()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod order;
mod staking;
mod token;

pub use order::{MsgCancelOrders, MsgNewOrders, OrderItem, Side};
pub(crate) use order::{validate_order_ids, validate_product};
pub use staking::{
    Description, MsgBindProxy, MsgCreateValidator, MsgDelegate, MsgDestroyValidator,
    MsgEditValidator, MsgRegProxy, MsgUnbindProxy, MsgUndelegate, MsgUnjail, MsgVote,
    MAX_VOTED_VALIDATORS,
};
pub(crate) use staking::validate_validator_set;
pub use token::{MsgMint, MsgMultiSend, MsgSend};
pub(crate) use token::validate_transfers;

use serde::Serialize;

use crate::address::AccAddress;
use crate::amino::{AminoEncode, AminoWriter};
use crate::codec::{to_sorted_json, Codec};
use crate::error::{BuildError, ValidationError};

/// Maximal number of items in a batch message (orders, order ids, transfers).
pub const BATCH_LIMIT: usize = 200;

/// How a message is turned into JSON before signing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignEncoding {
    /// Fields only: `{"sender": ..., ...}`.
    Plain,
    /// Typed envelope: `{"type": <identifier>, "value": {...}}`.
    Typed,
}

/// Capabilities shared by all message payloads.
pub trait TypedMsg: Serialize + AminoEncode {
    /// Versioned type identifier registered in the [`Codec`].
    const TYPE_NAME: &'static str;
    /// Module handling the message on chain.
    const ROUTE: &'static str;
    /// Short action name.
    const TYPE: &'static str;
    /// Sign-bytes layout.
    const SIGN_ENCODING: SignEncoding = SignEncoding::Plain;

    /// Stateless sanity check.
    fn validate_basic(&self) -> Result<(), ValidationError>;

    /// Accounts that must sign, in a deterministic order.
    fn signers(&self) -> Vec<AccAddress>;
}

fn sign_value<T: TypedMsg>(msg: &T) -> Result<serde_json::Value, BuildError> {
    let value = serde_json::to_value(msg)?;
    Ok(match T::SIGN_ENCODING {
        SignEncoding::Plain => value,
        SignEncoding::Typed => serde_json::json!({ "type": T::TYPE_NAME, "value": value }),
    })
}

macro_rules! message_catalog {
    ($($(#[$meta:meta])* $variant:ident($ty:ty)),+ $(,)?) => {
        /// Any message understood by the chain.
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub enum Msg {
            $($(#[$meta])* $variant($ty)),+
        }

        /// Type identifiers of all messages, in catalog order.
        pub const REGISTERED_TYPES: &[&str] = &[$(<$ty as TypedMsg>::TYPE_NAME),+];

        impl Msg {
            pub const fn type_name(&self) -> &'static str {
                //! Versioned type identifier.
                match self {
                    $(Self::$variant(_) => <$ty as TypedMsg>::TYPE_NAME),+
                }
            }

            pub const fn route(&self) -> &'static str {
                //! Module that handles the message.
                match self {
                    $(Self::$variant(_) => <$ty as TypedMsg>::ROUTE),+
                }
            }

            pub const fn msg_type(&self) -> &'static str {
                //! Action name within the route.
                match self {
                    $(Self::$variant(_) => <$ty as TypedMsg>::TYPE),+
                }
            }

            pub fn validate_basic(&self) -> Result<(), ValidationError> {
                //! Stateless sanity check, see [`TypedMsg::validate_basic`].
                match self {
                    $(Self::$variant(m) => m.validate_basic()),+
                }
            }

            pub fn signers(&self) -> Vec<AccAddress> {
                //! Accounts that must sign this message.
                match self {
                    $(Self::$variant(m) => m.signers()),+
                }
            }

            pub(crate) fn sign_value(&self) -> Result<serde_json::Value, BuildError> {
                match self {
                    $(Self::$variant(m) => sign_value(m)),+
                }
            }
        }

        impl AminoEncode for Msg {
            fn encode_amino(&self, codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
                match self {
                    $(Self::$variant(m) => m.encode_amino(codec, out)),+
                }
            }
        }

        $(
            impl From<$ty> for Msg {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

message_catalog! {
    /// Token transfer
    Send(MsgSend),
    /// Transfer to several recipients
    MultiSend(MsgMultiSend),
    /// Token minting
    Mint(MsgMint),
    /// Batch of new orders
    NewOrders(MsgNewOrders),
    /// Batch of order cancellations
    CancelOrders(MsgCancelOrders),
    /// Stake delegation
    Delegate(MsgDelegate),
    /// Stake withdrawal
    Undelegate(MsgUndelegate),
    /// Vote for validators
    Vote(MsgVote),
    /// Validator creation
    CreateValidator(MsgCreateValidator),
    /// Validator description update
    EditValidator(MsgEditValidator),
    /// Validator removal
    DestroyValidator(MsgDestroyValidator),
    /// Validator release from jail
    Unjail(MsgUnjail),
    /// Proxy (un)registration
    RegisterProxy(MsgRegProxy),
    /// Binding to a proxy
    BindProxy(MsgBindProxy),
    /// Unbinding from a proxy
    UnbindProxy(MsgUnbindProxy),
}

impl Msg {
    pub fn sign_bytes(&self) -> Result<Vec<u8>, BuildError> {
        //! Canonical bytes of this message: sorted JSON.
        //!
        //! Equal messages always produce identical bytes, regardless of
        //! how they were constructed.
        to_sorted_json(&self.sign_value()?)
    }

    pub fn encode_binary(&self, codec: &Codec) -> Result<Vec<u8>, BuildError> {
        //! Prefixed binary form, as stored inside a transaction.
        codec.marshal_binary_bare(self.type_name(), self)
    }
}

pub(crate) fn check_batch_size(field: &'static str, len: usize) -> Result<(), ValidationError> {
    if len == 0 {
        Err(ValidationError::EmptyList(field))
    } else if len > BATCH_LIMIT {
        Err(ValidationError::TooManyItems {
            field,
            limit: BATCH_LIMIT,
            got: len,
        })
    } else {
        Ok(())
    }
}
