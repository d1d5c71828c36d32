use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{check_batch_size, TypedMsg};
use crate::address::AccAddress;
use crate::amino::{AminoEncode, AminoWriter};
use crate::codec::Codec;
use crate::decimal::Dec;
use crate::error::{BuildError, Error, ValidationError};

/// Order direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy base token for quote token
    Buy,
    /// Sell base token for quote token
    Sell,
}

impl Side {
    pub const fn as_str(&self) -> &'static str {
        //! Wire name: `BUY` or `SELL`.
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl FromStr for Side {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            other => Err(ValidationError::InvalidSide(other.to_string())),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single limit order inside [`MsgNewOrders`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Trading pair, `base_quote`
    pub product: String,
    /// Direction
    pub side: Side,
    /// Limit price in quote token
    pub price: Dec,
    /// Amount of base token
    pub quantity: Dec,
}

impl OrderItem {
    pub fn new<S: Into<String>>(product: S, side: Side, price: Dec, quantity: Dec) -> Self {
        //! Order item from already parsed parts.
        Self {
            product: product.into(),
            side,
            price,
            quantity,
        }
    }

    pub fn parse(product: &str, side: &str, price: &str, quantity: &str) -> Result<Self, Error> {
        //! Build an order item from textual parameters.
        //!
        //! ```rust
        //! use okchain_sdk::msgs::{OrderItem, Side};
        //!
        //! let item = OrderItem::parse("xxb_okt", "SELL", "0.1", "2")?;
        //! assert_eq!(item.side, Side::Sell);
        //! assert_eq!(item.price.to_string(), "0.100000000000000000");
        //! # Ok::<(), okchain_sdk::Error>(())
        //! ```
        let side = side.parse::<Side>()?;
        let price = price.parse::<Dec>().map_err(BuildError::from)?;
        let quantity = quantity.parse::<Dec>().map_err(BuildError::from)?;
        Ok(Self::new(product, side, price, quantity))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        //! Check product, price and quantity.
        validate_product(&self.product)?;
        if !self.price.is_positive() {
            return Err(ValidationError::NonPositive("price"));
        }
        if !self.quantity.is_positive() {
            return Err(ValidationError::NonPositive("quantity"));
        }
        Ok(())
    }
}

impl AminoEncode for OrderItem {
    fn encode_amino(&self, _codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
        out.string_field(1, &self.product);
        out.string_field(2, self.side.as_str());
        out.string_field(3, &self.price.to_amino_string());
        out.string_field(4, &self.quantity.to_amino_string());
        Ok(())
    }
}

pub(crate) fn validate_product(product: &str) -> Result<(), ValidationError> {
    //! `base_quote` with two distinct non-empty tokens.
    if product.is_empty() {
        return Err(ValidationError::EmptyProduct);
    }
    match product.split('_').collect_tuple() {
        Some((base, quote)) if !base.is_empty() && !quote.is_empty() => {
            if base == quote {
                Err(ValidationError::IdenticalBaseQuote(product.to_string()))
            } else {
                Ok(())
            }
        }
        _ => Err(ValidationError::MalformedProduct(product.to_string())),
    }
}

pub(crate) fn validate_order_ids<S: AsRef<str>>(ids: &[S]) -> Result<(), ValidationError> {
    check_batch_size("order_ids", ids.len())?;
    if ids.iter().any(|id| id.as_ref().is_empty()) {
        return Err(ValidationError::EmptyOrderId);
    }
    match ids.iter().map(AsRef::as_ref).duplicates().next() {
        Some(dup) => Err(ValidationError::DuplicateOrderId(dup.to_string())),
        None => Ok(()),
    }
}

/// Place one or more limit orders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgNewOrders {
    /// Order owner
    pub sender: AccAddress,
    /// Orders to place
    pub order_items: Vec<OrderItem>,
}

impl MsgNewOrders {
    pub const fn new(sender: AccAddress, order_items: Vec<OrderItem>) -> Self {
        //! Batch of orders placed by `sender`.
        Self {
            sender,
            order_items,
        }
    }

    pub fn single(sender: AccAddress, item: OrderItem) -> Self {
        //! Message placing exactly one order.
        Self::new(sender, vec![item])
    }
}

impl TypedMsg for MsgNewOrders {
    const TYPE_NAME: &'static str = "okchain/order/MsgNew";
    const ROUTE: &'static str = "order";
    const TYPE: &'static str = "new";

    fn validate_basic(&self) -> Result<(), ValidationError> {
        //! Identical items are allowed: they are distinct orders on chain.
        self.sender.check("sender")?;
        check_batch_size("order_items", self.order_items.len())?;
        self.order_items.iter().try_for_each(OrderItem::validate)
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![self.sender.clone()]
    }
}

impl AminoEncode for MsgNewOrders {
    fn encode_amino(&self, codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
        out.bytes_field(1, self.sender.as_bytes());
        out.repeated_struct_field(codec, 2, self.order_items.iter())
    }
}

/// Cancel one or more open orders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCancelOrders {
    /// Order owner
    pub sender: AccAddress,
    /// Ids of orders to cancel
    pub order_ids: Vec<String>,
}

impl MsgCancelOrders {
    pub const fn new(sender: AccAddress, order_ids: Vec<String>) -> Self {
        //! Batch of cancellations issued by `sender`.
        Self { sender, order_ids }
    }

    pub fn single<S: Into<String>>(sender: AccAddress, order_id: S) -> Self {
        //! Message cancelling exactly one order.
        Self::new(sender, vec![order_id.into()])
    }
}

impl TypedMsg for MsgCancelOrders {
    const TYPE_NAME: &'static str = "okchain/order/MsgCancel";
    const ROUTE: &'static str = "order";
    const TYPE: &'static str = "cancel";

    fn validate_basic(&self) -> Result<(), ValidationError> {
        self.sender.check("sender")?;
        validate_order_ids(&self.order_ids)
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![self.sender.clone()]
    }
}

impl AminoEncode for MsgCancelOrders {
    fn encode_amino(&self, _codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
        out.bytes_field(1, self.sender.as_bytes());
        out.repeated_bytes_field(2, self.order_ids.iter().map(String::as_bytes));
        Ok(())
    }
}
