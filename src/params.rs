//! Pre-flight checks for client operations.
//!
//! These run before any message is constructed, so a malformed request
//! fails before key lookup, signing or network access. They share their
//! predicates with [`TypedMsg::validate_basic`](crate::msgs::TypedMsg), so
//! both layers accept and reject exactly the same inputs.

use std::str::FromStr;

use crate::address::{AccAddress, ValAddress};
use crate::coins::TransferUnit;
use crate::error::ValidationError;
use crate::msgs::{
    check_batch_size, validate_order_ids, validate_product, validate_transfers,
    validate_validator_set, Side,
};

/// Length of a bech32 account address in characters.
pub const ACCOUNT_ADDRESS_LENGTH: usize = 46;

pub fn check_key_params(name: &str, passphrase: &str) -> Result<(), ValidationError> {
    //! Key name and passphrase must both be present.
    if name.is_empty() {
        Err(ValidationError::EmptyKeyName)
    } else if passphrase.is_empty() {
        Err(ValidationError::EmptyPassphrase)
    } else {
        Ok(())
    }
}

pub fn check_address(address: &str) -> Result<AccAddress, ValidationError> {
    //! Account address with the chain prefix and the fixed length.
    //!
    //! ```rust
    //! use okchain_sdk::params::check_address;
    //!
    //! assert!(check_address("okchain1g7c3nvac7mjgn2m9mqllgat8wwd3aptdqket5k").is_ok());
    //! assert!(check_address("cosmos1g7c3nvac7mjgn2m9mqllgat8wwd3aptdqket5k").is_err());
    //! ```
    if address.len() != ACCOUNT_ADDRESS_LENGTH || !address.starts_with(AccAddress::HRP) {
        return Err(ValidationError::InvalidAddress(address.to_string()));
    }
    AccAddress::from_str(address)
        .map_err(|e| ValidationError::InvalidAddress(format!("{address}: {e}")))
}

pub fn check_validator_address(address: &str) -> Result<ValAddress, ValidationError> {
    //! Operator address with the `okchainvaloper` prefix.
    if !address.starts_with(ValAddress::HRP) {
        return Err(ValidationError::InvalidAddress(address.to_string()));
    }
    ValAddress::from_str(address)
        .map_err(|e| ValidationError::InvalidAddress(format!("{address}: {e}")))
}

pub fn check_send_params(
    name: &str,
    passphrase: &str,
    to: &str,
) -> Result<AccAddress, ValidationError> {
    //! Credentials plus a well-formed recipient. Returns the recipient.
    check_key_params(name, passphrase)?;
    check_address(to)
}

pub fn check_new_order_params(
    name: &str,
    passphrase: &str,
    product: &str,
    side: &str,
) -> Result<Side, ValidationError> {
    //! Credentials, a `base_quote` product and a `BUY`/`SELL` side.
    check_key_params(name, passphrase)?;
    validate_product(product)?;
    Side::from_str(side)
}

pub fn check_new_orders_params<S: AsRef<str>>(
    name: &str,
    passphrase: &str,
    products: &[S],
    sides: &[S],
) -> Result<Vec<Side>, ValidationError> {
    //! Batch form of [`check_new_order_params`]: one side per product,
    //! within the batch limit.
    check_key_params(name, passphrase)?;
    if products.is_empty() {
        return Err(ValidationError::EmptyList("products"));
    }
    if products.len() != sides.len() {
        return Err(ValidationError::Malformed(format!(
            "{} products but {} sides",
            products.len(),
            sides.len()
        )));
    }
    check_batch_size("order_items", products.len())?;
    products
        .iter()
        .zip(sides)
        .map(|(product, side)| {
            validate_product(product.as_ref())?;
            Side::from_str(side.as_ref())
        })
        .collect()
}

pub fn check_cancel_orders_params<S: AsRef<str>>(
    name: &str,
    passphrase: &str,
    order_ids: &[S],
) -> Result<(), ValidationError> {
    //! Non-empty, duplicate-free order ids within the batch limit.
    check_key_params(name, passphrase)?;
    if order_ids.is_empty() {
        return Err(ValidationError::EmptyList("order_ids"));
    }
    validate_order_ids(order_ids)
}

pub fn check_vote_params<S: AsRef<str>>(
    name: &str,
    passphrase: &str,
    validators: &[S],
) -> Result<Vec<ValAddress>, ValidationError> {
    //! Between one and thirty distinct operator addresses.
    check_key_params(name, passphrase)?;
    let validators = validators
        .iter()
        .map(|v| check_validator_address(v.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    validate_validator_set(&validators)?;
    Ok(validators)
}

pub fn check_transfer_units_params(
    name: &str,
    passphrase: &str,
    transfers: &[TransferUnit],
) -> Result<(), ValidationError> {
    //! Every leg of a multi-send must carry a positive amount.
    check_key_params(name, passphrase)?;
    if transfers.is_empty() {
        return Err(ValidationError::EmptyList("transfers"));
    }
    validate_transfers(transfers)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::coins::{parse_coins, Coin};
    use crate::decimal::Dec;

    const ADDR: &str = "okchain1g7c3nvac7mjgn2m9mqllgat8wwd3aptdqket5k";

    #[test]
    fn test_key_params() {
        assert_eq!(check_key_params("", "pass"), Err(ValidationError::EmptyKeyName));
        assert_eq!(check_key_params("alice", ""), Err(ValidationError::EmptyPassphrase));
        assert!(check_key_params("alice", "pass").is_ok());
    }

    #[test]
    fn test_address_shape() {
        assert!(check_address(ADDR).is_ok());
        assert!(matches!(
            check_address(&ADDR[..45]),
            Err(ValidationError::InvalidAddress(_))
        ));
        // Right length and prefix, broken checksum.
        let mut broken = ADDR.to_string();
        broken.replace_range(45.., "j");
        assert!(matches!(
            check_address(&broken),
            Err(ValidationError::InvalidAddress(_))
        ));
        // Right length and prefix, bech32m checksum.
        assert!(matches!(
            check_address("okchain1qurswpc8qurswpc8qurswpc8qurswpc8y4dxnq"),
            Err(ValidationError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_send_params() {
        assert_eq!(
            check_send_params("alice", "pass", ADDR).unwrap().to_bech32(),
            ADDR
        );
        assert_eq!(
            check_send_params("alice", "", ADDR),
            Err(ValidationError::EmptyPassphrase)
        );
    }

    #[test]
    fn test_order_params() {
        assert_eq!(
            check_new_order_params("a", "p", "xxb_okt", "BUY"),
            Ok(Side::Buy)
        );
        assert_eq!(
            check_new_order_params("a", "p", "xxb_okt", "buy"),
            Err(ValidationError::InvalidSide("buy".to_string()))
        );
        assert_eq!(
            check_new_order_params("a", "p", "okt_okt", "SELL"),
            Err(ValidationError::IdenticalBaseQuote("okt_okt".to_string()))
        );
        assert_eq!(
            check_new_order_params("a", "p", "", "SELL"),
            Err(ValidationError::EmptyProduct)
        );
    }

    #[test]
    fn test_orders_batch_params() {
        assert_eq!(
            check_new_orders_params("a", "p", &["xxb_okt", "xxb_okt"], &["BUY", "SELL"]),
            Ok(vec![Side::Buy, Side::Sell])
        );
        assert!(matches!(
            check_new_orders_params("a", "p", &["xxb_okt"], &["BUY", "SELL"]),
            Err(ValidationError::Malformed(_))
        ));
        let products = vec!["xxb_okt"; 201];
        let sides = vec!["BUY"; 201];
        assert_eq!(
            check_new_orders_params("a", "p", &products, &sides),
            Err(ValidationError::TooManyItems {
                field: "order_items",
                limit: 200,
                got: 201
            })
        );
    }

    #[test]
    fn test_cancel_params() {
        assert!(check_cancel_orders_params("a", "p", &["ID1", "ID2"]).is_ok());
        assert_eq!(
            check_cancel_orders_params("a", "p", &["ID1", "ID1"]),
            Err(ValidationError::DuplicateOrderId("ID1".to_string()))
        );
        assert_eq!(
            check_cancel_orders_params::<&str>("a", "p", &[]),
            Err(ValidationError::EmptyList("order_ids"))
        );
    }

    #[test]
    fn test_vote_params() {
        let val = ValAddress::from([1; 20]).to_bech32();
        let other = ValAddress::from([2; 20]).to_bech32();
        assert_eq!(
            check_vote_params("a", "p", &[val.as_str(), other.as_str()])
                .unwrap()
                .len(),
            2
        );
        assert_eq!(
            check_vote_params::<&str>("a", "p", &[]),
            Err(ValidationError::EmptyList("validator_addresses"))
        );
        assert!(matches!(
            check_vote_params("a", "p", &[val.as_str(), val.as_str()]),
            Err(ValidationError::DuplicateValidator(_))
        ));
        assert!(matches!(
            check_vote_params("a", "p", &[ADDR]),
            Err(ValidationError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_transfer_units_params() {
        let to = AccAddress::from([2; 20]);
        let good = TransferUnit {
            to: to.clone(),
            coins: parse_coins("1okt").unwrap(),
        };
        assert!(check_transfer_units_params("a", "p", &[good.clone()]).is_ok());
        // Every leg is checked, not just the first one.
        let zero = TransferUnit::new(to, Coin::new("okt", Dec::ZERO).into());
        assert_eq!(
            check_transfer_units_params("a", "p", &[good, zero]),
            Err(ValidationError::NonPositive("amount"))
        );
    }
}
