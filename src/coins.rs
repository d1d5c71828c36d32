//! Coin amounts and the textual amount format `<decimal><denom>[,<decimal><denom>...]`.

use crate::address::AccAddress;
use crate::amino::{AminoEncode, AminoWriter};
use crate::codec::Codec;
use crate::decimal::Dec;
use crate::error::{BuildError, ValidationError};
use serde::{Deserialize, Serialize};

/// A single amount of a single denomination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    /// Denomination (lowercase token symbol)
    pub denom: String,
    /// Amount
    pub amount: Dec,
}

impl Coin {
    pub fn new<S: Into<String>>(denom: S, amount: Dec) -> Self {
        //! Coin of `amount` units of `denom`, not validated.
        Self {
            denom: denom.into(),
            amount,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        //! Denomination must be well-formed and amount strictly positive.
        validate_denom(&self.denom)?;
        if !self.amount.is_positive() {
            return Err(ValidationError::NonPositive("amount"));
        }
        Ok(())
    }
}

impl AminoEncode for Coin {
    fn encode_amino(&self, _codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
        out.string_field(1, &self.denom);
        out.string_field(2, &self.amount.to_amino_string());
        Ok(())
    }
}

/// Sorted list of coins with distinct denominations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coins(Vec<Coin>);

impl Coins {
    pub fn new(mut coins: Vec<Coin>) -> Result<Self, ValidationError> {
        //! Sort by denomination and validate every entry.
        coins.sort_by(|a, b| a.denom.cmp(&b.denom));
        let coins = Self(coins);
        coins.validate()?;
        Ok(coins)
    }

    pub const fn empty() -> Self {
        //! No coins.
        Self(Vec::new())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        //! Entries must be valid, sorted and free of duplicate denominations.
        for coin in &self.0 {
            coin.validate()?;
        }
        for pair in self.0.windows(2) {
            if pair[0].denom == pair[1].denom {
                return Err(ValidationError::DuplicateDenom(pair[0].denom.clone()));
            }
            if pair[0].denom > pair[1].denom {
                return Err(ValidationError::InvalidAmount(format!(
                    "coins are not sorted: {} after {}",
                    pair[1].denom, pair[0].denom
                )));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        //! Whether there are no coins.
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        //! Number of distinct denominations.
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coin> {
        //! Iterate in denomination order.
        self.0.iter()
    }
}

impl From<Coin> for Coins {
    fn from(value: Coin) -> Self {
        Self(vec![value])
    }
}

impl<'a> IntoIterator for &'a Coins {
    type Item = &'a Coin;
    type IntoIter = std::slice::Iter<'a, Coin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

pub(crate) fn validate_denom(denom: &str) -> Result<(), ValidationError> {
    //! `[a-z][a-z0-9]{0,5}(-[a-z0-9]{3})?`
    let invalid = || ValidationError::InvalidDenom(denom.to_string());
    let (symbol, suffix) = match denom.split_once('-') {
        Some((symbol, suffix)) => (symbol, Some(suffix)),
        None => (denom, None),
    };
    let lower_alnum = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    let mut bytes = symbol.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return Err(invalid()),
    }
    if symbol.len() > 6 || !bytes.all(lower_alnum) {
        return Err(invalid());
    }
    if let Some(suffix) = suffix {
        if suffix.len() != 3 || !suffix.bytes().all(lower_alnum) {
            return Err(invalid());
        }
    }
    Ok(())
}

pub fn parse_coin(text: &str) -> Result<Coin, ValidationError> {
    //! Parse a single `<decimal><denom>` expression, e.g. `10.24okt`.
    //!
    //! Whitespace is allowed between amount and denomination.
    let text = text.trim();
    let split = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .ok_or_else(|| ValidationError::InvalidAmount(text.to_string()))?;
    let (amount, denom) = text.split_at(split);
    let denom = denom.trim_start();
    if amount.is_empty() || denom.is_empty() {
        return Err(ValidationError::InvalidAmount(text.to_string()));
    }
    let amount: Dec = amount
        .parse()
        .map_err(|e| ValidationError::InvalidAmount(format!("{text}: {e}")))?;
    validate_denom(denom)?;
    Ok(Coin::new(denom, amount))
}

pub fn parse_coins(text: &str) -> Result<Coins, ValidationError> {
    //! Parse comma-separated coins, sorting them for determinism.
    //!
    //! Empty input yields an empty list.
    let text = text.trim();
    if text.is_empty() {
        return Ok(Coins::empty());
    }
    let coins = text
        .split(',')
        .map(parse_coin)
        .collect::<Result<Vec<_>, _>>()?;
    Coins::new(coins)
}

/// One leg of a multi-send: recipient and the coins they receive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferUnit {
    /// Recipient
    pub to: AccAddress,
    /// Coins to transfer
    pub coins: Coins,
}

impl TransferUnit {
    pub const fn new(to: AccAddress, coins: Coins) -> Self {
        //! Transfer leg paying `coins` to `to`.
        Self { to, coins }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        //! Recipient must be set and every amount positive.
        self.to.check("to")?;
        if self.coins.is_empty() {
            return Err(ValidationError::EmptyList("coins"));
        }
        self.coins.validate()
    }
}

impl AminoEncode for TransferUnit {
    fn encode_amino(&self, codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
        out.bytes_field(1, self.to.as_bytes());
        out.repeated_struct_field(codec, 2, self.coins.iter())
    }
}

pub fn parse_transfers(text: &str) -> Result<Vec<TransferUnit>, ValidationError> {
    //! Parse one `<address> <coins>` pair per line:
    //!
    //! ```text
    //! okchain1... 1okt
    //! okchain1... 2okt,1.5btc
    //! ```
    text.trim()
        .lines()
        .map(|line| {
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(addr), Some(coins), None) => {
                    let to = addr
                        .parse()
                        .map_err(|e| ValidationError::InvalidAddress(format!("{addr}: {e}")))?;
                    Ok(TransferUnit::new(to, parse_coins(coins)?))
                }
                _ => Err(ValidationError::Malformed(format!(
                    "expected `<address> <coins>`, got `{line}`"
                ))),
            }
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_coin() {
        let coin = parse_coin("10.24okt").unwrap();
        assert_eq!(coin.denom, "okt");
        assert_eq!(coin.amount.to_string(), "10.240000000000000000");
        assert_eq!(parse_coin(" 1 btc-a1b ").unwrap().denom, "btc-a1b");

        let supply = parse_coins("200000000000000000000okt").unwrap();
        assert_eq!(
            supply.iter().next().unwrap().amount.to_amino_string(),
            "200000000000000000000000000000000000000"
        );
    }

    #[test]
    fn test_parse_coin_rejects() {
        for bad in ["", "okt", "10", "10OKT", "10.2.4okt", "1.5toolongname", "1xxb-ab"] {
            assert!(parse_coin(bad).is_err(), "{bad} must be rejected");
        }
    }

    #[test]
    fn test_parse_coins_sorts() {
        let coins = parse_coins("2okt,1.5btc").unwrap();
        let denoms: Vec<_> = coins.iter().map(|c| c.denom.as_str()).collect();
        assert_eq!(denoms, vec!["btc", "okt"]);
        assert_eq!(
            serde_json::to_string(&coins).unwrap(),
            r#"[{"denom":"btc","amount":"1.500000000000000000"},{"denom":"okt","amount":"2.000000000000000000"}]"#
        );
    }

    #[test]
    fn test_parse_coins_rejects_duplicates_and_zero() {
        assert_eq!(
            parse_coins("1okt,2okt"),
            Err(ValidationError::DuplicateDenom("okt".to_string()))
        );
        assert_eq!(
            parse_coins("0okt"),
            Err(ValidationError::NonPositive("amount"))
        );
        assert_eq!(parse_coins("  "), Ok(Coins::empty()));
    }

    #[test]
    fn test_validate_denom() {
        for good in ["okt", "a", "abcdef", "xxb-a1b", "t0"] {
            assert!(validate_denom(good).is_ok(), "{good}");
        }
        for bad in ["", "1ok", "abcdefg", "OKT", "okt-", "okt-abcd", "okt-a_b"] {
            assert!(validate_denom(bad).is_err(), "{bad}");
        }
    }
}
