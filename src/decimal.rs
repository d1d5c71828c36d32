//! Fixed-point decimal used for prices, quantities and coin amounts.
//!
//! The chain stores decimals as integers scaled by `10^18`. Text form always
//! carries exactly 18 fractional digits (`"10.240000000000000000"`), so two
//! equal values never serialize differently.

use ethereum_types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Write as _;
use std::str::FromStr;

/// Number of fractional digits.
pub const PRECISION: usize = 18;

fn scale() -> U256 {
    U256::exp10(PRECISION)
}

/// Decimal parsing errors.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DecimalError {
    /// Empty input
    Empty,
    /// Missing integer or fractional part around the decimal point.
    InvalidLength(String),
    /// Non-digit character encountered.
    InvalidCharacter(String),
    /// More than [`PRECISION`] fractional digits.
    TooMuchPrecision(usize),
    /// Scaled magnitude does not fit into 256 bits.
    OutOfRange(String),
}

impl std::error::Error for DecimalError {}
impl std::fmt::Display for DecimalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("decimal string cannot be empty"),
            Self::InvalidLength(s) => write!(f, "invalid decimal length: {s}"),
            Self::InvalidCharacter(s) => write!(f, "invalid character in decimal: {s}"),
            Self::TooMuchPrecision(n) => write!(
                f,
                "too much precision: maximum {PRECISION} digits after the decimal point, got {n}"
            ),
            Self::OutOfRange(s) => write!(f, "decimal out of range: {s}"),
        }
    }
}

/// Signed decimal with 18 fractional digits.
///
/// Stored as sign and magnitude, the magnitude being the value times
/// `10^18` in a 256-bit unsigned integer. Zero is never negative.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Dec {
    negative: bool,
    abs: U256,
}

impl Dec {
    /// Zero value.
    pub const ZERO: Self = Self {
        negative: false,
        abs: U256([0; 4]),
    };

    fn new(negative: bool, abs: U256) -> Self {
        Self {
            negative: negative && !abs.is_zero(),
            abs,
        }
    }

    pub fn from_scaled(scaled: U256) -> Self {
        //! Create a non-negative value from its scaled integer
        //! representation (value times `10^18`).
        Self::new(false, scaled)
    }

    pub fn from_int(value: i64) -> Self {
        //! Create from a whole number.
        Self::new(value < 0, U256::from(value.unsigned_abs()) * scale())
    }

    pub const fn scaled_abs(&self) -> U256 {
        //! Magnitude of the scaled integer representation.
        self.abs
    }

    pub fn is_positive(&self) -> bool {
        //! Strictly greater than zero.
        !self.negative && !self.abs.is_zero()
    }

    pub const fn is_negative(&self) -> bool {
        //! Strictly less than zero.
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        //! Equal to zero.
        self.abs.is_zero()
    }

    pub fn to_amino_string(&self) -> String {
        //! Binary wire form: the scaled integer in base 10.
        if self.negative {
            format!("-{}", self.abs)
        } else {
            self.abs.to_string()
        }
    }
}

fn parse_digits(digits: &str, full: &str) -> Result<U256, DecimalError> {
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecimalError::InvalidCharacter(full.to_string()));
    }
    let ten = U256::from(10u64);
    digits
        .bytes()
        .try_fold(U256::zero(), |acc, b| {
            acc.checked_mul(ten)?
                .checked_add(U256::from(u64::from(b - b'0')))
        })
        .ok_or_else(|| DecimalError::OutOfRange(full.to_string()))
}

impl FromStr for Dec {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(DecimalError::Empty);
        }
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if body.is_empty() {
            return Err(DecimalError::Empty);
        }

        let mut parts = body.split('.');
        let whole = parts.next().unwrap_or_default();
        let fraction = parts.next();
        if parts.next().is_some() {
            return Err(DecimalError::InvalidCharacter(s.to_string()));
        }
        let fraction = match fraction {
            Some(frac) if frac.is_empty() || whole.is_empty() => {
                return Err(DecimalError::InvalidLength(s.to_string()))
            }
            Some(frac) => frac,
            None => "",
        };
        if fraction.len() > PRECISION {
            return Err(DecimalError::TooMuchPrecision(fraction.len()));
        }

        let whole = parse_digits(whole, s)?;
        // below 10^18, cannot overflow
        let fraction = parse_digits(fraction, s)? * U256::exp10(PRECISION - fraction.len());
        let abs = whole
            .checked_mul(scale())
            .and_then(|w| w.checked_add(fraction))
            .ok_or_else(|| DecimalError::OutOfRange(s.to_string()))?;
        Ok(Self::new(negative, abs))
    }
}

impl std::fmt::Display for Dec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (whole, fraction) = self.abs.div_mod(scale());
        let mut out = String::with_capacity(PRECISION + 8);
        if self.negative {
            out.push('-');
        }
        write!(
            out,
            "{}.{:0>width$}",
            whole,
            fraction.to_string(),
            width = PRECISION
        )?;
        f.write_str(&out)
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_and_format() {
        let cases = [
            ("0", "0.000000000000000000"),
            ("10.24", "10.240000000000000000"),
            ("1.230000", "1.230000000000000000"),
            ("0.000000000000000001", "0.000000000000000001"),
            ("-1.5", "-1.500000000000000000"),
            ("007", "7.000000000000000000"),
        ];
        for (input, expected) in cases {
            assert_eq!(input.parse::<Dec>().unwrap().to_string(), expected, "{input}");
        }
    }

    #[test]
    fn test_equal_values_format_equally() {
        let a: Dec = "11.2".parse().unwrap();
        let b: Dec = "11.200".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.to_amino_string(), "11200000000000000000");
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!("".parse::<Dec>(), Err(DecimalError::Empty));
        assert_eq!("-".parse::<Dec>(), Err(DecimalError::Empty));
        assert!(matches!(".5".parse::<Dec>(), Err(DecimalError::InvalidLength(_))));
        assert!(matches!("5.".parse::<Dec>(), Err(DecimalError::InvalidLength(_))));
        assert!(matches!("1.2.3".parse::<Dec>(), Err(DecimalError::InvalidCharacter(_))));
        assert!(matches!("1e5".parse::<Dec>(), Err(DecimalError::InvalidCharacter(_))));
        assert!(matches!("+1".parse::<Dec>(), Err(DecimalError::InvalidCharacter(_))));
        assert_eq!(
            "0.0000000000000000001".parse::<Dec>(),
            Err(DecimalError::TooMuchPrecision(19))
        );
        // 10^60 scaled by 10^18 exceeds 2^256
        let huge = format!("1{}", "0".repeat(60));
        assert!(matches!(huge.parse::<Dec>(), Err(DecimalError::OutOfRange(_))));
    }

    #[test]
    fn test_large_amounts() {
        let dec: Dec = "200000000000000000000".parse().unwrap();
        assert_eq!(dec.to_string(), "200000000000000000000.000000000000000000");
        assert_eq!(
            dec.to_amino_string(),
            "200000000000000000000000000000000000000"
        );
        assert!(dec.is_positive());

        // largest whole part that still fits: floor((2^256 - 1) / 10^18)
        let max_whole = (U256::MAX / scale()).to_string();
        let top: Dec = max_whole.parse().unwrap();
        assert_eq!(top.to_string(), format!("{max_whole}.000000000000000000"));
        let over = format!("{max_whole}.999999999999999999");
        assert!(matches!(over.parse::<Dec>(), Err(DecimalError::OutOfRange(_))));
    }

    #[test]
    fn test_sign_helpers() {
        assert!("0.1".parse::<Dec>().unwrap().is_positive());
        assert!(Dec::ZERO.is_zero());
        assert!(!Dec::ZERO.is_positive());
        assert!("-0.1".parse::<Dec>().unwrap().is_negative());
        assert!(!"-0".parse::<Dec>().unwrap().is_negative());
        assert_eq!("-0".parse::<Dec>().unwrap(), Dec::ZERO);
        assert_eq!(Dec::from_int(3).to_string(), "3.000000000000000000");
    }

    #[test]
    fn test_serde() {
        let dec: Dec = "2.5".parse().unwrap();
        assert_eq!(serde_json::to_string(&dec).unwrap(), "\"2.500000000000000000\"");
        let back: Dec = serde_json::from_str("\"2.5\"").unwrap();
        assert_eq!(back, dec);
    }
}
