//! OKChain addresses: bech32 wrappers over raw 20-byte account identifiers.

use crate::utils::{ripemd160, sha256};
use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};
pub use secp256k1::{PublicKey, SecretKey as PrivateKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{result::Result, str::FromStr};

/// Human-readable part of account addresses.
pub const ACCOUNT_HRP: &str = "okchain";
/// Human-readable part of validator operator addresses.
pub const VALIDATOR_HRP: &str = "okchainvaloper";
/// Human-readable part of validator consensus public keys.
pub const CONSENSUS_PUBKEY_HRP: &str = "okchainvalconspub";

/// Address parsing errors.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AddressValidationError {
    /// Bech32 decoding failed (bad charset, checksum or case).
    InvalidBech32(String),
    /// Decoded string carries an unexpected human-readable part.
    WrongPrefix {
        /// Expected prefix
        expected: &'static str,
        /// Actual prefix
        got: String,
    },
    /// Payload is not 20 bytes long.
    InvalidLength(usize),
}

impl std::error::Error for AddressValidationError {}
impl std::fmt::Display for AddressValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBech32(text) => write!(f, "Invalid bech32 string: {text}"),
            Self::WrongPrefix { expected, got } => {
                write!(f, "Invalid address prefix: expected {expected}, got {got}")
            }
            Self::InvalidLength(len) => write!(f, "Address must be 20 bytes long, got {len}"),
        }
    }
}

fn bech32_encode(hrp: &str, data: &[u8]) -> String {
    // Prefixes are compile-time constants and payloads are tiny,
    // so encoding cannot fail.
    bech32::encode::<Bech32>(Hrp::parse_unchecked(hrp), data).unwrap_or_default()
}

fn bech32_decode(s: &str, expected: &'static str) -> Result<Vec<u8>, AddressValidationError> {
    // Classic bech32 checksum only: bech32m strings are not addresses.
    let checked = CheckedHrpstring::new::<Bech32>(s)
        .map_err(|e| AddressValidationError::InvalidBech32(e.to_string()))?;
    let hrp = checked.hrp();
    if hrp.as_str() != expected {
        return Err(AddressValidationError::WrongPrefix {
            expected,
            got: hrp.to_string(),
        });
    }
    Ok(checked.byte_iter().collect())
}

macro_rules! bech32_address {
    ($(#[$meta:meta])* $name:ident, $hrp:expr) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Vec<u8>);

        impl $name {
            /// Size of a well-formed address in bytes.
            pub const WIDTH: usize = 20;
            /// Human-readable bech32 prefix.
            pub const HRP: &'static str = $hrp;

            pub fn from_bech32(s: &str) -> Result<Self, AddressValidationError> {
                //! Decode and check prefix and payload length.
                if s.is_empty() {
                    return Ok(Self::default());
                }
                let data = bech32_decode(s, Self::HRP)?;
                if data.len() != Self::WIDTH {
                    return Err(AddressValidationError::InvalidLength(data.len()));
                }
                Ok(Self(data))
            }

            pub fn to_bech32(&self) -> String {
                //! Encode with the human-readable prefix.
                //!
                //! Empty address is rendered as an empty string.
                if self.0.is_empty() {
                    String::new()
                } else {
                    bech32_encode(Self::HRP, &self.0)
                }
            }

            pub fn as_bytes(&self) -> &[u8] {
                //! Raw address bytes.
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                //! Whether no bytes are stored (the default value).
                self.0.is_empty()
            }

            pub(crate) fn check(
                &self,
                field: &'static str,
            ) -> Result<(), crate::error::ValidationError> {
                use crate::error::ValidationError;
                if self.0.is_empty() {
                    Err(ValidationError::EmptyAddress(field))
                } else if self.0.len() != Self::WIDTH {
                    Err(ValidationError::InvalidAddressLength {
                        field,
                        got: self.0.len(),
                    })
                } else {
                    Ok(())
                }
            }
        }

        impl From<[u8; 20]> for $name {
            fn from(value: [u8; 20]) -> Self {
                Self(value.to_vec())
            }
        }

        impl FromStr for $name {
            type Err = AddressValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_bech32(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.to_bech32())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_bech32())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                Self::from_bech32(&text).map_err(serde::de::Error::custom)
            }
        }
    };
}

bech32_address! {
    /// Account address (`okchain1...`).
    AccAddress, ACCOUNT_HRP
}

bech32_address! {
    /// Validator operator address (`okchainvaloper1...`).
    ///
    /// Shares the raw bytes with the operator's account address.
    ValAddress, VALIDATOR_HRP
}

impl From<&ValAddress> for AccAddress {
    fn from(value: &ValAddress) -> Self {
        Self(value.0.clone())
    }
}
impl From<&AccAddress> for ValAddress {
    fn from(value: &AccAddress) -> Self {
        Self(value.0.clone())
    }
}

/// A trait for objects that can generate an on-chain address.
pub trait AddressConvertible {
    /// Create an address
    fn address(&self) -> AccAddress;
}

impl AddressConvertible for PublicKey {
    fn address(&self) -> AccAddress {
        //! `ripemd160(sha256(compressed public key))`.
        AccAddress(ripemd160(&sha256(&self.serialize())).to_vec())
    }
}

/// Ed25519 consensus public key of a validator node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ConsPubKey(pub [u8; 32]);

impl ConsPubKey {
    /// Amino prefix of `tendermint/PubKeyEd25519` followed by the key length.
    const AMINO_PREFIX: [u8; 5] = [0x16, 0x24, 0xde, 0x64, 0x20];

    pub fn from_bech32(s: &str) -> Result<Self, AddressValidationError> {
        //! Decode an `okchainvalconspub1...` string.
        let data = bech32_decode(s, CONSENSUS_PUBKEY_HRP)?;
        data.strip_prefix(&Self::AMINO_PREFIX[..])
            .and_then(|key| <[u8; 32]>::try_from(key).ok())
            .map(Self)
            .ok_or(AddressValidationError::InvalidLength(data.len()))
    }

    pub fn to_bech32(&self) -> String {
        //! Encode amino-prefixed key bytes with the consensus prefix.
        let mut data = Self::AMINO_PREFIX.to_vec();
        data.extend_from_slice(&self.0);
        bech32_encode(CONSENSUS_PUBKEY_HRP, &data)
    }
}

impl FromStr for ConsPubKey {
    type Err = AddressValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bech32(s)
    }
}

impl Serialize for ConsPubKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_bech32())
    }
}

impl<'de> Deserialize<'de> for ConsPubKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_bech32(&text).map_err(serde::de::Error::custom)
    }
}
