//! Error taxonomy shared by every layer of the crate.
//!
//! Every public operation returns either a complete result or exactly one
//! [`Error`]. Nothing is retried or swallowed internally: a failed broadcast
//! is reported to the caller, who decides whether to re-submit with a freshly
//! fetched sequence number.

use crate::decimal::DecimalError;
use crate::keys::KeyError;
use crate::network::TransportError;

/// Malformed caller input, detected locally before any network work.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ValidationError {
    /// Address field is empty.
    EmptyAddress(&'static str),
    /// Address has the wrong byte length.
    InvalidAddressLength {
        /// Field name
        field: &'static str,
        /// Decoded length
        got: usize,
    },
    /// Address string does not match the bech32 format of the chain.
    InvalidAddress(String),
    /// Key name was not provided.
    EmptyKeyName,
    /// Passphrase was not provided.
    EmptyPassphrase,
    /// Product name was not provided.
    EmptyProduct,
    /// Product is not in `base_quote` form.
    MalformedProduct(String),
    /// Base and quote tokens are identical.
    IdenticalBaseQuote(String),
    /// Side is neither `BUY` nor `SELL`.
    InvalidSide(String),
    /// Amount-like field must be strictly positive.
    NonPositive(&'static str),
    /// Amount string cannot be parsed.
    InvalidAmount(String),
    /// Denomination does not match the allowed pattern.
    InvalidDenom(String),
    /// The same denomination appears twice in a coin list.
    DuplicateDenom(String),
    /// A list that must be non-empty is empty.
    EmptyList(&'static str),
    /// A list exceeds its size bound.
    TooManyItems {
        /// List name
        field: &'static str,
        /// Maximal allowed size
        limit: usize,
        /// Actual size
        got: usize,
    },
    /// Order id is empty.
    EmptyOrderId,
    /// The same order id appears twice.
    DuplicateOrderId(String),
    /// The same validator appears twice.
    DuplicateValidator(String),
    /// Validator description is empty.
    EmptyDescription,
    /// Validator moniker is empty.
    EmptyMoniker,
    /// Operator address of a new validator must belong to the delegator.
    ValidatorAddressMismatch,
    /// Account binds a proxy to itself.
    SelfProxy,
    /// Token symbol is empty or malformed.
    InvalidSymbol(String),
    /// Memo exceeds the length limit.
    MemoTooLong {
        /// Maximal allowed length in characters
        limit: usize,
        /// Actual length
        got: usize,
    },
    /// Consensus public key cannot be decoded.
    InvalidConsensusKey(String),
    /// Text input (e.g. a transfer list) cannot be parsed.
    Malformed(String),
}

impl std::error::Error for ValidationError {}
impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyAddress(field) => write!(f, "Address `{field}` cannot be empty"),
            Self::InvalidAddressLength { field, got } => {
                write!(f, "Address `{field}` must be 20 bytes long, got {got}")
            }
            Self::InvalidAddress(text) => write!(f, "Invalid address: {text}"),
            Self::EmptyKeyName => f.write_str("No key name input"),
            Self::EmptyPassphrase => f.write_str("No password input"),
            Self::EmptyProduct => f.write_str("Product cannot be empty"),
            Self::MalformedProduct(p) => {
                write!(f, "Product should be in the format of \"base_quote\", got \"{p}\"")
            }
            Self::IdenticalBaseQuote(p) => write!(f, "Invalid product \"{p}\": base equals quote"),
            Self::InvalidSide(side) => write!(
                f,
                "Side is expected to be \"BUY\" or \"SELL\", but got \"{side}\""
            ),
            Self::NonPositive(field) => write!(f, "`{field}` must be positive"),
            Self::InvalidAmount(text) => write!(f, "Invalid coin expression: {text}"),
            Self::InvalidDenom(denom) => write!(f, "Invalid denomination: {denom}"),
            Self::DuplicateDenom(denom) => write!(f, "Duplicate denomination: {denom}"),
            Self::EmptyList(field) => write!(f, "`{field}` cannot be empty"),
            Self::TooManyItems { field, limit, got } => write!(
                f,
                "Numbers of `{field}` should not be more than {limit}, got {got}"
            ),
            Self::EmptyOrderId => f.write_str("Order id cannot be empty"),
            Self::DuplicateOrderId(id) => write!(f, "Duplicate order id: {id}"),
            Self::DuplicateValidator(addr) => write!(f, "Duplicate validator: {addr}"),
            Self::EmptyDescription => f.write_str("Validator description cannot be empty"),
            Self::EmptyMoniker => f.write_str("Validator moniker cannot be empty"),
            Self::ValidatorAddressMismatch => {
                f.write_str("Validator address must be derived from the delegator address")
            }
            Self::SelfProxy => f.write_str("Cannot bind a proxy to itself"),
            Self::InvalidSymbol(symbol) => write!(f, "Invalid token symbol: {symbol}"),
            Self::MemoTooLong { limit, got } => {
                write!(f, "Memo is too long: {got} characters, limit is {limit}")
            }
            Self::InvalidConsensusKey(text) => write!(f, "Invalid consensus public key: {text}"),
            Self::Malformed(text) => write!(f, "Malformed input: {text}"),
        }
    }
}

/// Failure while assembling or serializing a transaction.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum BuildError {
    /// No messages provided
    EmptyTransaction,
    /// Account number was not set
    MissingAccountNumber,
    /// Sequence was not set
    MissingSequence,
    /// JSON serialization failed
    Serialization(String),
    /// A decimal field cannot be parsed
    Decimal(DecimalError),
    /// A type identifier is absent from the codec registry
    UnregisteredType(String),
    /// The signing key does not belong to the account required by the messages.
    SignerMismatch {
        /// Addresses required by the messages
        expected: Vec<String>,
        /// Address of the key that signed
        actual: String,
    },
}

impl std::error::Error for BuildError {}
impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTransaction => f.write_str(
                "Cannot build an empty transaction - make sure to add at least one message first.",
            ),
            Self::MissingAccountNumber => f.write_str("Account number must be provided"),
            Self::MissingSequence => f.write_str("Sequence must be provided"),
            Self::Serialization(text) => write!(f, "Failed to serialize transaction: {text}"),
            Self::Decimal(err) => write!(f, "Failed to parse decimal: {err}"),
            Self::UnregisteredType(name) => write!(f, "Type `{name}` is not registered in codec"),
            Self::SignerMismatch { expected, actual } => write!(
                f,
                "Transaction must be signed by [{}], but key belongs to {actual}",
                expected.join(", ")
            ),
        }
    }
}

impl From<DecimalError> for BuildError {
    fn from(value: DecimalError) -> Self {
        Self::Decimal(value)
    }
}
impl From<serde_json::Error> for BuildError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value.to_string())
    }
}

/// Any failure surfaced by this crate.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Malformed input
    Validation(ValidationError),
    /// Transaction assembly failure
    Build(BuildError),
    /// Key store rejected the request
    Key(KeyError),
    /// Node could not be reached or answered garbage
    Transport(TransportError),
    /// Node accepted the call but rejected the transaction
    RemoteRejection {
        /// ABCI result code
        code: u32,
        /// Module that produced the code
        codespace: String,
        /// Raw log supplied by the node
        log: String,
    },
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Build(e) => Some(e),
            Self::Key(e) => Some(e),
            Self::Transport(e) => Some(e),
            Self::RemoteRejection { .. } => None,
        }
    }
}
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "Validation failed: {e}"),
            Self::Build(e) => write!(f, "Build failed: {e}"),
            Self::Key(e) => write!(f, "Key error: {e}"),
            Self::Transport(e) => write!(f, "Transport error: {e}"),
            Self::RemoteRejection {
                code,
                codespace,
                log,
            } => {
                write!(f, "Transaction rejected with code {code}")?;
                if !codespace.is_empty() {
                    write!(f, " ({codespace})")?;
                }
                f.write_str(": ")?;
                f.write_str(log.strip_suffix('\n').unwrap_or(log))
            }
        }
    }
}

impl From<ValidationError> for Error {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}
impl From<BuildError> for Error {
    fn from(value: BuildError) -> Self {
        Self::Build(value)
    }
}
impl From<KeyError> for Error {
    fn from(value: KeyError) -> Self {
        Self::Key(value)
    }
}
impl From<TransportError> for Error {
    fn from(value: TransportError) -> Self {
        Self::Transport(value)
    }
}

/// Convenience alias for fallible operations of this crate.
pub type Result<T> = std::result::Result<T, Error>;
