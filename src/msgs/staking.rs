use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{SignEncoding, TypedMsg};
use crate::address::{AccAddress, ConsPubKey, ValAddress};
use crate::amino::{AminoEncode, AminoWriter};
use crate::codec::{Codec, PUBKEY_ED25519_NAME};
use crate::coins::Coin;
use crate::error::{BuildError, ValidationError};

/// Maximal number of validators a single vote may name.
pub const MAX_VOTED_VALIDATORS: usize = 30;

/// Public profile of a validator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    /// Display name
    pub moniker: String,
    /// Optional identity signature (e.g. keybase)
    pub identity: String,
    /// Optional website
    pub website: String,
    /// Optional free-form details
    pub details: String,
}

impl Description {
    pub fn new<S: Into<String>>(moniker: S) -> Self {
        //! Description with only a moniker set.
        Self {
            moniker: moniker.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        //! Whether every profile field is empty.
        self.moniker.is_empty()
            && self.identity.is_empty()
            && self.website.is_empty()
            && self.details.is_empty()
    }
}

impl AminoEncode for Description {
    fn encode_amino(&self, _codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
        out.string_field(1, &self.moniker);
        out.string_field(2, &self.identity);
        out.string_field(3, &self.website);
        out.string_field(4, &self.details);
        Ok(())
    }
}

macro_rules! delegation_msg {
    ($(#[$meta:meta])* $name:ident, $type_name:literal, $type:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            /// Delegating account
            pub delegator_address: AccAddress,
            /// Amount of staking token
            pub quantity: Coin,
        }

        impl $name {
            pub const fn new(delegator_address: AccAddress, quantity: Coin) -> Self {
                //! Message moving `quantity` for the delegator.
                Self {
                    delegator_address,
                    quantity,
                }
            }
        }

        impl TypedMsg for $name {
            const TYPE_NAME: &'static str = $type_name;
            const ROUTE: &'static str = "staking";
            const TYPE: &'static str = $type;
            const SIGN_ENCODING: SignEncoding = SignEncoding::Typed;

            fn validate_basic(&self) -> Result<(), ValidationError> {
                self.delegator_address.check("delegator_address")?;
                self.quantity.validate()
            }

            fn signers(&self) -> Vec<AccAddress> {
                vec![self.delegator_address.clone()]
            }
        }

        impl AminoEncode for $name {
            fn encode_amino(&self, codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
                out.bytes_field(1, self.delegator_address.as_bytes());
                out.struct_field(codec, 2, &self.quantity)
            }
        }
    };
}

delegation_msg! {
    /// Lock tokens as stake, gaining voting power.
    MsgDelegate, "okchain/staking/MsgDelegate", "delegate"
}

delegation_msg! {
    /// Withdraw previously delegated tokens.
    MsgUndelegate, "okchain/staking/MsgUnDelegate", "undelegate"
}

pub(crate) fn validate_validator_set(validators: &[ValAddress]) -> Result<(), ValidationError> {
    //! Between 1 and [`MAX_VOTED_VALIDATORS`] distinct validators.
    let count = validators.len();
    if count == 0 {
        return Err(ValidationError::EmptyList("validator_addresses"));
    }
    if count > MAX_VOTED_VALIDATORS {
        return Err(ValidationError::TooManyItems {
            field: "validator_addresses",
            limit: MAX_VOTED_VALIDATORS,
            got: count,
        });
    }
    for validator in validators {
        validator.check("validator_addresses")?;
    }
    match validators.iter().duplicates().next() {
        Some(dup) => Err(ValidationError::DuplicateValidator(dup.to_bech32())),
        None => Ok(()),
    }
}

/// Distribute the delegator's voting power across validators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgVote {
    /// Voting account
    pub delegator_address: AccAddress,
    /// Validators to vote for
    pub validator_addresses: Vec<ValAddress>,
}

impl MsgVote {
    pub const fn new(delegator_address: AccAddress, validator_addresses: Vec<ValAddress>) -> Self {
        //! Vote of the delegator for the given validators.
        Self {
            delegator_address,
            validator_addresses,
        }
    }
}

impl TypedMsg for MsgVote {
    const TYPE_NAME: &'static str = "okchain/staking/MsgVote";
    const ROUTE: &'static str = "staking";
    const TYPE: &'static str = "vote";
    const SIGN_ENCODING: SignEncoding = SignEncoding::Typed;

    fn validate_basic(&self) -> Result<(), ValidationError> {
        self.delegator_address.check("delegator_address")?;
        validate_validator_set(&self.validator_addresses)
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![self.delegator_address.clone()]
    }
}

impl AminoEncode for MsgVote {
    fn encode_amino(&self, _codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
        out.bytes_field(1, self.delegator_address.as_bytes());
        out.repeated_bytes_field(2, self.validator_addresses.iter().map(ValAddress::as_bytes));
        Ok(())
    }
}

/// Register a new validator operated by the delegator account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCreateValidator {
    /// Public profile
    pub description: Description,
    /// Minimal stake the operator commits to keep
    pub min_self_delegation: Coin,
    /// Operator account
    pub delegator_address: AccAddress,
    /// Operator address, same bytes as `delegator_address`
    pub validator_address: ValAddress,
    /// Consensus key of the validator node
    pub pubkey: ConsPubKey,
}

impl MsgCreateValidator {
    pub fn new(
        description: Description,
        min_self_delegation: Coin,
        delegator_address: AccAddress,
        pubkey: ConsPubKey,
    ) -> Self {
        //! Operator address is derived from the delegator account.
        let validator_address = ValAddress::from(&delegator_address);
        Self {
            description,
            min_self_delegation,
            delegator_address,
            validator_address,
            pubkey,
        }
    }
}

impl TypedMsg for MsgCreateValidator {
    const TYPE_NAME: &'static str = "okchain/staking/MsgCreateValidator";
    const ROUTE: &'static str = "staking";
    const TYPE: &'static str = "create_validator";
    const SIGN_ENCODING: SignEncoding = SignEncoding::Typed;

    fn validate_basic(&self) -> Result<(), ValidationError> {
        self.delegator_address.check("delegator_address")?;
        self.validator_address.check("validator_address")?;
        if self.delegator_address.as_bytes() != self.validator_address.as_bytes() {
            return Err(ValidationError::ValidatorAddressMismatch);
        }
        if self.description.moniker.is_empty() {
            return Err(ValidationError::EmptyMoniker);
        }
        self.min_self_delegation.validate()
    }

    fn signers(&self) -> Vec<AccAddress> {
        //! Delegator, then the operator account if it differs.
        let operator = AccAddress::from(&self.validator_address);
        if operator == self.delegator_address {
            vec![self.delegator_address.clone()]
        } else {
            vec![self.delegator_address.clone(), operator]
        }
    }
}

impl AminoEncode for MsgCreateValidator {
    fn encode_amino(&self, codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
        out.struct_field(codec, 1, &self.description)?;
        out.struct_field(codec, 2, &self.min_self_delegation)?;
        out.bytes_field(3, self.delegator_address.as_bytes());
        out.bytes_field(4, self.validator_address.as_bytes());
        let mut key = AminoWriter::new();
        key.put_uvarint(self.pubkey.0.len() as u64);
        key.put_raw(&self.pubkey.0);
        out.interface_field(5, codec.prefix(PUBKEY_ED25519_NAME)?, key.as_slice());
        Ok(())
    }
}

/// Update the public profile of a validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgEditValidator {
    /// New profile
    pub description: Description,
    /// Validator operator address
    pub address: ValAddress,
}

impl MsgEditValidator {
    pub const fn new(description: Description, address: ValAddress) -> Self {
        //! Profile update for the validator at `address`.
        Self {
            description,
            address,
        }
    }
}

impl TypedMsg for MsgEditValidator {
    const TYPE_NAME: &'static str = "okchain/staking/MsgEditValidator";
    const ROUTE: &'static str = "staking";
    const TYPE: &'static str = "edit_validator";
    const SIGN_ENCODING: SignEncoding = SignEncoding::Typed;

    fn validate_basic(&self) -> Result<(), ValidationError> {
        self.address.check("address")?;
        if self.description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        Ok(())
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![AccAddress::from(&self.address)]
    }
}

impl AminoEncode for MsgEditValidator {
    fn encode_amino(&self, codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
        out.struct_field(codec, 1, &self.description)?;
        out.bytes_field(2, self.address.as_bytes());
        Ok(())
    }
}

/// Retire the validator operated by the delegator account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgDestroyValidator {
    /// Operator account
    pub delegator_address: AccAddress,
}

impl MsgDestroyValidator {
    pub const fn new(delegator_address: AccAddress) -> Self {
        //! Retire the validator operated by the delegator.
        Self { delegator_address }
    }
}

impl TypedMsg for MsgDestroyValidator {
    const TYPE_NAME: &'static str = "okchain/staking/MsgDestroyValidator";
    const ROUTE: &'static str = "staking";
    const TYPE: &'static str = "destroy_validator";
    const SIGN_ENCODING: SignEncoding = SignEncoding::Typed;

    fn validate_basic(&self) -> Result<(), ValidationError> {
        self.delegator_address.check("delegator_address")
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![self.delegator_address.clone()]
    }
}

impl AminoEncode for MsgDestroyValidator {
    fn encode_amino(&self, _codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
        out.bytes_field(1, self.delegator_address.as_bytes());
        Ok(())
    }
}

/// Release a jailed validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUnjail {
    /// Validator operator address
    pub address: ValAddress,
}

impl MsgUnjail {
    pub const fn new(address: ValAddress) -> Self {
        //! Release the jailed validator at `address`.
        Self { address }
    }
}

impl TypedMsg for MsgUnjail {
    const TYPE_NAME: &'static str = "cosmos-sdk/MsgUnjail";
    const ROUTE: &'static str = "slashing";
    const TYPE: &'static str = "unjail";
    const SIGN_ENCODING: SignEncoding = SignEncoding::Typed;

    fn validate_basic(&self) -> Result<(), ValidationError> {
        self.address.check("address")
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![AccAddress::from(&self.address)]
    }
}

impl AminoEncode for MsgUnjail {
    fn encode_amino(&self, _codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
        out.bytes_field(1, self.address.as_bytes());
        Ok(())
    }
}

/// Register (`reg = true`) or unregister the account as a voting proxy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRegProxy {
    /// Proxy account
    pub proxy_address: AccAddress,
    /// Register when true, unregister otherwise
    pub reg: bool,
}

impl MsgRegProxy {
    pub const fn new(proxy_address: AccAddress, reg: bool) -> Self {
        //! Register (`reg = true`) or unregister a proxy.
        Self { proxy_address, reg }
    }
}

impl TypedMsg for MsgRegProxy {
    const TYPE_NAME: &'static str = "okchain/staking/MsgRegProxy";
    const ROUTE: &'static str = "staking";
    const TYPE: &'static str = "reg_or_unreg_proxy";
    const SIGN_ENCODING: SignEncoding = SignEncoding::Typed;

    fn validate_basic(&self) -> Result<(), ValidationError> {
        self.proxy_address.check("proxy_address")
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![self.proxy_address.clone()]
    }
}

impl AminoEncode for MsgRegProxy {
    fn encode_amino(&self, _codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
        out.bytes_field(1, self.proxy_address.as_bytes());
        out.bool_field(2, self.reg);
        Ok(())
    }
}

/// Delegate voting to a registered proxy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgBindProxy {
    /// Delegating account
    pub delegator_address: AccAddress,
    /// Proxy account
    pub proxy_address: AccAddress,
}

impl MsgBindProxy {
    pub const fn new(delegator_address: AccAddress, proxy_address: AccAddress) -> Self {
        //! Bind the delegator to `proxy_address`.
        Self {
            delegator_address,
            proxy_address,
        }
    }
}

impl TypedMsg for MsgBindProxy {
    const TYPE_NAME: &'static str = "okchain/staking/MsgBindProxy";
    const ROUTE: &'static str = "staking";
    const TYPE: &'static str = "bind_proxy";
    const SIGN_ENCODING: SignEncoding = SignEncoding::Typed;

    fn validate_basic(&self) -> Result<(), ValidationError> {
        self.delegator_address.check("delegator_address")?;
        self.proxy_address.check("proxy_address")?;
        if self.delegator_address == self.proxy_address {
            return Err(ValidationError::SelfProxy);
        }
        Ok(())
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![self.delegator_address.clone()]
    }
}

impl AminoEncode for MsgBindProxy {
    fn encode_amino(&self, _codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
        out.bytes_field(1, self.delegator_address.as_bytes());
        out.bytes_field(2, self.proxy_address.as_bytes());
        Ok(())
    }
}

/// Stop delegating voting to a proxy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUnbindProxy {
    /// Delegating account
    pub delegator_address: AccAddress,
}

impl MsgUnbindProxy {
    pub const fn new(delegator_address: AccAddress) -> Self {
        //! Detach the delegator from its proxy.
        Self { delegator_address }
    }
}

impl TypedMsg for MsgUnbindProxy {
    const TYPE_NAME: &'static str = "okchain/staking/MsgUnbindProxy";
    const ROUTE: &'static str = "staking";
    const TYPE: &'static str = "unbind_proxy";
    const SIGN_ENCODING: SignEncoding = SignEncoding::Typed;

    fn validate_basic(&self) -> Result<(), ValidationError> {
        self.delegator_address.check("delegator_address")
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![self.delegator_address.clone()]
    }
}

impl AminoEncode for MsgUnbindProxy {
    fn encode_amino(&self, _codec: &Codec, out: &mut AminoWriter) -> Result<(), BuildError> {
        out.bytes_field(1, self.delegator_address.as_bytes());
        Ok(())
    }
}
