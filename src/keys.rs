//! Key management: HD derivation of account keys and an in-memory keybase.
//!
//! Account keys are derived from a BIP-39 mnemonic along
//! [`FULL_FUNDRAISER_PATH`]. The [`Keybase`] stores them under a name and
//! guards every use with a passphrase; the passphrase itself is never kept,
//! only its salted digest.
//!
//! Signing is exposed through the [`Signer`] trait so that other key stores
//! (hardware wallets, remote signers) can be plugged into
//! [`TxBuilder`](crate::transaction_builder::TxBuilder).

use std::collections::HashMap;
use std::str::FromStr;

pub use bip39::{Language, Mnemonic, MnemonicType};
use bip32::{DerivationPath, ExtendedPrivateKey};
use parking_lot::RwLock;
use secp256k1::{Message, Secp256k1};
use tracing::debug;

use crate::address::{AccAddress, AddressConvertible, PrivateKey, PublicKey};
use crate::error::Error;
use crate::params::check_key_params;
use crate::utils::{decode_hex, sha256};

/// Default HD derivation path for OKChain accounts.
pub const FULL_FUNDRAISER_PATH: &str = "m/44'/118'/0'/0/0";

/// Key store failures.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum KeyError {
    /// No key with this name
    NotFound(String),
    /// A key with this name already exists
    AlreadyExists(String),
    /// Passphrase does not match
    Authentication,
    /// Mnemonic phrase cannot be parsed
    Mnemonic(String),
    /// HD derivation or private key import failed
    Derivation(String),
    /// Signing failed
    Signing(String),
}

impl std::error::Error for KeyError {}
impl std::fmt::Display for KeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "Key \"{name}\" not found"),
            Self::AlreadyExists(name) => write!(f, "Key \"{name}\" already exists"),
            Self::Authentication => f.write_str("Invalid passphrase"),
            Self::Mnemonic(text) => write!(f, "Invalid mnemonic: {text}"),
            Self::Derivation(text) => write!(f, "Key derivation failed: {text}"),
            Self::Signing(text) => write!(f, "Signing failed: {text}"),
        }
    }
}

/// Public view of a stored key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyInfo {
    /// Local name
    pub name: String,
    /// Compressed public key
    pub pub_key: PublicKey,
    /// Account address derived from the public key
    pub address: AccAddress,
}

/// Anything able to produce signatures for a named key.
pub trait Signer {
    /// Sign `sha256(msg)` with the key `name`, returning its public key and
    /// the 64-byte compact signature.
    fn sign(
        &self,
        name: &str,
        passphrase: &str,
        msg: &[u8],
    ) -> Result<(PublicKey, Vec<u8>), KeyError>;
}

/// Read access to stored key metadata.
pub trait KeyLookup {
    /// Public information about the key `name`.
    fn key_info(&self, name: &str) -> Result<KeyInfo, KeyError>;
}

pub fn derive_private_key(mnemonic: &Mnemonic, path: &str) -> Result<PrivateKey, KeyError> {
    //! Derive a private key from mnemonic (empty BIP-39 password) along `path`.
    let path =
        DerivationPath::from_str(path).map_err(|e| KeyError::Derivation(e.to_string()))?;
    let seed = bip39::Seed::new(mnemonic, "");
    ExtendedPrivateKey::<PrivateKey>::derive_from_path(seed, &path)
        .map(|key| *key.private_key())
        .map_err(|e| KeyError::Derivation(e.to_string()))
}

pub fn sign_bytes_with(private_key: &PrivateKey, msg: &[u8]) -> Result<Vec<u8>, KeyError> {
    //! Compact secp256k1 signature of `sha256(msg)`.
    let digest =
        Message::from_slice(&sha256(msg)).map_err(|e| KeyError::Signing(e.to_string()))?;
    let signature = Secp256k1::signing_only().sign_ecdsa(&digest, private_key);
    Ok(signature.serialize_compact().to_vec())
}

struct StoredKey {
    private_key: PrivateKey,
    pub_key: PublicKey,
    passphrase_digest: [u8; 32],
}

impl StoredKey {
    fn new(name: &str, private_key: PrivateKey, passphrase: &str) -> Self {
        let pub_key = private_key.public_key(&Secp256k1::signing_only());
        Self {
            private_key,
            pub_key,
            passphrase_digest: passphrase_digest(name, passphrase),
        }
    }

    fn info(&self, name: &str) -> KeyInfo {
        KeyInfo {
            name: name.to_string(),
            pub_key: self.pub_key,
            address: self.pub_key.address(),
        }
    }

    fn unlock(&self, name: &str, passphrase: &str) -> Result<&PrivateKey, KeyError> {
        if passphrase_digest(name, passphrase) == self.passphrase_digest {
            Ok(&self.private_key)
        } else {
            Err(KeyError::Authentication)
        }
    }
}

fn passphrase_digest(name: &str, passphrase: &str) -> [u8; 32] {
    sha256([name.as_bytes(), &[0u8][..], passphrase.as_bytes()].concat())
}

/// Thread-safe in-memory key store.
///
/// ```rust
/// use okchain_sdk::keys::{Keybase, KeyLookup};
///
/// let keybase = Keybase::new();
/// let info = keybase.create_account_with_mnemonic(
///     "total lottery arena when pudding best candy until army spoil drill pool",
///     "alice",
///     "12345678",
/// )?;
/// assert_eq!(
///     info.address.to_string(),
///     "okchain152p8xmejhza7wuhhzut88vkakdgasqwlw2qjcf"
/// );
/// assert_eq!(keybase.key_info("alice")?, info);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Default)]
pub struct Keybase {
    keys: RwLock<HashMap<String, StoredKey>>,
}

impl std::fmt::Debug for Keybase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys = self.keys.read();
        f.debug_struct("Keybase")
            .field("names", &keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Keybase {
    pub fn new() -> Self {
        //! Empty key store.
        Self::default()
    }

    pub fn generate_mnemonic() -> String {
        //! Fresh random 24-word English mnemonic.
        Mnemonic::new(MnemonicType::Words24, Language::English).into_phrase()
    }

    pub fn create_account_with_mnemonic(
        &self,
        mnemonic: &str,
        name: &str,
        passphrase: &str,
    ) -> Result<KeyInfo, Error> {
        //! Derive the account key from `mnemonic` and store it as `name`.
        check_key_params(name, passphrase)?;
        let mnemonic = Mnemonic::from_phrase(mnemonic, Language::English)
            .map_err(|e| KeyError::Mnemonic(e.to_string()))?;
        let private_key = derive_private_key(&mnemonic, FULL_FUNDRAISER_PATH)?;
        Ok(self.insert(name, private_key, passphrase)?)
    }

    pub fn import_private_key(
        &self,
        private_key_hex: &str,
        name: &str,
        passphrase: &str,
    ) -> Result<KeyInfo, Error> {
        //! Store a raw hex-encoded secp256k1 private key as `name`.
        check_key_params(name, passphrase)?;
        let bytes = decode_hex(private_key_hex).map_err(|e| KeyError::Derivation(e.to_string()))?;
        let private_key =
            PrivateKey::from_slice(&bytes).map_err(|e| KeyError::Derivation(e.to_string()))?;
        Ok(self.insert(name, private_key, passphrase)?)
    }

    fn insert(
        &self,
        name: &str,
        private_key: PrivateKey,
        passphrase: &str,
    ) -> Result<KeyInfo, KeyError> {
        let mut keys = self.keys.write();
        if keys.contains_key(name) {
            return Err(KeyError::AlreadyExists(name.to_string()));
        }
        let key = StoredKey::new(name, private_key, passphrase);
        let info = key.info(name);
        keys.insert(name.to_string(), key);
        debug!(name, address = %info.address, "stored key");
        Ok(info)
    }

    pub fn delete(&self, name: &str, passphrase: &str) -> Result<(), KeyError> {
        //! Remove a key, provided the passphrase matches.
        let mut keys = self.keys.write();
        let key = keys
            .get(name)
            .ok_or_else(|| KeyError::NotFound(name.to_string()))?;
        key.unlock(name, passphrase)?;
        keys.remove(name);
        debug!(name, "deleted key");
        Ok(())
    }

    pub fn list(&self) -> Vec<KeyInfo> {
        //! All stored keys, sorted by name.
        let keys = self.keys.read();
        let mut infos: Vec<_> = keys.iter().map(|(name, key)| key.info(name)).collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }
}

impl KeyLookup for Keybase {
    fn key_info(&self, name: &str) -> Result<KeyInfo, KeyError> {
        self.keys
            .read()
            .get(name)
            .map(|key| key.info(name))
            .ok_or_else(|| KeyError::NotFound(name.to_string()))
    }
}

impl Signer for Keybase {
    fn sign(
        &self,
        name: &str,
        passphrase: &str,
        msg: &[u8],
    ) -> Result<(PublicKey, Vec<u8>), KeyError> {
        let keys = self.keys.read();
        let key = keys
            .get(name)
            .ok_or_else(|| KeyError::NotFound(name.to_string()))?;
        let signature = sign_bytes_with(key.unlock(name, passphrase)?, msg)?;
        Ok((key.pub_key, signature))
    }
}
