use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

pub fn sha256<S: AsRef<[u8]>>(bytes: S) -> [u8; 32] {
    //! Compute sha256 hash.
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(bytes.as_ref()));
    out
}

pub fn ripemd160<S: AsRef<[u8]>>(bytes: S) -> [u8; 20] {
    //! Compute ripemd160 hash.
    let mut out = [0u8; 20];
    out.copy_from_slice(&Ripemd160::digest(bytes.as_ref()));
    out
}

pub fn decode_hex(hex: &str) -> Result<Vec<u8>, rustc_hex::FromHexError> {
    //! Decode a hex string, with or without `0x` prefix.
    use rustc_hex::FromHex;
    hex.strip_prefix("0x").unwrap_or(hex).from_hex()
}

pub fn encode_hex<S: AsRef<[u8]>>(bytes: S) -> String {
    //! Encode bytes as a lowercase hex string without prefix.
    use rustc_hex::ToHex;
    bytes.as_ref().to_hex::<String>()
}
