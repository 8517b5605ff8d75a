//! Address - Canonical text form of a 32-byte account public key
//!
//! `base32(pubkey || checksum)` without padding, where the checksum is the
//! last 4 bytes of SHA-512/256 over the public key. Always 58 characters.
//!
//! # Example
//!
//! ```ignore
//! let addr = encode_address(&[0u8; 32]);
//! assert_eq!(addr, "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ");
//! ```

use data_encoding::{DecodeKind, BASE32_NOPAD};
use sha2::{Digest, Sha512_256};
use thiserror::Error;

pub const PUBLIC_KEY_LEN: usize = 32;
pub const CHECKSUM_LEN: usize = 4;
pub const ADDRESS_LEN: usize = 58;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must be 58 characters, got {0}")]
    Length(usize),
    #[error("invalid base32 character {0:?}")]
    Character(char),
    #[error("address has non-zero trailing bits")]
    NonCanonical,
    #[error("address checksum mismatch")]
    Checksum,
}

/// Encode a raw public key as its canonical address.
pub fn encode_address(public_key: &[u8; PUBLIC_KEY_LEN]) -> String {
    let mut bytes = Vec::with_capacity(PUBLIC_KEY_LEN + CHECKSUM_LEN);
    bytes.extend_from_slice(public_key);
    bytes.extend_from_slice(&checksum(public_key));
    BASE32_NOPAD.encode(&bytes)
}

/// Decode and verify an address back to its public key.
///
/// Only the canonical spelling is accepted: the 2 bits past the checksum must be zero.
pub fn decode_address(address: &str) -> Result<[u8; PUBLIC_KEY_LEN], AddressError> {
    if address.len() != ADDRESS_LEN {
        return Err(AddressError::Length(address.len()));
    }
    let bytes = BASE32_NOPAD.decode(address.as_bytes()).map_err(|e| match e.kind {
        DecodeKind::Trailing => AddressError::NonCanonical,
        DecodeKind::Symbol => {
            AddressError::Character(address.get(e.position..).and_then(|r| r.chars().next()).unwrap_or('?'))
        }
        _ => AddressError::Length(address.len()),
    })?;
    let mut public_key = [0u8; PUBLIC_KEY_LEN];
    public_key.copy_from_slice(&bytes[..PUBLIC_KEY_LEN]);
    if bytes[PUBLIC_KEY_LEN..] != checksum(&public_key) {
        return Err(AddressError::Checksum);
    }
    Ok(public_key)
}

pub fn is_valid_address(address: &str) -> bool {
    decode_address(address).is_ok()
}

fn checksum(public_key: &[u8; PUBLIC_KEY_LEN]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha512_256::digest(public_key);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_ADDRESS: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ";

    #[test]
    fn test_zero_key_vector() {
        assert_eq!(encode_address(&[0u8; 32]), ZERO_ADDRESS);
    }

    #[test]
    fn test_decode_recovers_key() {
        let key = [7u8; 32];
        let address = encode_address(&key);
        assert_eq!(address.len(), ADDRESS_LEN);
        assert_eq!(decode_address(&address).expect("decode"), key);
    }

    #[test]
    fn test_checksum_mismatch() {
        // Flip one character inside the key portion.
        let mut tampered = ZERO_ADDRESS.to_string();
        tampered.replace_range(0..1, "B");
        assert_eq!(decode_address(&tampered), Err(AddressError::Checksum));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(decode_address("SHORT"), Err(AddressError::Length(5)));
        let lowercase = ZERO_ADDRESS.to_lowercase();
        assert!(matches!(decode_address(&lowercase), Err(AddressError::Character('a'))));
    }

    #[test]
    fn test_rejects_non_canonical_trailing_bits() {
        // Same key and checksum bytes, but one of the 2 padding bits set.
        let alias = ZERO_ADDRESS.replace("Y5HFKQ", "Y5HFKR");
        assert_eq!(decode_address(&alias), Err(AddressError::NonCanonical));
        assert!(!is_valid_address(&alias));
        assert!(is_valid_address(ZERO_ADDRESS));
    }
}
