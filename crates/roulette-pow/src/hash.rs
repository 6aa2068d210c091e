//! 256-bit integer and hash types shared by the target and digest code.
//!
//! `Hash256` keeps bytes in internal order. Read as an integer it is
//! little-endian: byte 0 is the least significant byte. This is the same
//! convention block hashes use when compared against a target, and the
//! reason hashes are displayed byte-reversed.

use core::fmt;

use uint::construct_uint;

construct_uint! {
    /// Unsigned 256-bit integer made of 4 x 64-bit words.
    pub struct U256(4);
}

/// Length of a `Hash256` in bytes.
pub const HASH256_LEN: usize = 32;

/// A 256-bit hash in internal byte order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash256([u8; HASH256_LEN]);

impl Hash256 {
    /// Wrap raw bytes in internal byte order.
    pub const fn from_bytes(bytes: [u8; HASH256_LEN]) -> Self {
        Hash256(bytes)
    }

    /// Raw bytes in internal byte order.
    pub fn as_bytes(&self) -> &[u8; HASH256_LEN] {
        &self.0
    }

    /// Interpret the hash as an unsigned little-endian integer.
    pub fn to_u256(&self) -> U256 {
        U256::from_little_endian(&self.0)
    }

    /// Build the hash whose little-endian integer value is `value`.
    pub fn from_u256(value: &U256) -> Self {
        let mut bytes = [0u8; HASH256_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = value.byte(i);
        }
        Hash256(bytes)
    }

    /// Display format: reversed bytes as hex, most significant byte first.
    pub fn to_display_hex(&self) -> String {
        hex::encode(reverse_bytes(&self.0))
    }

    /// Parse a hash given in display format (reversed hex).
    pub fn from_display_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; HASH256_LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Hash256(reverse_bytes(&bytes)))
    }
}

impl From<[u8; HASH256_LEN]> for Hash256 {
    fn from(bytes: [u8; HASH256_LEN]) -> Self {
        Hash256(bytes)
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self.to_display_hex())
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_hex())
    }
}

/// Reverse the byte order of a 32-byte array.
#[inline]
pub fn reverse_bytes(bytes: &[u8; HASH256_LEN]) -> [u8; HASH256_LEN] {
    let mut reversed = *bytes;
    reversed.reverse();
    reversed
}

/// Render a `U256` as 64 hex characters, most significant byte first.
pub fn u256_to_hex(value: &U256) -> String {
    hex::encode(reverse_bytes(Hash256::from_u256(value).as_bytes()))
}

/// Parse 64 hex characters (most significant byte first) into a `U256`.
pub fn u256_from_hex(s: &str) -> Result<U256, hex::FromHexError> {
    let mut bytes = [0u8; HASH256_LEN];
    hex::decode_to_slice(s, &mut bytes)?;
    Ok(U256::from_big_endian(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_interpretation() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0x01;
        assert_eq!(Hash256::from_bytes(bytes).to_u256(), U256::from(1u64));

        let mut bytes = [0u8; 32];
        bytes[31] = 0x80;
        assert_eq!(Hash256::from_bytes(bytes).to_u256(), U256::from(1u64) << 255u32);
    }

    #[test]
    fn test_u256_conversion_is_inverse() {
        let value = U256::from(0x1234_5678_9abc_def0u64) << 100u32;
        assert_eq!(Hash256::from_u256(&value).to_u256(), value);
    }

    #[test]
    fn test_display_hex_is_reversed() {
        let mut bytes = [0u8; 32];
        bytes[31] = 0xab;
        bytes[0] = 0x01;
        let hash = Hash256::from_bytes(bytes);
        let shown = hash.to_display_hex();

        assert!(shown.starts_with("ab"));
        assert!(shown.ends_with("01"));
        assert_eq!(Hash256::from_display_hex(&shown).unwrap(), hash);
    }

    #[test]
    fn test_from_display_hex_rejects_wrong_length() {
        assert!(Hash256::from_display_hex("abcd").is_err());
    }

    #[test]
    fn test_u256_hex() {
        let limit = !U256::zero() >> 32u32;
        let text = u256_to_hex(&limit);
        assert_eq!(
            text,
            "00000000ffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
        );
        assert_eq!(u256_from_hex(&text).unwrap(), limit);
    }
}
