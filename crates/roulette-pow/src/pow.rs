//! Proof-of-work validation.

use log::warn;
use thiserror::Error;

use crate::block::BlockHeader;
use crate::compact::decode_compact;
use crate::hash::Hash256;
use crate::params::ConsensusParams;
use crate::roulette::{HashError, Primitives, RouletteHasher};

/// Reasons a header's proof of work is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PowError {
    /// Bits decode to a negative, zero or overflowing target, or one above
    /// `pow_limit`.
    #[error("nBits below minimum work: {bits:#010x}")]
    InvalidTarget { bits: u32 },
    /// The hash is above the target.
    #[error("hash doesn't match nBits: {bits:#010x}")]
    InsufficientWork { bits: u32 },
    #[error("cannot compute proof-of-work hash: {0}")]
    Hash(#[from] HashError),
}

/// Check that `hash` satisfies the target encoded in `bits`.
///
/// The hash is read as a little-endian 256-bit integer and passes when it is
/// at or below the target.
pub fn check_proof_of_work(
    hash: &Hash256,
    bits: u32,
    params: &ConsensusParams,
) -> Result<(), PowError> {
    let decoded = decode_compact(bits);

    // Check range
    let target = match decoded.valid_target() {
        Some(target) if !target.is_zero() && target <= *params.pow_limit() => target,
        _ => {
            warn!("check_proof_of_work: nBits below minimum work: {:#010x}", bits);
            return Err(PowError::InvalidTarget { bits });
        }
    };

    // Check proof of work matches claimed amount
    if hash.to_u256() > target {
        warn!("check_proof_of_work: hash {} doesn't match nBits: {:#010x}", hash, bits);
        return Err(PowError::InsufficientWork { bits });
    }

    Ok(())
}

/// Hash `header` and check it against its own bits.
///
/// Returns the proof-of-work hash when the header is accepted.
pub fn check_header<P: Primitives>(
    header: &BlockHeader,
    params: &ConsensusParams,
    hasher: &RouletteHasher<P>,
) -> Result<Hash256, PowError> {
    let hash = header.pow_hash(hasher)?;
    check_proof_of_work(&hash, header.bits, params)?;
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compact::encode_compact;
    use crate::hash::U256;
    use crate::params::Network;
    use crate::roulette::{Algorithm, PrimitiveTable};

    const BITS: u32 = 0x1b0404cb;

    fn target() -> U256 {
        decode_compact(BITS).target
    }

    #[test]
    fn test_hash_equal_to_target_passes() {
        let params = Network::Mainnet.params();
        let hash = Hash256::from_u256(&target());
        assert_eq!(check_proof_of_work(&hash, BITS, &params), Ok(()));
    }

    #[test]
    fn test_hash_one_above_target_fails() {
        let params = Network::Mainnet.params();
        let hash = Hash256::from_u256(&(target() + U256::one()));
        assert_eq!(
            check_proof_of_work(&hash, BITS, &params),
            Err(PowError::InsufficientWork { bits: BITS })
        );
    }

    #[test]
    fn test_small_hash_passes() {
        let params = Network::Mainnet.params();
        let hash = Hash256::from_u256(&U256::one());
        assert!(check_proof_of_work(&hash, BITS, &params).is_ok());
        assert!(check_proof_of_work(&Hash256::default(), BITS, &params).is_ok());
    }

    #[test]
    fn test_byte_order_is_little_endian() {
        let params = Network::Mainnet.params();
        // Top byte set at the end of the array is a huge number
        let mut bytes = [0u8; 32];
        bytes[31] = 0x01;
        assert_eq!(
            check_proof_of_work(&Hash256::from_bytes(bytes), BITS, &params),
            Err(PowError::InsufficientWork { bits: BITS })
        );

        // The same byte at the start is tiny
        let mut bytes = [0u8; 32];
        bytes[0] = 0xff;
        assert!(check_proof_of_work(&Hash256::from_bytes(bytes), BITS, &params).is_ok());
    }

    #[test]
    fn test_invalid_targets() {
        let params = Network::Mainnet.params();
        let hash = Hash256::default();

        for bits in [
            0x00000000, // zero
            0x03000000, // zero mantissa
            0x04923456, // negative
            0xff123456, // overflow
            0x1d01ffff, // above pow_limit
            0x2100ffff, // far above pow_limit
        ] {
            assert_eq!(
                check_proof_of_work(&hash, bits, &params),
                Err(PowError::InvalidTarget { bits }),
                "bits {:08x}",
                bits
            );
        }
    }

    #[test]
    fn test_pow_limit_itself_is_valid() {
        let params = Network::Mainnet.params();
        let bits = encode_compact(params.pow_limit());
        let hash = Hash256::from_u256(&decode_compact(bits).target);
        assert!(check_proof_of_work(&hash, bits, &params).is_ok());
    }

    fn regtest_header(nonce: u32) -> BlockHeader {
        BlockHeader {
            version: 1,
            prev_block_hash: Hash256::default(),
            merkle_root: [0x42u8; 32],
            timestamp: 1_700_000_000,
            bits: 0x207fffff,
            nonce,
        }
    }

    #[test]
    fn test_check_header_accepts_regtest_nonce() {
        let params = Network::Regtest.params();
        let hasher = RouletteHasher::builtin();
        let header = regtest_header(394);

        let hash = check_header(&header, &params, &hasher).unwrap();
        assert_eq!(
            hex::encode(hash.as_bytes()),
            "50aa21a80445a2443ed8a1c7b06784ec9a819f9e5d4cef11dfeef86c81d11c6a"
        );
        assert_eq!(hash, header.pow_hash(&hasher).unwrap());
    }

    #[test]
    fn test_check_header_rejects_hash_above_target() {
        let params = Network::Regtest.params();
        let header = regtest_header(11345);

        // The hash ends in 0xc3, above the regtest limit of 0x7fffff << 232
        let hash = header.pow_hash(&RouletteHasher::builtin()).unwrap();
        assert_eq!(hash.as_bytes()[31], 0xc3);
        assert_eq!(
            check_header(&header, &params, &RouletteHasher::builtin()),
            Err(PowError::InsufficientWork { bits: 0x207fffff })
        );
    }

    #[test]
    fn test_nonces_give_distinct_hashes() {
        let hasher = RouletteHasher::builtin();
        let hashes: Vec<Hash256> = [394u32, 9415, 10230, 11345]
            .iter()
            .map(|nonce| regtest_header(*nonce).pow_hash(&hasher).unwrap())
            .collect();
        for (i, a) in hashes.iter().enumerate() {
            for b in &hashes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_check_header_reports_hash_errors() {
        let params = Network::Regtest.params();

        // Nonce 0 reaches Luffa on the built-in table
        assert_eq!(
            check_header(&regtest_header(0), &params, &RouletteHasher::builtin()),
            Err(PowError::Hash(HashError::Unavailable(Algorithm::Luffa512)))
        );

        let hasher = RouletteHasher::new(PrimitiveTable::empty());
        let header = regtest_header(0);
        let selector = {
            use sha2::Digest;
            sha2::Sha512::digest(header.serialize())[0]
        };
        assert_eq!(
            check_header(&header, &params, &hasher),
            Err(PowError::Hash(HashError::Unavailable(Algorithm::from_selector(selector))))
        );
    }

    #[test]
    fn test_check_header_rejects_bad_bits_after_hashing() {
        let params = Network::Mainnet.params();
        let mut header = regtest_header(1787);
        header.bits = 0x04923456;
        assert_eq!(
            check_header(&header, &params, &RouletteHasher::builtin()),
            Err(PowError::InvalidTarget { bits: 0x04923456 })
        );
    }
}
