//! Compact "bits" target encoding and difficulty helpers.
//!
//! The bits format is: [exponent (1 byte)][mantissa (3 bytes)]
//! Target = mantissa * 256^(exponent - 3)
//!
//! Bit 0x00800000 of the mantissa is a sign bit. Targets are never negative,
//! so an encoding with the sign bit set is invalid.

use crate::hash::U256;

/// Sign bit inside the 3-byte mantissa.
pub const COMPACT_SIGN_BIT: u32 = 0x0080_0000;

/// Mantissa bits excluding the sign bit.
pub const COMPACT_MANTISSA_MASK: u32 = 0x007f_ffff;

/// Bits of the "difficulty 1" target.
pub const DIFFICULTY_ONE_BITS: u32 = 0x1d00_ffff;

/// Result of decoding compact bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedTarget {
    /// Decoded target. Meaningless when `negative` or `overflow` is set.
    pub target: U256,
    /// The sign bit was set on a non-zero mantissa.
    pub negative: bool,
    /// The exponent pushes the mantissa past 256 bits.
    pub overflow: bool,
}

impl DecodedTarget {
    /// The target, if the encoding is neither negative nor overflowing.
    pub fn valid_target(&self) -> Option<U256> {
        if self.negative || self.overflow {
            None
        } else {
            Some(self.target)
        }
    }
}

/// Convert compact bits to a 256-bit target.
///
/// Never panics. Invalid encodings are reported through the `negative` and
/// `overflow` flags only.
pub fn decode_compact(bits: u32) -> DecodedTarget {
    let size = bits >> 24;
    let mut word = bits & COMPACT_MANTISSA_MASK;

    let target = if size <= 3 {
        word >>= 8 * (3 - size);
        U256::from(word)
    } else {
        U256::from(word) << (8 * (size - 3))
    };

    let negative = word != 0 && (bits & COMPACT_SIGN_BIT) != 0;
    let overflow = word != 0
        && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));

    DecodedTarget {
        target,
        negative,
        overflow,
    }
}

/// Convert a 256-bit target back to compact bits.
///
/// Keeps the three most significant bytes; everything below is dropped.
pub fn encode_compact(target: &U256) -> u32 {
    let mut size = ((target.bits() + 7) / 8) as u32;

    let mut compact = if size <= 3 {
        (target.low_u64() << (8 * (3 - size))) as u32
    } else {
        (*target >> (8 * (size - 3))).low_u64() as u32
    };

    // A set high bit would read back as negative, so move it into the next byte
    if compact & COMPACT_SIGN_BIT != 0 {
        compact >>= 8;
        size += 1;
    }

    compact | (size << 24)
}

/// Calculate difficulty from bits.
///
/// Difficulty = target(0x1d00ffff) / target(bits)
pub fn bits_to_difficulty(bits: u32) -> f64 {
    let mantissa = bits & 0x00ff_ffff;
    if mantissa == 0 {
        return f64::INFINITY;
    }

    let mut shift = (bits >> 24) & 0xff;
    let mut difficulty = f64::from(DIFFICULTY_ONE_BITS & 0x00ff_ffff) / f64::from(mantissa);

    while shift < 29 {
        difficulty *= 256.0;
        shift += 1;
    }
    while shift > 29 {
        difficulty /= 256.0;
        shift -= 1;
    }

    difficulty
}

/// Format difficulty for display (e.g., "1.23T" for trillion).
///
/// A zero-mantissa target has infinite difficulty and shows as "infinite".
pub fn format_difficulty(difficulty: f64) -> String {
    if difficulty.is_infinite() {
        "infinite".to_string()
    } else if difficulty >= 1e15 {
        format!("{:.2}P", difficulty / 1e15)
    } else if difficulty >= 1e12 {
        format!("{:.2}T", difficulty / 1e12)
    } else if difficulty >= 1e9 {
        format!("{:.2}G", difficulty / 1e9)
    } else if difficulty >= 1e6 {
        format!("{:.2}M", difficulty / 1e6)
    } else if difficulty >= 1e3 {
        format!("{:.2}K", difficulty / 1e3)
    } else {
        format!("{:.2}", difficulty)
    }
}
