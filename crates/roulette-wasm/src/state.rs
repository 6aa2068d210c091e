//! Serializable results handed back to JavaScript.

use roulette_pow::compact::{bits_to_difficulty, decode_compact, format_difficulty};
use roulette_pow::hash::u256_to_hex;
use roulette_pow::{Hash256, PowError};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Outcome of a proof-of-work check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowCheckInfo {
    /// Whether the hash meets the target.
    pub valid: bool,
    /// Rejection reason, if any.
    pub error: Option<String>,
    /// The checked hash (display format), when one was computed.
    pub hash: Option<String>,
    /// Difficulty bits checked against.
    pub bits: u32,
    /// Difficulty as a number.
    pub difficulty: f64,
    /// Formatted difficulty string.
    pub difficulty_display: String,
}

impl PowCheckInfo {
    /// Build from a check result.
    pub fn new(hash: Option<&Hash256>, bits: u32, result: Result<(), PowError>) -> Self {
        let difficulty = bits_to_difficulty(bits);
        PowCheckInfo {
            valid: result.is_ok(),
            error: result.err().map(|e| e.to_string()),
            hash: hash.map(Hash256::to_display_hex),
            bits,
            difficulty,
            difficulty_display: format_difficulty(difficulty),
        }
    }

    /// Convert to JS value.
    pub fn to_js(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {:?}", e)))
    }
}

/// Decoded compact target for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetInfo {
    /// Difficulty bits.
    pub bits: u32,
    /// Target as 64 hex characters, most significant first.
    pub target: String,
    /// Sign bit set on a non-zero mantissa.
    pub negative: bool,
    /// Exponent too large for 256 bits.
    pub overflow: bool,
    /// Difficulty as a number.
    pub difficulty: f64,
    /// Formatted difficulty string.
    pub difficulty_display: String,
}

impl TargetInfo {
    pub fn new(bits: u32) -> Self {
        let decoded = decode_compact(bits);
        let difficulty = bits_to_difficulty(bits);
        TargetInfo {
            bits,
            target: u256_to_hex(&decoded.target),
            negative: decoded.negative,
            overflow: decoded.overflow,
            difficulty,
            difficulty_display: format_difficulty(difficulty),
        }
    }

    /// Convert to JS value.
    pub fn to_js(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_info_valid() {
        let hash = Hash256::default();
        let info = PowCheckInfo::new(Some(&hash), 0x1d00ffff, Ok(()));
        assert!(info.valid);
        assert!(info.error.is_none());
        assert_eq!(info.hash.as_deref(), Some("0".repeat(64).as_str()));
        assert_eq!(info.difficulty_display, "1.00");
    }

    #[test]
    fn test_check_info_rejected() {
        let info = PowCheckInfo::new(None, 0x04923456, Err(PowError::InvalidTarget { bits: 0x04923456 }));
        assert!(!info.valid);
        assert_eq!(info.error.as_deref(), Some("nBits below minimum work: 0x04923456"));
        assert!(info.hash.is_none());
    }

    #[test]
    fn test_target_info() {
        let info = TargetInfo::new(0x1d00ffff);
        assert_eq!(
            info.target,
            "00000000ffff0000000000000000000000000000000000000000000000000000"
        );
        assert!(!info.negative && !info.overflow);
        assert!(TargetInfo::new(0xff123456).overflow);
    }

    #[test]
    fn test_zero_target_displays_infinite() {
        let info = TargetInfo::new(0x1d000000);
        assert!(info.difficulty.is_infinite());
        assert_eq!(info.difficulty_display, "infinite");
    }
}
