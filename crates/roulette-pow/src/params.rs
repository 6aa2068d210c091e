//! Consensus parameters and network presets.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compact::encode_compact;
use crate::hash::{u256_from_hex, u256_to_hex, U256};

/// Two weeks, in seconds.
pub const DEFAULT_TARGET_TIMESPAN: i64 = 14 * 24 * 60 * 60;

/// Ten minutes, in seconds.
pub const DEFAULT_TARGET_SPACING: i64 = 10 * 60;

/// Largest accepted `target_timespan`; retargeting clamps to four times it.
pub const MAX_TARGET_TIMESPAN: i64 = i64::MAX / 4;

/// Errors raised while building or loading consensus parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid pow_limit hex: {0}")]
    PowLimitHex(#[from] hex::FromHexError),
    #[error("pow_limit must be non-zero")]
    ZeroPowLimit,
    #[error("target_spacing must be positive, got {0}")]
    Spacing(i64),
    #[error("target_timespan ({timespan}) must be at least target_spacing ({spacing})")]
    Timespan { timespan: i64, spacing: i64 },
    #[error("target_timespan must be at most {MAX_TARGET_TIMESPAN}, got {0}")]
    TimespanTooLarge(i64),
    #[error("malformed consensus parameters: {0}")]
    Json(#[from] serde_json::Error),
}

/// Immutable proof-of-work consensus parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConsensusParams", into = "RawConsensusParams")]
pub struct ConsensusParams {
    pow_limit: U256,
    target_timespan: i64,
    target_spacing: i64,
    allow_min_difficulty_blocks: bool,
    no_retargeting: bool,
}

impl ConsensusParams {
    /// Build and validate a parameter set.
    pub fn new(
        pow_limit: U256,
        target_timespan: i64,
        target_spacing: i64,
        allow_min_difficulty_blocks: bool,
        no_retargeting: bool,
    ) -> Result<Self, ConfigError> {
        if pow_limit.is_zero() {
            return Err(ConfigError::ZeroPowLimit);
        }
        if target_spacing <= 0 {
            return Err(ConfigError::Spacing(target_spacing));
        }
        if target_timespan < target_spacing {
            return Err(ConfigError::Timespan {
                timespan: target_timespan,
                spacing: target_spacing,
            });
        }
        if target_timespan > MAX_TARGET_TIMESPAN {
            return Err(ConfigError::TimespanTooLarge(target_timespan));
        }

        Ok(ConsensusParams {
            pow_limit,
            target_timespan,
            target_spacing,
            allow_min_difficulty_blocks,
            no_retargeting,
        })
    }

    /// Load parameters from JSON.
    ///
    /// `pow_limit` is a 64-character hex string, most significant byte first.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConsensusParams = serde_json::from_str(json)?;
        ConsensusParams::try_from(raw)
    }

    /// Serialize parameters to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Maximum (easiest) target.
    pub fn pow_limit(&self) -> &U256 {
        &self.pow_limit
    }

    /// `pow_limit` in compact form.
    pub fn pow_limit_bits(&self) -> u32 {
        encode_compact(&self.pow_limit)
    }

    /// Seconds covered by one retarget window.
    pub fn target_timespan(&self) -> i64 {
        self.target_timespan
    }

    /// Desired seconds between blocks.
    pub fn target_spacing(&self) -> i64 {
        self.target_spacing
    }

    /// Blocks per retarget window.
    pub fn difficulty_adjustment_interval(&self) -> i64 {
        self.target_timespan / self.target_spacing
    }

    /// Testnet rule: a block far enough after its parent may use `pow_limit`.
    pub fn allow_min_difficulty_blocks(&self) -> bool {
        self.allow_min_difficulty_blocks
    }

    /// Regtest rule: difficulty never changes.
    pub fn no_retargeting(&self) -> bool {
        self.no_retargeting
    }

    /// Same parameters with the min-difficulty rule switched.
    pub fn with_min_difficulty_blocks(mut self, allow: bool) -> Self {
        self.allow_min_difficulty_blocks = allow;
        self
    }

    /// Same parameters with retargeting switched off or on.
    pub fn with_no_retargeting(mut self, no_retargeting: bool) -> Self {
        self.no_retargeting = no_retargeting;
        self
    }
}

/// On-disk shape of `ConsensusParams`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConsensusParams {
    pow_limit: String,
    #[serde(default = "default_timespan")]
    target_timespan: i64,
    #[serde(default = "default_spacing")]
    target_spacing: i64,
    #[serde(default)]
    allow_min_difficulty_blocks: bool,
    #[serde(default)]
    no_retargeting: bool,
}

fn default_timespan() -> i64 {
    DEFAULT_TARGET_TIMESPAN
}

fn default_spacing() -> i64 {
    DEFAULT_TARGET_SPACING
}

impl TryFrom<RawConsensusParams> for ConsensusParams {
    type Error = ConfigError;

    fn try_from(raw: RawConsensusParams) -> Result<Self, Self::Error> {
        let pow_limit = u256_from_hex(raw.pow_limit.trim_start_matches("0x"))?;
        ConsensusParams::new(
            pow_limit,
            raw.target_timespan,
            raw.target_spacing,
            raw.allow_min_difficulty_blocks,
            raw.no_retargeting,
        )
    }
}

impl From<ConsensusParams> for RawConsensusParams {
    fn from(params: ConsensusParams) -> Self {
        RawConsensusParams {
            pow_limit: u256_to_hex(&params.pow_limit),
            target_timespan: params.target_timespan,
            target_spacing: params.target_spacing,
            allow_min_difficulty_blocks: params.allow_min_difficulty_blocks,
            no_retargeting: params.no_retargeting,
        }
    }
}

/// Network type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Regtest,
}

impl Network {
    /// Consensus parameters for this network.
    pub fn params(&self) -> ConsensusParams {
        match self {
            Network::Mainnet => ConsensusParams {
                pow_limit: !U256::zero() >> 32u32,
                target_timespan: DEFAULT_TARGET_TIMESPAN,
                target_spacing: DEFAULT_TARGET_SPACING,
                allow_min_difficulty_blocks: false,
                no_retargeting: false,
            },
            Network::Testnet => ConsensusParams {
                pow_limit: !U256::zero() >> 32u32,
                target_timespan: DEFAULT_TARGET_TIMESPAN,
                target_spacing: DEFAULT_TARGET_SPACING,
                allow_min_difficulty_blocks: true,
                no_retargeting: false,
            },
            Network::Regtest => ConsensusParams {
                pow_limit: !U256::zero() >> 1u32,
                target_timespan: DEFAULT_TARGET_TIMESPAN,
                target_spacing: DEFAULT_TARGET_SPACING,
                allow_min_difficulty_blocks: true,
                no_retargeting: true,
            },
        }
    }

    /// Parse network from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" => Some(Network::Mainnet),
            "testnet" | "test" => Some(Network::Testnet),
            "regtest" | "reg" => Some(Network::Regtest),
            _ => None,
        }
    }

    /// Get network name as string.
    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
        }
    }
}

impl core::fmt::Display for Network {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_limits() {
        assert_eq!(Network::Mainnet.params().pow_limit_bits(), 0x1d00ffff);
        assert_eq!(Network::Testnet.params().pow_limit_bits(), 0x1d00ffff);
        assert_eq!(Network::Regtest.params().pow_limit_bits(), 0x207fffff);
    }

    #[test]
    fn test_interval() {
        assert_eq!(Network::Mainnet.params().difficulty_adjustment_interval(), 2016);
    }

    #[test]
    fn test_network_from_str() {
        assert_eq!(Network::from_str("mainnet"), Some(Network::Mainnet));
        assert_eq!(Network::from_str("MAINNET"), Some(Network::Mainnet));
        assert_eq!(Network::from_str("testnet"), Some(Network::Testnet));
        assert_eq!(Network::from_str("regtest"), Some(Network::Regtest));
        assert_eq!(Network::from_str("invalid"), None);
    }

    #[test]
    fn test_json_roundtrip() {
        let params = Network::Testnet.params();
        let json = params.to_json().unwrap();
        assert!(json.contains("00000000ffffffff"));
        assert_eq!(ConsensusParams::from_json(&json).unwrap(), params);
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{ "pow_limit": "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff" }"#;
        let params = ConsensusParams::from_json(json).unwrap();
        assert_eq!(params.target_timespan(), DEFAULT_TARGET_TIMESPAN);
        assert_eq!(params.target_spacing(), DEFAULT_TARGET_SPACING);
        assert!(!params.allow_min_difficulty_blocks());
        assert!(!params.no_retargeting());
        assert_eq!(params.pow_limit_bits(), 0x207fffff);
    }

    #[test]
    fn test_json_rejects_bad_values() {
        let zero = format!(r#"{{ "pow_limit": "{}" }}"#, "0".repeat(64));
        assert!(matches!(
            ConsensusParams::from_json(&zero),
            Err(ConfigError::ZeroPowLimit)
        ));

        let spacing = format!(
            r#"{{ "pow_limit": "{}", "target_spacing": 0 }}"#,
            "f".repeat(64)
        );
        assert!(matches!(
            ConsensusParams::from_json(&spacing),
            Err(ConfigError::Spacing(0))
        ));

        let short = r#"{ "pow_limit": "ffff" }"#;
        assert!(matches!(
            ConsensusParams::from_json(short),
            Err(ConfigError::PowLimitHex(_))
        ));

        let unknown = format!(r#"{{ "pow_limit": "{}", "bogus": 1 }}"#, "f".repeat(64));
        assert!(matches!(
            ConsensusParams::from_json(&unknown),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_new_rejects_short_timespan() {
        let result = ConsensusParams::new(U256::one(), 100, 600, false, false);
        assert!(matches!(
            result,
            Err(ConfigError::Timespan { timespan: 100, spacing: 600 })
        ));
    }

    #[test]
    fn test_rejects_timespan_that_overflows_clamp() {
        let huge = 1i64 << 62;
        assert!(matches!(
            ConsensusParams::new(U256::one(), huge, 600, false, false),
            Err(ConfigError::TimespanTooLarge(t)) if t == huge
        ));

        let json = format!(
            r#"{{ "pow_limit": "{}", "target_timespan": {} }}"#,
            "f".repeat(64),
            huge
        );
        assert!(matches!(
            ConsensusParams::from_json(&json),
            Err(ConfigError::TimespanTooLarge(_))
        ));

        let params = ConsensusParams::new(U256::one(), MAX_TARGET_TIMESPAN, 600, false, false);
        assert!(params.is_ok());
    }
}
