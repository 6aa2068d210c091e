//! Proof-of-work consensus core for RouletteHash chains.
//!
//! This crate provides pure Rust implementations of:
//! - Compact "bits" target encoding and decoding
//! - Difficulty retargeting, including the min-difficulty rule
//! - RouletteHash, sixteen data-selected rounds of 512-bit hashing
//! - Proof-of-work checks of hashes and block headers
//!
//! Everything here is a pure function of its inputs and safe to call from
//! many threads at once.

pub mod block;
pub mod chain;
pub mod compact;
pub mod hash;
pub mod params;
pub mod pow;
pub mod primitives;
pub mod retarget;
pub mod roulette;

pub use block::BlockHeader;
pub use chain::{BlockIndex, ChainCursor, HeaderChain, HeaderMeta};
pub use compact::{decode_compact, encode_compact, DecodedTarget};
pub use hash::{Hash256, U256};
pub use params::{ConfigError, ConsensusParams, Network};
pub use pow::{check_header, check_proof_of_work, PowError};
pub use retarget::{calculate_next_work_required, get_next_work_required, RetargetError};
pub use roulette::{
    boxed, roulette_hash, Algorithm, Digest64, HashError, PrimitiveTable, Primitives,
    RouletteHasher, RouletteTrace,
};
