//! Difficulty retargeting.
//!
//! The target changes once per `difficulty_adjustment_interval` blocks,
//! scaled by how long the previous window actually took. Between
//! boundaries the previous block's bits carry over, except on networks that
//! allow min-difficulty blocks after a long gap.

use log::debug;
use thiserror::Error;

use crate::chain::BlockIndex;
use crate::compact::{decode_compact, encode_compact};
use crate::hash::U256;
use crate::params::ConsensusParams;

/// Retargeting cannot proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RetargetError {
    /// The first block of the retarget window is not in the chain. The chain
    /// is shorter than one window or the index is corrupt.
    #[error("no ancestor at height {height} for retarget window ending at {last}")]
    MissingAncestor { height: i64, last: u32 },
}

/// Compact target required for the block after `last`.
pub fn get_next_work_required<B: BlockIndex>(
    last: &B,
    candidate_time: u32,
    params: &ConsensusParams,
) -> Result<u32, RetargetError> {
    let interval = params.difficulty_adjustment_interval();
    let last_height = i64::from(last.height());

    // Only change once per difficulty adjustment interval
    if (last_height + 1) % interval != 0 {
        if !params.allow_min_difficulty_blocks() {
            return Ok(last.bits());
        }

        let pow_limit_bits = params.pow_limit_bits();

        // A block more than two spacings after its parent may use the minimum
        let gap = i64::from(candidate_time) - i64::from(last.time());
        if gap > params.target_spacing() * 2 {
            debug!(
                "min-difficulty block allowed at height {}: gap {}s",
                last_height + 1,
                gap
            );
            return Ok(pow_limit_bits);
        }

        return Ok(last_regular_bits(last, interval, pow_limit_bits));
    }

    let first_height = last_height - (interval - 1);
    let first = u32::try_from(first_height)
        .ok()
        .and_then(|height| last.ancestor(height))
        .ok_or(RetargetError::MissingAncestor {
            height: first_height,
            last: last.height(),
        })?;

    Ok(calculate_next_work_required(last, first.time(), params))
}

/// Bits of the nearest ancestor not mined under the min-difficulty rule.
///
/// Stops at the first block that is on a retarget boundary, has bits other
/// than `pow_limit_bits`, or has no parent.
fn last_regular_bits<B: BlockIndex>(last: &B, interval: i64, pow_limit_bits: u32) -> u32 {
    let mut index = last.clone();
    while i64::from(index.height()) % interval != 0 && index.bits() == pow_limit_bits {
        match index.prev() {
            Some(prev) => index = prev,
            None => break,
        }
    }
    index.bits()
}

/// Retarget from the window that started at `first_block_time` and ended
/// at `last`.
pub fn calculate_next_work_required<B: BlockIndex>(
    last: &B,
    first_block_time: u32,
    params: &ConsensusParams,
) -> u32 {
    if params.no_retargeting() {
        return last.bits();
    }

    let timespan = params.target_timespan();
    let actual_timespan = i64::from(last.time()) - i64::from(first_block_time);
    debug!("actual timespan {}s before bounds", actual_timespan);

    // Limit adjustment step
    let actual_timespan = actual_timespan.clamp(timespan / 4, timespan * 4);

    let pow_limit = params.pow_limit();
    let (scaled, _) = decode_compact(last.bits())
        .target
        .overflowing_mul(U256::from(actual_timespan as u64));
    let mut new_target = scaled / U256::from(timespan as u64);

    if new_target > *pow_limit {
        new_target = *pow_limit;
    }

    let bits = encode_compact(&new_target);
    debug!(
        "retarget at height {}: {:08x} -> {:08x} (timespan {}s of {}s)",
        last.height(),
        last.bits(),
        bits,
        actual_timespan,
        timespan
    );
    bits
}
