//! BLAKE-512, BMW-512 and CubeHash-512 behind the `digest` 0.10 traits.
//!
//! `blake-hash` is built on `digest` 0.9, `bmw-hash` has no
//! `FixedOutputReset`, and `cubehash` has an API of its own. [`Buffered`]
//! collects the input and hashes it in one call at finalization, which is
//! enough to register each of them as a [`digest::DynDigest`].

use core::marker::PhantomData;

use digest::consts::U64;
use digest::{FixedOutput, FixedOutputReset, HashMarker, Output, OutputSizeUser, Reset, Update};

/// A 512-bit hash over a complete message.
pub trait OneShot512 {
    fn digest512(data: &[u8]) -> [u8; 64];
}

/// Incremental front end for a [`OneShot512`] hash.
#[derive(Debug, Clone, Default)]
pub struct Buffered<H> {
    buffer: Vec<u8>,
    hash: PhantomData<H>,
}

impl<H: OneShot512> HashMarker for Buffered<H> {}

impl<H: OneShot512> OutputSizeUser for Buffered<H> {
    type OutputSize = U64;
}

impl<H: OneShot512> Update for Buffered<H> {
    fn update(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }
}

impl<H: OneShot512> FixedOutput for Buffered<H> {
    fn finalize_into(self, out: &mut Output<Self>) {
        out.copy_from_slice(&H::digest512(&self.buffer));
    }
}

impl<H: OneShot512> FixedOutputReset for Buffered<H> {
    fn finalize_into_reset(&mut self, out: &mut Output<Self>) {
        out.copy_from_slice(&H::digest512(&self.buffer));
        self.buffer.clear();
    }
}

impl<H: OneShot512> Reset for Buffered<H> {
    fn reset(&mut self) {
        self.buffer.clear();
    }
}

/// BLAKE-512, 16 rounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake512Core;

impl OneShot512 for Blake512Core {
    fn digest512(data: &[u8]) -> [u8; 64] {
        use blake_hash::Digest;

        let mut out = [0u8; 64];
        out.copy_from_slice(&blake_hash::Blake512::digest(data));
        out
    }
}

/// Blue Midnight Wish, 512-bit.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bmw512Core;

impl OneShot512 for Bmw512Core {
    fn digest512(data: &[u8]) -> [u8; 64] {
        use bmw_hash::Digest;

        let mut out = [0u8; 64];
        out.copy_from_slice(&bmw_hash::Bmw512::digest(data));
        out
    }
}

/// CubeHash16/32-512, the round-two parameters (`revision: 2`).
#[derive(Debug, Clone, Copy, Default)]
pub struct CubeHash512Core;

impl OneShot512 for CubeHash512Core {
    fn digest512(data: &[u8]) -> [u8; 64] {
        let mut hasher = cubehash::CubeHashBest::new(cubehash::CubeHashParams {
            revision: 2,
            hash_len_bits: 512,
        });
        hasher.update(data);

        let mut out = [0u8; 64];
        out.copy_from_slice(&hasher.finalize());
        out
    }
}

pub type Blake512 = Buffered<Blake512Core>;
pub type Bmw512 = Buffered<Bmw512Core>;
pub type CubeHash512 = Buffered<CubeHash512Core>;
