//! RouletteHash: sixteen chained rounds of data-selected 512-bit hashing.
//!
//! The input is hashed once with SHA-512. Each of the following rounds
//! takes the low nibble of the first byte of the running 64-byte digest,
//! picks the primitive with that index and hashes the whole digest with it.
//! The first 32 bytes of the final digest are the proof-of-work hash.
//!
//! The index order of [`Algorithm`] is part of consensus.

use core::fmt;

use digest::DynDigest;
use log::trace;
use sha2::{Digest, Sha512};
use thiserror::Error;

use crate::hash::Hash256;
use crate::primitives;

/// Number of chained rounds after the initial SHA-512.
pub const ROUNDS: usize = 16;

/// Output length of every primitive, in bytes.
pub const DIGEST64_LEN: usize = 64;

/// Running digest passed between rounds.
pub type Digest64 = [u8; DIGEST64_LEN];

/// Builds a freshly initialized primitive.
pub type PrimitiveCtor = fn() -> Box<dyn DynDigest>;

/// The sixteen 512-bit primitives, in selector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Algorithm {
    Blake512 = 0,
    Bmw512 = 1,
    CubeHash512 = 2,
    Echo512 = 3,
    Fugue512 = 4,
    Groestl512 = 5,
    Hamsi512 = 6,
    Jh512 = 7,
    Keccak512 = 8,
    Luffa512 = 9,
    Sha512 = 10,
    Shabal512 = 11,
    Shavite512 = 12,
    Simd512 = 13,
    Skein512 = 14,
    Whirlpool = 15,
}

impl Algorithm {
    /// Every algorithm, indexed by selector.
    pub const ALL: [Algorithm; 16] = [
        Algorithm::Blake512,
        Algorithm::Bmw512,
        Algorithm::CubeHash512,
        Algorithm::Echo512,
        Algorithm::Fugue512,
        Algorithm::Groestl512,
        Algorithm::Hamsi512,
        Algorithm::Jh512,
        Algorithm::Keccak512,
        Algorithm::Luffa512,
        Algorithm::Sha512,
        Algorithm::Shabal512,
        Algorithm::Shavite512,
        Algorithm::Simd512,
        Algorithm::Skein512,
        Algorithm::Whirlpool,
    ];

    /// Algorithm selected by the low nibble of `byte`.
    #[inline]
    pub fn from_selector(byte: u8) -> Self {
        Self::ALL[usize::from(byte & 0x0f)]
    }

    /// Selector index, 0..=15.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Blake512 => "blake512",
            Algorithm::Bmw512 => "bmw512",
            Algorithm::CubeHash512 => "cubehash512",
            Algorithm::Echo512 => "echo512",
            Algorithm::Fugue512 => "fugue512",
            Algorithm::Groestl512 => "groestl512",
            Algorithm::Hamsi512 => "hamsi512",
            Algorithm::Jh512 => "jh512",
            Algorithm::Keccak512 => "keccak512",
            Algorithm::Luffa512 => "luffa512",
            Algorithm::Sha512 => "sha512",
            Algorithm::Shabal512 => "shabal512",
            Algorithm::Shavite512 => "shavite512",
            Algorithm::Simd512 => "simd512",
            Algorithm::Skein512 => "skein512",
            Algorithm::Whirlpool => "whirlpool",
        }
    }

    /// Algorithm with the given [`name`](Algorithm::name), ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|algorithm| algorithm.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors from running the chained hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HashError {
    #[error("no implementation registered for {0}")]
    Unavailable(Algorithm),
    #[error("{algorithm} produced {len} bytes, expected 64")]
    OutputSize { algorithm: Algorithm, len: usize },
    #[error("{0} implementation failed")]
    Failed(Algorithm),
}

/// Source of the sixteen primitives.
pub trait Primitives {
    /// Hash `data` with `algorithm`, returning the full 64-byte digest.
    fn run(&self, algorithm: Algorithm, data: &[u8]) -> Result<Digest64, HashError>;
}

impl<P: Primitives + ?Sized> Primitives for &P {
    fn run(&self, algorithm: Algorithm, data: &[u8]) -> Result<Digest64, HashError> {
        (**self).run(algorithm, data)
    }
}

/// Constructor for any default-constructible digest, for use with
/// [`PrimitiveTable::with`].
pub fn boxed<D: DynDigest + Default + 'static>() -> Box<dyn DynDigest> {
    Box::new(D::default())
}

/// Fixed 16-slot table of primitive constructors, indexed by selector.
///
/// Every round asks its slot for a new instance, so no state is shared
/// between rounds, calls or threads.
#[derive(Clone, Copy)]
pub struct PrimitiveTable {
    slots: [Option<PrimitiveCtor>; 16],
}

impl PrimitiveTable {
    /// A table with no primitives registered.
    pub const fn empty() -> Self {
        PrimitiveTable { slots: [None; 16] }
    }

    /// Every primitive with a published crate.
    ///
    /// ECHO, Fugue, Hamsi, Luffa, SHAvite-3 and SIMD are left empty and must
    /// be supplied with [`PrimitiveTable::with`] or another [`Primitives`].
    pub fn builtin() -> Self {
        Self::empty()
            .with(Algorithm::Blake512, boxed::<primitives::Blake512>)
            .with(Algorithm::Bmw512, boxed::<primitives::Bmw512>)
            .with(Algorithm::CubeHash512, boxed::<primitives::CubeHash512>)
            .with(Algorithm::Groestl512, boxed::<groestl::Groestl512>)
            .with(Algorithm::Jh512, boxed::<jh::Jh512>)
            .with(Algorithm::Keccak512, boxed::<sha3::Keccak512>)
            .with(Algorithm::Sha512, boxed::<Sha512>)
            .with(Algorithm::Shabal512, boxed::<shabal::Shabal512>)
            .with(Algorithm::Skein512, boxed::<skein::Skein512<digest::consts::U64>>)
            .with(Algorithm::Whirlpool, boxed::<whirlpool::Whirlpool>)
    }

    /// Register `ctor` as the implementation of `algorithm`.
    pub fn with(mut self, algorithm: Algorithm, ctor: PrimitiveCtor) -> Self {
        self.slots[algorithm.index()] = Some(ctor);
        self
    }

    pub fn is_available(&self, algorithm: Algorithm) -> bool {
        self.slots[algorithm.index()].is_some()
    }

    /// Algorithms without an implementation.
    pub fn missing(&self) -> Vec<Algorithm> {
        Algorithm::ALL
            .iter()
            .copied()
            .filter(|algorithm| !self.is_available(*algorithm))
            .collect()
    }

    /// Hash `data` with a fresh instance of `algorithm`.
    pub fn run(&self, algorithm: Algorithm, data: &[u8]) -> Result<Digest64, HashError> {
        let ctor = self.slots[algorithm.index()].ok_or(HashError::Unavailable(algorithm))?;

        let mut hasher = ctor();
        hasher.update(data);
        let output = hasher.finalize();

        to_digest64(algorithm, &output)
    }
}

impl Primitives for PrimitiveTable {
    fn run(&self, algorithm: Algorithm, data: &[u8]) -> Result<Digest64, HashError> {
        PrimitiveTable::run(self, algorithm, data)
    }
}

impl Default for PrimitiveTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for PrimitiveTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let available: Vec<&str> = Algorithm::ALL
            .iter()
            .filter(|algorithm| self.is_available(**algorithm))
            .map(|algorithm| algorithm.name())
            .collect();
        f.debug_struct("PrimitiveTable")
            .field("available", &available)
            .finish()
    }
}

/// Check a primitive's output length and copy it into a [`Digest64`].
pub fn to_digest64(algorithm: Algorithm, output: &[u8]) -> Result<Digest64, HashError> {
    if output.len() != DIGEST64_LEN {
        return Err(HashError::OutputSize {
            algorithm,
            len: output.len(),
        });
    }

    let mut digest = [0u8; DIGEST64_LEN];
    digest.copy_from_slice(output);
    Ok(digest)
}

/// Result of a traced hash: the output plus the algorithm used each round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouletteTrace {
    pub hash: Hash256,
    pub algorithms: [Algorithm; ROUNDS],
}

/// Computes RouletteHash over a set of primitives.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouletteHasher<P = PrimitiveTable> {
    primitives: P,
}

impl RouletteHasher<PrimitiveTable> {
    /// Hasher over [`PrimitiveTable::builtin`].
    pub fn builtin() -> Self {
        RouletteHasher::new(PrimitiveTable::builtin())
    }
}

impl<P: Primitives> RouletteHasher<P> {
    pub fn new(primitives: P) -> Self {
        RouletteHasher { primitives }
    }

    pub fn primitives(&self) -> &P {
        &self.primitives
    }

    /// Hash `input` to the 256-bit proof-of-work value.
    pub fn hash(&self, input: &[u8]) -> Result<Hash256, HashError> {
        self.trace(input).map(|traced| traced.hash)
    }

    /// Hash `input` and report which algorithm ran in each round.
    pub fn trace(&self, input: &[u8]) -> Result<RouletteTrace, HashError> {
        let mut digest: Digest64 = [0u8; DIGEST64_LEN];
        digest.copy_from_slice(&Sha512::digest(input));

        let mut algorithms = [Algorithm::Blake512; ROUNDS];
        for slot in algorithms.iter_mut() {
            let algorithm = Algorithm::from_selector(digest[0]);
            digest = self.primitives.run(algorithm, &digest)?;
            *slot = algorithm;
        }
        trace!("roulette rounds: {:?}", algorithms);

        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest[..32]);
        Ok(RouletteTrace {
            hash: Hash256::from_bytes(bytes),
            algorithms,
        })
    }
}

/// RouletteHash of `input` using `primitives`.
pub fn roulette_hash<P: Primitives>(input: &[u8], primitives: &P) -> Result<Hash256, HashError> {
    RouletteHasher::new(primitives).hash(input)
}
