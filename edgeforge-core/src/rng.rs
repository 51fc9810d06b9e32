//! Deterministic RNG hierarchy.
//!
//! A master seed generates a sub-seed for each `(stream, major, minor)` unit of
//! work: seeding slot, `(generation, offspring slot)`, Monte Carlo simulation.
//! Sub-seeds are BLAKE3 hashes, so they do not depend on the order or thread
//! in which units are processed.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Independent random streams used by one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RngStream {
    /// Initial population; major = slot.
    Seeding,
    /// Offspring creation; major = generation, minor = slot.
    Offspring,
    /// Trade-order permutations; major = simulation.
    MonteCarlo,
}

impl RngStream {
    fn tag(self) -> &'static [u8] {
        match self {
            RngStream::Seeding => b"seeding",
            RngStream::Offspring => b"offspring",
            RngStream::MonteCarlo => b"monte-carlo",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Deterministic sub-seed for one unit of work.
    pub fn sub_seed(&self, stream: RngStream, major: u64, minor: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(stream.tag());
        hasher.update(&major.to_le_bytes());
        hasher.update(&minor.to_le_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hasher.finalize().as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    pub fn rng_for(&self, stream: RngStream, major: u64, minor: u64) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(stream, major, minor))
    }
}
