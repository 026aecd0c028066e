//! Deterministic seed derivation for execution randomness.
//!
//! A master seed expands into per-(symbol, timeframe) sub-seeds via BLAKE3
//! hashing. Derivation is hash-based rather than order-dependent, so a batch
//! produces identical slippage draws no matter which order its runs execute
//! in — and every draw is reproducible from the master seed alone.

use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone)]
pub struct SeedHierarchy {
    master_seed: u64,
}

impl SeedHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive a deterministic sub-seed for a (symbol, timeframe) pair.
    pub fn sub_seed(&self, symbol: &str, timeframe: &str) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(symbol.as_bytes());
        hasher.update(b"@");
        hasher.update(timeframe.as_bytes());
        let hash = hasher.finalize();
        u64::from_le_bytes(hash.as_bytes()[..8].try_into().unwrap())
    }

    /// Seeded RNG for one (symbol, timeframe) run.
    pub fn rng_for(&self, symbol: &str, timeframe: &str) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(symbol, timeframe))
    }
}
