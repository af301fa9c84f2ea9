use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seedable source for everything the hardware leaves undefined at power-on
pub struct Random {
    rng: StdRng,
    initial_seed: u64,
}

impl Random {
    /// `None` picks a fresh seed; either way the seed is kept so a run can be replayed
    pub fn new(seed: Option<u64>) -> Self {
        let initial_seed = seed.unwrap_or_else(|| rand::rng().random());
        Self {
            rng: StdRng::seed_from_u64(initial_seed),
            initial_seed,
        }
    }

    pub fn initial_seed(&self) -> u64 {
        self.initial_seed
    }

    /// Uniform in `0..bound`; `bound` must be non-zero
    pub fn next_below(&mut self, bound: u16) -> u16 {
        self.rng.random_range(0..bound)
    }

    pub fn fill(&mut self, buf: &mut [u8]) {
        self.rng.fill(buf);
    }
}
