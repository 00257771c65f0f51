//! Seedable randomness for random composites.
//!
//! Every stream is derived from `(global seed, character, stream id)`, so two characters
//! running the same tree shuffle independently yet replay identically under the same seed.
//! Not cryptographic.

pub trait DeterministicRng {
    fn next_u64(&mut self) -> u64;

    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform integer in `0..bound`; 0 when `bound` is 0.
    fn next_below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        // Lemire's multiply-shift reduction.
        ((u64::from(self.next_u32()) * u64::from(bound)) >> 32) as u32
    }

    /// Fisher-Yates, uniform over all permutations of `items`.
    fn shuffle<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..items.len()).rev() {
            let j = self.next_below((i + 1) as u32) as usize;
            items.swap(i, j);
        }
    }
}

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }
}

impl DeterministicRng for SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        mix64(self.state)
    }
}

/// SplitMix64 finalizer.
pub fn mix64(mut x: u64) -> u64 {
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Seed of one character's stream.
pub fn derive_seed(global_seed: u64, character: u64, stream: u64) -> u64 {
    mix64(global_seed ^ mix64(character.wrapping_add(GOLDEN_GAMMA)) ^ mix64(stream))
}
