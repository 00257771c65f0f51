use crate::{rng, AgentId, SplitMix64};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-frame simulation clock.
///
/// `now_seconds` is the absolute simulation time at the start of the frame; `dt_seconds` is the
/// length of the frame being simulated. Both are supplied by the caller so that trees and state
/// machines never read a wall clock.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TickContext {
    pub tick: u64,
    pub dt_seconds: f32,
    pub now_seconds: f64,
    pub seed: u64,
}

impl TickContext {
    pub fn new(seed: u64, dt_seconds: f32) -> Self {
        Self {
            tick: 0,
            dt_seconds,
            now_seconds: 0.0,
            seed,
        }
    }

    /// The context of the next frame, `dt_seconds` later.
    pub fn next(&self) -> Self {
        Self {
            tick: self.tick.wrapping_add(1),
            dt_seconds: self.dt_seconds,
            now_seconds: self.now_seconds + f64::from(self.dt_seconds),
            seed: self.seed,
        }
    }

    pub fn with_dt(mut self, dt_seconds: f32) -> Self {
        self.dt_seconds = dt_seconds;
        self
    }

    pub fn rng_for_agent<A: AgentId>(&self, agent: A, stream: u64) -> SplitMix64 {
        let seed = rng::derive_seed(self.seed, agent.stable_id(), stream);
        SplitMix64::new(seed)
    }
}
