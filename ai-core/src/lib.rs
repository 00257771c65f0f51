//! Deterministic, engine-agnostic primitives shared by the character runtime.
//!
//! Nothing in here reads a wall clock or a global RNG: time, seeds and character handles are
//! always passed in explicitly.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod blackboard;
pub mod rng;
pub mod tick;
pub mod world;

pub use agent::{AgentId, CharacterId};
pub use blackboard::{BbKey, Blackboard};
pub use rng::{DeterministicRng, SplitMix64};
pub use tick::TickContext;
pub use world::{WorldMut, WorldView};
