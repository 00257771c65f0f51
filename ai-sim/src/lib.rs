//! Headless harness: one behavior tree per scenario, shared by every character, with
//! [`PlayAnimation`] leaves driving each character's animation state machine.
//!
//! A frame ticks every character's tree in character order, then advances every animation by
//! the same `dt`. Animation events fired during the frame are collected into its
//! [`FrameReport`].

#![forbid(unsafe_code)]

pub mod behaviors;
pub mod config;
pub mod sim;
pub mod world;

pub use behaviors::{registry, PlayAnimation};
pub use config::{load_document, CharacterConfig, Scenario, ScenarioConfig};
pub use sim::{CharacterFrame, FrameReport, Simulation, TRACE_ANIM_EVENT};
pub use world::SimWorld;
