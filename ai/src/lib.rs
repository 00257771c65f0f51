//! Umbrella crate that re-exports the `ai-*` building blocks.
//!
//! - [`bt`]: resumable behavior trees shared between characters, one execution context each
//! - [`anim`]: multi-track animation state machines with crossfades and timed events
//! - [`core`] and [`tools`]: clocks, character handles, blackboards and trace events

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use ai_core as core;

#[cfg(feature = "tools")]
#[cfg_attr(docsrs, doc(cfg(feature = "tools")))]
pub use ai_tools as tools;

#[cfg(feature = "bt")]
#[cfg_attr(docsrs, doc(cfg(feature = "bt")))]
pub use ai_bt as bt;

#[cfg(feature = "anim")]
#[cfg_attr(docsrs, doc(cfg(feature = "anim")))]
pub use ai_anim as anim;
