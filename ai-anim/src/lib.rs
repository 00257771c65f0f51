//! Per-character animation state machine.
//!
//! An [`AnimationStateMachine`] owns a table of named [`AnimationState`]s and a fixed set of
//! [`AnimationTrack`]s: track 0 plays full-body animation, higher tracks are overlays blended over
//! a joint subtree. Each track advances its clip every frame, wraps or clamps at the end,
//! crossfades between states on transitions and fires timed clip events into an
//! [`AnimationEventSink`] at most once per activation.
//!
//! Clips are immutable and shared by `Arc`; all playback state lives in the tracks.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod clip;
pub mod config;
pub mod error;
pub mod events;
pub mod library;
pub mod machine;
pub mod pose;
pub mod state;
pub mod track;

pub use clip::{AnimationClip, EventPayload, RootMotion, TimedEvent};
pub use config::{AnimatorConfig, OverlayConfig};
pub use error::AnimError;
pub use events::{AnimationEventSink, FiredEvent, NullEventSink, VecEventSink};
pub use library::{ClipLibrary, ClipProvider};
pub use machine::AnimationStateMachine;
pub use pose::{BindPoseSampler, Joint, JointTransform, Pose, PoseSampler, Skeleton};
pub use state::AnimationState;
pub use track::{AnimationTrack, TIME_EPSILON};
