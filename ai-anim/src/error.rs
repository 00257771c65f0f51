use thiserror::Error;

/// Errors raised while loading animation data.
///
/// Playback itself never fails: unknown state names during a transition are logged and ignored.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnimError {
    #[error("clip '{clip}' has invalid duration {duration} (must be > 0)")]
    InvalidDuration { clip: String, duration: f32 },

    #[error("clip '{clip}' has invalid playback speed {speed}")]
    InvalidSpeed { clip: String, speed: f32 },

    #[error("clip '{clip}' event '{event}' at {time}s lies outside the clip")]
    EventOutOfRange {
        clip: String,
        event: String,
        time: f32,
    },

    #[error("no clip named '{0}'")]
    UnknownClip(String),

    #[error("joint '{0}' is declared twice")]
    DuplicateJoint(String),

    #[error("joint '{joint}' refers to parent {parent}, which is not declared before it")]
    JointOrder { joint: String, parent: usize },

    #[error("unknown joint '{0}'")]
    UnknownJoint(String),
}
