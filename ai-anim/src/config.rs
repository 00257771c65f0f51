use crate::{AnimError, Skeleton};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Track layout and fade timing of a state machine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnimatorConfig {
    /// Seconds an overlay takes to fade fully in or out.
    pub blend_fade_duration: f32,
    /// One entry per overlay track, in blend order.
    pub overlays: Vec<OverlayConfig>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OverlayConfig {
    pub root_joint: String,
}

impl OverlayConfig {
    pub fn new(root_joint: impl Into<String>) -> Self {
        Self {
            root_joint: root_joint.into(),
        }
    }
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            blend_fade_duration: 0.2,
            overlays: vec![OverlayConfig::new("spine")],
        }
    }
}

impl AnimatorConfig {
    /// Base track only.
    pub fn base_only() -> Self {
        Self {
            overlays: Vec::new(),
            ..Self::default()
        }
    }

    pub fn with_overlay(mut self, root_joint: impl Into<String>) -> Self {
        self.overlays.push(OverlayConfig::new(root_joint));
        self
    }

    pub fn with_blend_fade_duration(mut self, seconds: f32) -> Self {
        self.blend_fade_duration = seconds;
        self
    }

    pub fn track_count(&self) -> usize {
        1 + self.overlays.len()
    }

    /// Every overlay root must name a joint of `skeleton`.
    pub fn check_joints(&self, skeleton: &Skeleton) -> Result<(), AnimError> {
        match self
            .overlays
            .iter()
            .find(|o| skeleton.find(&o.root_joint).is_none())
        {
            Some(missing) => Err(AnimError::UnknownJoint(missing.root_joint.clone())),
            None => Ok(()),
        }
    }
}
