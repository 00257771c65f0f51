use std::sync::Arc;

use crate::AnimationClip;

/// A clip under a symbolic name, the unit the state machine transitions between.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    name: String,
    clip: Arc<AnimationClip>,
}

impl AnimationState {
    pub fn new(name: impl Into<String>, clip: Arc<AnimationClip>) -> Self {
        Self {
            name: name.into(),
            clip,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }
}
