//! Leaf nodes that drive animation from a behavior tree.

use ai_bt::{
    optional_attribute, required_attribute, Attributes, Behavior, BtError, NodeRegistry,
    NodeScope, Status,
};

use crate::SimWorld;

/// Crossfades the character to an animation state.
///
/// Attributes: `State` (required), `Track` (default 0), `Blend` in seconds (default 0.2) and
/// `WaitForEnd` (default true). With `WaitForEnd`, a non-looping clip keeps the node running
/// until it reaches its last frame. Fails when the state cannot be played or another node
/// replaced it on the track.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayAnimation {
    pub state: String,
    pub track: usize,
    pub blend: f32,
    pub wait_for_end: bool,
}

impl PlayAnimation {
    pub const TYPE_NAME: &'static str = "PlayAnimation";

    pub fn from_attributes(attrs: &Attributes) -> Result<Self, BtError> {
        let name = Self::TYPE_NAME;
        let blend: f32 = optional_attribute(name, attrs, "Blend", 0.2)?;
        if !blend.is_finite() || blend < 0.0 {
            return Err(BtError::InvalidAttribute {
                type_name: name.to_string(),
                attribute: "Blend".to_string(),
                value: blend.to_string(),
            });
        }
        Ok(Self {
            state: required_attribute(name, attrs, "State")?,
            track: optional_attribute(name, attrs, "Track", 0)?,
            blend,
            wait_for_end: optional_attribute(name, attrs, "WaitForEnd", true)?,
        })
    }
}

impl Behavior<SimWorld> for PlayAnimation {
    fn spawn(&self, scope: &mut NodeScope<'_, SimWorld>) {
        scope
            .world
            .play(scope.agent, self.track, &self.state, self.blend);
    }

    fn tick(&self, scope: &mut NodeScope<'_, SimWorld>) -> Status {
        let Some(machine) = scope.world.machine(scope.agent) else {
            return Status::Failure;
        };
        if self.track >= machine.track_count() {
            return Status::Failure;
        }
        let clip = match machine.current_state(self.track) {
            Some(state) if state.name() == self.state => state.clip(),
            _ => return Status::Failure,
        };
        if !self.wait_for_end || clip.looping || machine.current_time(self.track) >= clip.duration
        {
            Status::Success
        } else {
            Status::Running
        }
    }
}

/// Built-in node types plus the simulation leaves.
pub fn registry() -> NodeRegistry<SimWorld> {
    let mut registry = NodeRegistry::new();
    registry.register_behavior(PlayAnimation::TYPE_NAME, PlayAnimation::from_attributes);
    registry
}
