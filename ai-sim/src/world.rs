use std::collections::BTreeMap;

use ai_anim::{AnimationStateMachine, FiredEvent, VecEventSink};
use ai_core::{CharacterId, WorldMut, WorldView};
use glam::Vec3;

/// Characters as the simulation sees them: an animation state machine and a root position
/// driven by root motion.
#[derive(Debug, Default)]
pub struct SimWorld {
    machines: BTreeMap<CharacterId, AnimationStateMachine>,
    positions: BTreeMap<CharacterId, Vec3>,
    events: VecEventSink,
}

impl WorldView for SimWorld {
    type Agent = CharacterId;
}

impl WorldMut for SimWorld {}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_character(&mut self, machine: AnimationStateMachine) {
        let id = machine.owner();
        self.positions.insert(id, Vec3::ZERO);
        self.machines.insert(id, machine);
    }

    pub fn characters(&self) -> impl Iterator<Item = CharacterId> + '_ {
        self.machines.keys().copied()
    }

    pub fn machine(&self, id: CharacterId) -> Option<&AnimationStateMachine> {
        self.machines.get(&id)
    }

    pub fn position(&self, id: CharacterId) -> Vec3 {
        self.positions.get(&id).copied().unwrap_or(Vec3::ZERO)
    }

    /// Start `state` on `track`, crossfading over `blend` seconds.
    ///
    /// Returns false if the character, the track or the state does not exist.
    pub fn play(&mut self, id: CharacterId, track: usize, state: &str, blend: f32) -> bool {
        let Some(machine) = self.machines.get_mut(&id) else {
            tracing::warn!(character = %id, "no animation state machine for character");
            return false;
        };
        if track >= machine.track_count() {
            tracing::warn!(character = %id, track, "animation track out of range");
            return false;
        }
        machine
            .transit_to(track, state, blend, false, 0.0, &mut self.events)
            .is_some()
    }

    /// Set the starting state of a character's base track, firing its start events.
    pub fn set_initial_state(&mut self, id: CharacterId, state: &str) -> bool {
        match self.machines.get_mut(&id) {
            Some(machine) => machine
                .set_initial_state(0, state, &mut self.events)
                .is_some(),
            None => false,
        }
    }

    /// Advance every machine by `dt` and move characters by their base-track root motion.
    pub fn update(&mut self, dt: f32) {
        for (id, machine) in &mut self.machines {
            machine.update(dt, &mut self.events);
            *self.positions.entry(*id).or_default() += machine.root_motion_delta();
        }
    }

    /// Events fired since the last drain, in firing order.
    pub fn drain_events(&mut self) -> Vec<FiredEvent> {
        std::mem::take(&mut self.events.events)
    }
}
