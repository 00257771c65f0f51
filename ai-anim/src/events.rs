use ai_core::CharacterId;

use crate::EventPayload;

/// A timed clip event that fired during playback.
#[derive(Debug, Clone, PartialEq)]
pub struct FiredEvent {
    pub name: String,
    pub character: CharacterId,
    pub track: usize,
    pub state: String,
    pub collision_index: i32,
    pub flag: bool,
    pub damage_type: Option<u32>,
    pub damage: Option<f32>,
}

impl FiredEvent {
    pub fn payload(&self) -> EventPayload {
        EventPayload {
            collision_index: self.collision_index,
            flag: self.flag,
            damage_type: self.damage_type,
            damage: self.damage,
        }
    }
}

/// Receiver for animation events (hit frames, footsteps, sounds).
pub trait AnimationEventSink {
    fn fire(&mut self, event: FiredEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

impl AnimationEventSink for NullEventSink {
    fn fire(&mut self, _event: FiredEvent) {}
}

#[derive(Debug, Default)]
pub struct VecEventSink {
    pub events: Vec<FiredEvent>,
}

impl VecEventSink {
    pub fn names(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl AnimationEventSink for VecEventSink {
    fn fire(&mut self, event: FiredEvent) {
        self.events.push(event);
    }
}
