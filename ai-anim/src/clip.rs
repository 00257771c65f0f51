use glam::{Quat, Vec3};

use crate::AnimError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Data handed to the event sink when a timed event fires.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EventPayload {
    pub collision_index: i32,
    pub flag: bool,
    pub damage_type: Option<u32>,
    pub damage: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimedEvent {
    pub time: f32,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub payload: EventPayload,
    /// Persisting events still fire when the clip is left before reaching them.
    #[cfg_attr(feature = "serde", serde(default))]
    pub persisting: bool,
}

impl TimedEvent {
    pub fn new(time: f32, name: impl Into<String>) -> Self {
        Self {
            time,
            name: name.into(),
            payload: EventPayload::default(),
            persisting: false,
        }
    }

    pub fn with_payload(mut self, payload: EventPayload) -> Self {
        self.payload = payload;
        self
    }

    pub fn persisting(mut self) -> Self {
        self.persisting = true;
        self
    }
}

/// Root joint samples spaced evenly over the clip, first at 0, last at the clip's duration.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RootMotion {
    pub translations: Vec<Vec3>,
    pub rotations: Vec<Quat>,
}

impl RootMotion {
    fn position(samples: usize, time: f32, duration: f32) -> (usize, usize, f32) {
        let last = samples - 1;
        let u = (time / duration).clamp(0.0, 1.0) * last as f32;
        let i = (u.floor() as usize).min(last);
        (i, (i + 1).min(last), u - i as f32)
    }

    pub fn translation_at(&self, time: f32, duration: f32) -> Option<Vec3> {
        if self.translations.is_empty() {
            return None;
        }
        let (i, j, t) = Self::position(self.translations.len(), time, duration);
        Some(self.translations[i].lerp(self.translations[j], t))
    }

    pub fn rotation_at(&self, time: f32, duration: f32) -> Option<Quat> {
        if self.rotations.is_empty() {
            return None;
        }
        let (i, j, t) = Self::position(self.rotations.len(), time, duration);
        Some(self.rotations[i].slerp(self.rotations[j], t))
    }
}

/// Immutable animation data, shared by every character that plays it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub looping: bool,
    #[cfg_attr(feature = "serde", serde(default = "default_speed"))]
    pub speed: f32,
    /// Sorted by time.
    #[cfg_attr(feature = "serde", serde(default))]
    pub events: Vec<TimedEvent>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub root_motion: Option<RootMotion>,
}

#[cfg(feature = "serde")]
fn default_speed() -> f32 {
    1.0
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
            looping: false,
            speed: 1.0,
            events: Vec::new(),
            root_motion: None,
        }
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Add an event, keeping the list ordered by time.
    pub fn with_event(mut self, event: TimedEvent) -> Self {
        let at = self.events.partition_point(|e| e.time <= event.time);
        self.events.insert(at, event);
        self
    }

    pub fn with_root_motion(mut self, root_motion: RootMotion) -> Self {
        self.root_motion = Some(root_motion);
        self
    }

    /// Check the invariants playback relies on, sorting events if a loader left them unordered.
    pub fn validate(mut self) -> Result<Self, AnimError> {
        self.check()?;
        self.events.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(self)
    }

    /// Positive finite duration, non-negative finite speed, every event inside the clip.
    pub fn check(&self) -> Result<(), AnimError> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(AnimError::InvalidDuration {
                clip: self.name.clone(),
                duration: self.duration,
            });
        }
        if !(self.speed.is_finite() && self.speed >= 0.0) {
            return Err(AnimError::InvalidSpeed {
                clip: self.name.clone(),
                speed: self.speed,
            });
        }
        if let Some(event) = self
            .events
            .iter()
            .find(|e| !(0.0..=self.duration).contains(&e.time))
        {
            return Err(AnimError::EventOutOfRange {
                clip: self.name.clone(),
                event: event.name.clone(),
                time: event.time,
            });
        }
        Ok(())
    }

    pub(crate) fn events_sorted(&self) -> bool {
        self.events.windows(2).all(|pair| pair[0].time <= pair[1].time)
    }

    pub fn root_translation_at(&self, time: f32) -> Option<Vec3> {
        self.root_motion
            .as_ref()?
            .translation_at(time, self.duration)
    }

    pub fn root_rotation_at(&self, time: f32) -> Option<Quat> {
        self.root_motion.as_ref()?.rotation_at(time, self.duration)
    }

    /// Root translation covered when playback moves from `from` to `to`, crossing the loop
    /// boundary `wraps` times.
    pub fn root_translation_delta(&self, from: f32, to: f32, wraps: u32) -> Vec3 {
        let at = |t: f32| self.root_translation_at(t).unwrap_or(Vec3::ZERO);
        if self.root_motion.is_none() {
            return Vec3::ZERO;
        }
        if wraps == 0 {
            return at(to) - at(from);
        }
        let full_loop = at(self.duration) - at(0.0);
        (at(self.duration) - at(from)) + (at(to) - at(0.0)) + full_loop * (wraps - 1) as f32
    }
}
