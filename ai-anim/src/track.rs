use ai_core::CharacterId;
use bit_vec::BitVec;
use glam::Vec3;

use crate::{AnimationEventSink, AnimationState, FiredEvent, Pose, PoseSampler, Skeleton};

/// Tolerance below which a remaining crossfade counts as finished.
pub const TIME_EPSILON: f32 = 1e-6;

/// Where fired events go during one update or transition.
pub(crate) struct EventTarget<'a> {
    pub(crate) character: CharacterId,
    pub(crate) sink: &'a mut dyn AnimationEventSink,
}

/// One playback channel of a state machine.
///
/// Track 0 is the full-body base and always has weight 1. Higher tracks are overlays rooted at a
/// joint; they fade in at the start of their clip and out near its end.
#[derive(Debug, Clone)]
pub struct AnimationTrack {
    index: usize,
    current: Option<AnimationState>,
    current_time: f32,
    loop_count: u32,
    previous: Option<AnimationState>,
    previous_time: f32,
    previous_interrupted: bool,
    crossfade_remaining: f32,
    crossfade_full: f32,
    blend_weight: f32,
    blend_fade_duration: f32,
    root_joint: Option<String>,
    fired: BitVec,
    root_motion: Vec3,
}

impl AnimationTrack {
    pub fn base() -> Self {
        Self::with_index(0, None, 0.0)
    }

    pub fn overlay(index: usize, root_joint: impl Into<String>, blend_fade_duration: f32) -> Self {
        assert!(index > 0, "track 0 is the base track");
        Self::with_index(index, Some(root_joint.into()), blend_fade_duration)
    }

    fn with_index(index: usize, root_joint: Option<String>, blend_fade_duration: f32) -> Self {
        Self {
            index,
            current: None,
            current_time: 0.0,
            loop_count: 0,
            previous: None,
            previous_time: 0.0,
            previous_interrupted: false,
            crossfade_remaining: 0.0,
            crossfade_full: 0.0,
            blend_weight: if index == 0 { 1.0 } else { 0.0 },
            blend_fade_duration: blend_fade_duration.max(0.0),
            root_joint,
            fired: BitVec::new(),
            root_motion: Vec3::ZERO,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_overlay(&self) -> bool {
        self.index > 0
    }

    pub fn current_state(&self) -> Option<&AnimationState> {
        self.current.as_ref()
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    pub fn previous_state(&self) -> Option<&AnimationState> {
        self.previous.as_ref()
    }

    pub fn previous_time(&self) -> f32 {
        self.previous_time
    }

    pub fn is_previous_interrupted(&self) -> bool {
        self.previous_interrupted
    }

    pub fn crossfade_remaining(&self) -> f32 {
        self.crossfade_remaining
    }

    pub fn crossfade_duration(&self) -> f32 {
        self.crossfade_full
    }

    /// 0 when a crossfade starts, 1 when it is over (or was instant).
    pub fn crossfade_alpha(&self) -> f32 {
        if self.crossfade_full <= 0.0 {
            return 1.0;
        }
        ((self.crossfade_full - self.crossfade_remaining) / self.crossfade_full).clamp(0.0, 1.0)
    }

    pub fn blend_weight(&self) -> f32 {
        self.blend_weight
    }

    pub fn blend_fade_duration(&self) -> f32 {
        self.blend_fade_duration
    }

    pub fn root_joint(&self) -> Option<&str> {
        self.root_joint.as_deref()
    }

    /// Root translation the current clip covered during the last update.
    pub fn root_motion_delta(&self) -> Vec3 {
        self.root_motion
    }

    /// Fade the overlay toward 0. The base track never fades.
    pub fn nullify(&mut self, dt: f32, instant: bool) {
        if !self.is_overlay() {
            return;
        }
        self.blend_weight = if instant || self.blend_fade_duration <= 0.0 {
            0.0
        } else {
            (self.blend_weight - dt / self.blend_fade_duration).max(0.0)
        };
    }

    /// Fade the overlay toward 1.
    pub fn validate(&mut self, dt: f32, instant: bool) {
        if !self.is_overlay() {
            return;
        }
        self.blend_weight = if instant || self.blend_fade_duration <= 0.0 {
            1.0
        } else {
            (self.blend_weight + dt / self.blend_fade_duration).min(1.0)
        };
    }

    /// Start playing `state` immediately, with no crossfade.
    pub(crate) fn set_initial(&mut self, state: AnimationState, target: &mut EventTarget<'_>) {
        self.previous = None;
        self.crossfade_remaining = 0.0;
        self.crossfade_full = 0.0;
        self.loop_count = 0;
        self.start(state, 0.0, target);
    }

    pub(crate) fn transit_to(
        &mut self,
        state: AnimationState,
        duration: f32,
        interrupting: bool,
        start_time: f32,
        target: &mut EventTarget<'_>,
    ) {
        let mut duration = duration.max(0.0);
        if let Some(current) = &self.current {
            let clip = current.clip();
            let (clip_duration, speed) = (clip.duration, clip.speed);
            self.fire_due(clip_duration, true, target);
            self.reset_fired();
            duration = duration.min(((clip_duration - start_time) * speed).max(0.0));
        }

        if self.crossfade_remaining <= 0.0 {
            self.loop_count = 0;
            self.demote_current(interrupting);
            self.crossfade_remaining = duration;
            self.crossfade_full = duration;
        } else {
            let remaining = (duration - self.crossfade_full + self.crossfade_remaining).max(0.0);
            self.crossfade_remaining = remaining;
            self.crossfade_full = remaining;
            if self.previous.is_none() {
                self.demote_current(interrupting);
            }
            self.loop_count = 0;
        }

        tracing::debug!(
            track = self.index,
            from = self.previous.as_ref().map(AnimationState::name),
            to = state.name(),
            duration = self.crossfade_full,
            "animation transition"
        );
        self.start(state, start_time, target);

        if self.previous.is_none() || self.crossfade_remaining <= 0.0 {
            self.previous = None;
            self.crossfade_remaining = 0.0;
            self.crossfade_full = 0.0;
        }
    }

    fn demote_current(&mut self, interrupting: bool) {
        if let Some(current) = self.current.take() {
            self.previous = Some(current);
            self.previous_time = self.current_time;
            self.previous_interrupted = interrupting;
        }
    }

    fn start(&mut self, state: AnimationState, start_time: f32, target: &mut EventTarget<'_>) {
        self.current_time = start_time.max(0.0);
        self.current = Some(state);
        self.reset_fired();
        self.fire_due(self.current_time, false, target);
    }

    pub(crate) fn update(&mut self, dt: f32, target: &mut EventTarget<'_>) {
        if self.previous.is_none() || self.crossfade_remaining <= 0.0 {
            self.previous = None;
        }
        self.root_motion = Vec3::ZERO;

        if let Some(state) = self.current.clone() {
            let clip = state.clip();
            let duration = clip.duration;
            let from = self.current_time;
            let end = from + dt * clip.speed;

            if end >= duration {
                if clip.looping {
                    self.fire_due(duration, false, target);
                    self.reset_fired();
                    let wraps = (end / duration).floor().max(1.0);
                    self.current_time = (end - wraps * duration).max(0.0);
                    self.loop_count = self.loop_count.saturating_add(wraps as u32);
                    self.fire_due(self.current_time, false, target);
                    self.root_motion =
                        clip.root_translation_delta(from, self.current_time, wraps as u32);
                } else if from < duration {
                    // Memory stays set so a later transition flush cannot refire.
                    self.current_time = duration;
                    self.fire_due(duration, false, target);
                    self.root_motion = clip.root_translation_delta(from, duration, 0);
                } else {
                    self.nullify(dt, false);
                }
            } else {
                if self.is_overlay() {
                    if from + self.blend_fade_duration >= duration {
                        self.nullify(dt, false);
                    } else if from <= self.blend_fade_duration {
                        self.validate(dt, false);
                    }
                }
                self.current_time = end;
                self.fire_due(end, false, target);
                self.root_motion = clip.root_translation_delta(from, end, 0);
            }
        }

        if let Some(previous) = &self.previous {
            if self.crossfade_remaining > 0.0 {
                if !self.previous_interrupted {
                    let clip = previous.clip();
                    let time = self.previous_time + dt * clip.speed;
                    self.previous_time = if clip.looping {
                        time.rem_euclid(clip.duration)
                    } else {
                        time.min(clip.duration)
                    };
                }
                self.crossfade_remaining = (self.crossfade_remaining - dt).max(0.0);
                if self.crossfade_remaining <= TIME_EPSILON {
                    self.crossfade_remaining = 0.0;
                    self.previous = None;
                }
            }
        }
    }

    fn reset_fired(&mut self) {
        let len = self.current.as_ref().map_or(0, |s| s.clip().events.len());
        self.fired = BitVec::from_elem(len, false);
    }

    /// Fire every not-yet-fired event at or before `upto`. A transition flush only fires
    /// persisting events.
    fn fire_due(&mut self, upto: f32, transitting: bool, target: &mut EventTarget<'_>) {
        let Some(state) = &self.current else {
            return;
        };
        for (i, event) in state.clip().events.iter().enumerate() {
            if event.time > upto {
                break;
            }
            if self.fired.get(i).unwrap_or(true) || (transitting && !event.persisting) {
                continue;
            }
            self.fired.set(i, true);
            tracing::trace!(
                character = %target.character,
                track = self.index,
                state = state.name(),
                event = %event.name,
                time = event.time,
                "animation event"
            );
            target.sink.fire(FiredEvent {
                name: event.name.clone(),
                character: target.character,
                track: self.index,
                state: state.name().to_string(),
                collision_index: event.payload.collision_index,
                flag: event.payload.flag,
                damage_type: event.payload.damage_type,
                damage: event.payload.damage,
            });
        }
    }

    /// Current pose of this track, crossfaded with the outgoing state. `None` without a state.
    pub fn sample_pose(&self, skeleton: &Skeleton, sampler: &dyn PoseSampler) -> Option<Pose> {
        let current = self.current.as_ref()?;
        let pose = sampler.sample(current.clip(), self.current_time, skeleton);
        match &self.previous {
            Some(previous) if self.crossfade_remaining > 0.0 => {
                let from = sampler.sample(previous.clip(), self.previous_time, skeleton);
                Some(from.blend(&pose, self.crossfade_alpha()))
            }
            _ => Some(pose),
        }
    }
}
