use std::collections::BTreeMap;
use std::sync::Arc;

use ai_core::CharacterId;
use glam::Vec3;

use crate::track::EventTarget;
use crate::{
    AnimError, AnimationClip, AnimationEventSink, AnimationState, AnimationTrack, AnimatorConfig,
    ClipProvider, Pose, PoseSampler, Skeleton,
};

/// Per-character animation controller: a state table and a fixed set of tracks.
#[derive(Debug, Clone)]
pub struct AnimationStateMachine {
    owner: CharacterId,
    states: BTreeMap<String, AnimationState>,
    tracks: Vec<AnimationTrack>,
}

impl AnimationStateMachine {
    pub fn new(owner: CharacterId, config: &AnimatorConfig) -> Self {
        let mut tracks = Vec::with_capacity(config.track_count());
        tracks.push(AnimationTrack::base());
        for (i, overlay) in config.overlays.iter().enumerate() {
            tracks.push(AnimationTrack::overlay(
                i + 1,
                overlay.root_joint.clone(),
                config.blend_fade_duration,
            ));
        }
        Self {
            owner,
            states: BTreeMap::new(),
            tracks,
        }
    }

    pub fn owner(&self) -> CharacterId {
        self.owner
    }

    /// # Panics
    ///
    /// Panics if a state called `name` already exists, or if `clip` fails
    /// [`AnimationClip::check`] or has unordered events. Clips from a [`crate::ClipLibrary`]
    /// are already validated.
    pub fn add_state(&mut self, name: impl Into<String>, clip: Arc<AnimationClip>) -> &AnimationState {
        let name = name.into();
        if let Err(err) = clip.check() {
            panic!("animation state '{name}' for {}: {err}", self.owner);
        }
        assert!(
            clip.events_sorted(),
            "animation state '{name}' for {}: clip '{}' has unordered events",
            self.owner,
            clip.name
        );
        assert!(
            !self.states.contains_key(&name),
            "animation state '{name}' registered twice for {}",
            self.owner
        );
        self.states
            .entry(name.clone())
            .or_insert_with(|| AnimationState::new(name, clip))
    }

    /// Add one state per name, each playing the provider's clip of the same name.
    pub fn load_states<I, S>(&mut self, provider: &dyn ClipProvider, names: I) -> Result<(), AnimError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            let clip = provider
                .clip(name)
                .ok_or_else(|| AnimError::UnknownClip(name.to_string()))?;
            self.add_state(name, clip);
        }
        Ok(())
    }

    pub fn state(&self, name: &str) -> Option<&AnimationState> {
        self.states.get(name)
    }

    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    pub fn tracks(&self) -> &[AnimationTrack] {
        &self.tracks
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// # Panics
    ///
    /// Panics if `index` is not a track of this machine.
    pub fn track(&self, index: usize) -> &AnimationTrack {
        match self.tracks.get(index) {
            Some(track) => track,
            None => panic!(
                "{} has {} animation tracks, no track {index}",
                self.owner,
                self.tracks.len()
            ),
        }
    }

    fn lookup(&self, track: usize, name: &str) -> Option<AnimationState> {
        // Panics on a bad track index even when the name is unknown.
        let _ = self.track(track);
        let state = self.states.get(name).cloned();
        if state.is_none() {
            tracing::warn!(character = %self.owner, track, state = name, "unknown animation state");
        }
        state
    }

    /// Start `name` on `track` without a crossfade. An unknown name leaves the track untouched.
    pub fn set_initial_state(
        &mut self,
        track: usize,
        name: &str,
        sink: &mut dyn AnimationEventSink,
    ) -> Option<&AnimationState> {
        let state = self.lookup(track, name)?;
        let mut target = EventTarget {
            character: self.owner,
            sink,
        };
        let track = &mut self.tracks[track];
        track.set_initial(state, &mut target);
        track.current_state()
    }

    /// Crossfade `track` to `name` over `duration` seconds, starting the new clip at
    /// `start_time`. With `interrupting`, the outgoing clip freezes during the blend.
    ///
    /// Returns the new current state, or `None` (and logs) if no state has that name.
    pub fn transit_to(
        &mut self,
        track: usize,
        name: &str,
        duration: f32,
        interrupting: bool,
        start_time: f32,
        sink: &mut dyn AnimationEventSink,
    ) -> Option<&AnimationState> {
        let state = self.lookup(track, name)?;
        let mut target = EventTarget {
            character: self.owner,
            sink,
        };
        let track = &mut self.tracks[track];
        track.transit_to(state, duration, interrupting, start_time, &mut target);
        track.current_state()
    }

    /// Advance every track by `dt` seconds, in track order.
    pub fn update(&mut self, dt: f32, sink: &mut dyn AnimationEventSink) {
        let mut target = EventTarget {
            character: self.owner,
            sink,
        };
        for track in &mut self.tracks {
            track.update(dt, &mut target);
        }
    }

    pub fn current_state(&self, track: usize) -> Option<&AnimationState> {
        self.track(track).current_state()
    }

    pub fn previous_state(&self, track: usize) -> Option<&AnimationState> {
        self.track(track).previous_state()
    }

    pub fn crossfade_alpha(&self, track: usize) -> f32 {
        self.track(track).crossfade_alpha()
    }

    pub fn blend_weight(&self, track: usize) -> f32 {
        self.track(track).blend_weight()
    }

    pub fn loop_count(&self, track: usize) -> u32 {
        self.track(track).loop_count()
    }

    pub fn current_time(&self, track: usize) -> f32 {
        self.track(track).current_time()
    }

    /// Root translation of the base track over the last update.
    pub fn root_motion_delta(&self) -> Vec3 {
        self.track(0).root_motion_delta()
    }

    /// Full-body pose: the base track, then each active overlay blended over its joint subtree
    /// in track order.
    pub fn compose_pose(&self, skeleton: &Skeleton, sampler: &dyn PoseSampler) -> Pose {
        let mut pose = self
            .track(0)
            .sample_pose(skeleton, sampler)
            .unwrap_or_else(|| Pose::bind(skeleton));

        for track in &self.tracks[1..] {
            let weight = track.blend_weight();
            if weight <= 0.0 {
                continue;
            }
            let Some(root_name) = track.root_joint() else {
                continue;
            };
            let Some(root) = skeleton.find(root_name) else {
                tracing::warn!(
                    character = %self.owner,
                    track = track.index(),
                    joint = root_name,
                    "overlay root joint missing from skeleton"
                );
                continue;
            };
            let Some(mut overlay) = track.sample_pose(skeleton, sampler) else {
                continue;
            };

            let mask = skeleton.subtree_mask(root);
            let anchor = *pose.joint(root);
            overlay.reparent(root, &anchor, &mask);
            pose.blend_masked(&overlay, weight, &mask);
        }
        pose
    }
}
