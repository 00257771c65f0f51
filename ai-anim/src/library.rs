use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{AnimError, AnimationClip};

/// Source of clip data, queried by state name.
pub trait ClipProvider {
    fn clip(&self, name: &str) -> Option<Arc<AnimationClip>>;
}

/// In-memory clip table shared by every state machine that loads from it.
#[derive(Debug, Clone, Default)]
pub struct ClipLibrary {
    clips: BTreeMap<String, Arc<AnimationClip>>,
}

impl ClipLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store `clip` under its own name, replacing any clip of that name.
    pub fn insert(&mut self, clip: AnimationClip) -> Result<Arc<AnimationClip>, AnimError> {
        let clip = Arc::new(clip.validate()?);
        self.clips.insert(clip.name.clone(), Arc::clone(&clip));
        Ok(clip)
    }

    pub fn from_clips(clips: impl IntoIterator<Item = AnimationClip>) -> Result<Self, AnimError> {
        let mut library = Self::new();
        for clip in clips {
            library.insert(clip)?;
        }
        Ok(library)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<AnimationClip>> {
        self.clips.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.clips.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

impl ClipProvider for ClipLibrary {
    fn clip(&self, name: &str) -> Option<Arc<AnimationClip>> {
        self.clips.get(name).cloned()
    }
}
