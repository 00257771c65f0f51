//! Skeletons and model-space poses.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};

use crate::{AnimError, AnimationClip};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct JointTransform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl JointTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY)
    }

    /// Linear translation, spherical rotation.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            translation: self.translation.lerp(other.translation, t),
            rotation: self.rotation.slerp(other.rotation, t),
        }
    }
}

impl Default for JointTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Joint {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub parent: Option<usize>,
    /// Model-space bind transform.
    #[cfg_attr(feature = "serde", serde(default))]
    pub bind: JointTransform,
}

impl Joint {
    pub fn root(name: impl Into<String>, bind: JointTransform) -> Self {
        Self {
            name: name.into(),
            parent: None,
            bind,
        }
    }

    pub fn child(name: impl Into<String>, parent: usize, bind: JointTransform) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent),
            bind,
        }
    }
}

/// Joint hierarchy; every joint is declared after its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    joints: Vec<Joint>,
    by_name: BTreeMap<String, usize>,
}

impl Skeleton {
    pub fn new(joints: Vec<Joint>) -> Result<Self, AnimError> {
        let mut by_name = BTreeMap::new();
        for (i, joint) in joints.iter().enumerate() {
            if let Some(parent) = joint.parent {
                if parent >= i {
                    return Err(AnimError::JointOrder {
                        joint: joint.name.clone(),
                        parent,
                    });
                }
            }
            if by_name.insert(joint.name.clone(), i).is_some() {
                return Err(AnimError::DuplicateJoint(joint.name.clone()));
            }
        }
        Ok(Self { joints, by_name })
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// `mask[j]` is true for `root` and every joint below it.
    pub fn subtree_mask(&self, root: usize) -> Vec<bool> {
        let mut mask = vec![false; self.joints.len()];
        for (i, joint) in self.joints.iter().enumerate() {
            let inside = i == root || joint.parent.is_some_and(|p| mask[p]);
            mask[i] = inside;
        }
        mask
    }

    pub fn subtree(&self, root: usize) -> Vec<usize> {
        self.subtree_mask(root)
            .into_iter()
            .enumerate()
            .filter_map(|(i, inside)| inside.then_some(i))
            .collect()
    }
}

/// Model-space transforms, one per skeleton joint.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    joints: Vec<JointTransform>,
}

impl Pose {
    pub fn new(joints: Vec<JointTransform>) -> Self {
        Self { joints }
    }

    pub fn bind(skeleton: &Skeleton) -> Self {
        Self {
            joints: skeleton.joints().iter().map(|j| j.bind).collect(),
        }
    }

    pub fn joints(&self) -> &[JointTransform] {
        &self.joints
    }

    pub fn joints_mut(&mut self) -> &mut [JointTransform] {
        &mut self.joints
    }

    pub fn joint(&self, index: usize) -> &JointTransform {
        &self.joints[index]
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// `self` at `alpha = 0`, `other` at `alpha = 1`.
    pub fn blend(&self, other: &Pose, alpha: f32) -> Pose {
        Pose {
            joints: self
                .joints
                .iter()
                .zip(&other.joints)
                .map(|(a, b)| a.lerp(b, alpha))
                .collect(),
        }
    }

    /// Move the `mask` subtree rigidly so joint `root` lands on `anchor`.
    pub fn reparent(&mut self, root: usize, anchor: &JointTransform, mask: &[bool]) {
        let from = self.joints[root];
        let delta = anchor.rotation * from.rotation.inverse();
        for (joint, _) in self
            .joints
            .iter_mut()
            .zip(mask)
            .filter(|(_, inside)| **inside)
        {
            joint.translation = anchor.translation + delta * (joint.translation - from.translation);
            joint.rotation = (delta * joint.rotation).normalize();
        }
    }

    /// Blend `other` over `self` by `weight`, only for joints inside `mask`.
    pub fn blend_masked(&mut self, other: &Pose, weight: f32, mask: &[bool]) {
        for ((joint, over), _) in self
            .joints
            .iter_mut()
            .zip(&other.joints)
            .zip(mask)
            .filter(|(_, inside)| **inside)
        {
            *joint = joint.lerp(over, weight);
        }
    }
}

/// Samples a clip into a model-space pose. Clip decoding lives outside this crate.
pub trait PoseSampler {
    fn sample(&self, clip: &AnimationClip, time: f32, skeleton: &Skeleton) -> Pose;
}

/// Bind pose displaced by the clip's root motion. Enough for headless simulation.
#[derive(Debug, Default, Clone, Copy)]
pub struct BindPoseSampler;

impl PoseSampler for BindPoseSampler {
    fn sample(&self, clip: &AnimationClip, time: f32, skeleton: &Skeleton) -> Pose {
        let mut pose = Pose::bind(skeleton);
        let offset = clip.root_translation_at(time).unwrap_or(Vec3::ZERO);
        let rotation = clip.root_rotation_at(time).unwrap_or(Quat::IDENTITY);
        for joint in pose.joints_mut() {
            joint.translation = rotation * joint.translation + offset;
            joint.rotation = rotation * joint.rotation;
        }
        pose
    }
}
