//! Scenario loading.

use std::path::{Path, PathBuf};

use ai_anim::{AnimationClip, AnimatorConfig, Joint};
use ai_bt::TreeDocument;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A scenario file, usually `scenario.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Frames to simulate when the command line does not say otherwise.
    pub frames: u32,

    /// Seconds per frame
    pub dt: f32,

    /// Seed for random composites
    pub seed: u64,

    /// Restart a character's tree once its run finishes
    pub restart: bool,

    /// Mirror status writes and animation events into a trace log
    pub trace: bool,

    /// Tree document (JSON), relative to the scenario file
    pub tree: PathBuf,

    pub clips: Vec<AnimationClip>,

    /// Joints in parent-first order
    pub skeleton: Vec<Joint>,

    pub animator: AnimatorConfig,

    pub characters: Vec<CharacterConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterConfig {
    pub id: u64,

    /// State started on the base track before the first frame
    #[serde(default)]
    pub initial_state: Option<String>,

    /// States to load; every clip when empty
    #[serde(default)]
    pub states: Vec<String>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            frames: 300,
            dt: 1.0 / 30.0,
            seed: 0,
            restart: true,
            trace: false,
            tree: PathBuf::from("tree.json"),
            clips: Vec::new(),
            skeleton: Vec::new(),
            animator: AnimatorConfig::default(),
            characters: Vec::new(),
        }
    }
}

impl ScenarioConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario from {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse scenario from {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}

/// A scenario with its tree document resolved.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub config: ScenarioConfig,
    pub document: TreeDocument,
}

impl Scenario {
    pub fn new(config: ScenarioConfig, document: TreeDocument) -> Self {
        Self { config, document }
    }

    /// Load `path` and the tree document it points at.
    pub fn load(path: &Path) -> Result<Self> {
        let config = ScenarioConfig::load(path)?;
        let tree_path = path
            .parent()
            .map_or_else(|| config.tree.clone(), |dir| dir.join(&config.tree));
        let document = load_document(&tree_path)?;
        Ok(Self { config, document })
    }
}

pub fn load_document(path: &Path) -> Result<TreeDocument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tree document from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse tree document from {}", path.display()))
}
