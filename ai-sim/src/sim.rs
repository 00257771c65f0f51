use ai_anim::{AnimationStateMachine, ClipLibrary, FiredEvent, Pose, PoseSampler, Skeleton};
use ai_bt::{BehaviorTree, ExecutionContext, ExecutionContexts, Status};
use ai_core::{CharacterId, TickContext};
use ai_tools::{TraceEvent, TraceLog, TRACE_LOG};
use anyhow::{ensure, Context, Result};
use glam::Vec3;

use crate::{behaviors, Scenario, SimWorld};

/// Trace tag for animation events (`a` = track).
pub const TRACE_ANIM_EVENT: &str = "anim.event";

/// What happened to one character during one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterFrame {
    pub id: CharacterId,
    /// Root status, `None` when the run had already finished.
    pub status: Option<Status>,
    /// Base-track state after the animation update.
    pub state: Option<String>,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub tick: u64,
    pub time: f64,
    pub characters: Vec<CharacterFrame>,
    pub events: Vec<FiredEvent>,
}

/// One shared tree driving every character of a scenario, frame by frame.
pub struct Simulation {
    tree: BehaviorTree<SimWorld>,
    library: ClipLibrary,
    skeleton: Skeleton,
    world: SimWorld,
    contexts: ExecutionContexts<CharacterId>,
    tick: TickContext,
    restart: bool,
}

impl Simulation {
    pub fn new(scenario: &Scenario) -> Result<Self> {
        let config = &scenario.config;
        ensure!(
            config.dt.is_finite() && config.dt > 0.0,
            "frame length must be positive, got {}",
            config.dt
        );
        ensure!(!config.characters.is_empty(), "scenario declares no characters");

        let library =
            ClipLibrary::from_clips(config.clips.iter().cloned()).context("Invalid clip data")?;
        let skeleton = Skeleton::new(config.skeleton.clone()).context("Invalid skeleton")?;
        if !skeleton.is_empty() {
            config
                .animator
                .check_joints(&skeleton)
                .context("Invalid animator overlays")?;
        }
        let tree = BehaviorTree::import(&scenario.document, &behaviors::registry())
            .with_context(|| format!("Failed to import tree '{}'", scenario.document.name))?;

        let mut world = SimWorld::new();
        let mut contexts = ExecutionContexts::new(config.seed);
        for character in &config.characters {
            let id = CharacterId(character.id);
            ensure!(world.machine(id).is_none(), "character {id} declared twice");

            let mut machine = AnimationStateMachine::new(id, &config.animator);
            if character.states.is_empty() {
                machine.load_states(&library, library.names())?;
            } else {
                machine
                    .load_states(&library, &character.states)
                    .with_context(|| format!("Failed to load states of character {id}"))?;
            }
            world.add_character(machine);
            if let Some(initial) = &character.initial_state {
                ensure!(
                    world.set_initial_state(id, initial),
                    "character {id} has no state '{initial}'"
                );
            }

            let ctx = contexts.get_or_create(id);
            if config.trace {
                ctx.blackboard.set(TRACE_LOG, TraceLog::default());
            }
        }
        // Start events fired while setting initial states are not part of any frame.
        world.drain_events();

        tracing::info!(
            tree = %tree.name(),
            nodes = tree.len(),
            characters = config.characters.len(),
            clips = library.len(),
            "simulation ready"
        );
        Ok(Self {
            tree,
            library,
            skeleton,
            world,
            contexts,
            tick: TickContext::new(config.seed, config.dt),
            restart: config.restart,
        })
    }

    pub fn tree(&self) -> &BehaviorTree<SimWorld> {
        &self.tree
    }

    pub fn library(&self) -> &ClipLibrary {
        &self.library
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn world(&self) -> &SimWorld {
        &self.world
    }

    pub fn context(&self, id: CharacterId) -> Option<&ExecutionContext<CharacterId>> {
        self.contexts.get(id)
    }

    /// Trace events recorded for `id`, when tracing is enabled.
    pub fn trace(&self, id: CharacterId) -> Option<&TraceLog> {
        self.contexts.get(id)?.blackboard.get(TRACE_LOG)
    }

    /// Current full-body pose of `id`.
    pub fn pose(&self, id: CharacterId, sampler: &dyn PoseSampler) -> Option<Pose> {
        Some(self.world.machine(id)?.compose_pose(&self.skeleton, sampler))
    }

    /// Tick every character's tree, then advance every animation by one frame.
    pub fn step(&mut self) -> FrameReport {
        let tick = self.tick;
        let ids: Vec<CharacterId> = self.world.characters().collect();

        let mut statuses = Vec::with_capacity(ids.len());
        for &id in &ids {
            let ctx = self.contexts.get_or_create(id);
            if self.restart {
                self.tree.startup(ctx);
            }
            statuses.push(self.tree.execute(&tick, ctx, &mut self.world));
        }

        self.world.update(tick.dt_seconds);
        let events = self.world.drain_events();
        for event in &events {
            tracing::debug!(
                character = %event.character,
                track = event.track,
                state = %event.state,
                event = %event.name,
                "animation event fired"
            );
            let ctx = self.contexts.get_or_create(event.character);
            ai_tools::emit(
                &mut ctx.blackboard,
                TraceEvent::new(tick.tick, TRACE_ANIM_EVENT)
                    .with_agent(event.character.0)
                    .with_a(event.track as u64),
            );
        }

        let characters = ids
            .iter()
            .zip(statuses)
            .map(|(&id, status)| CharacterFrame {
                id,
                status,
                state: self
                    .world
                    .machine(id)
                    .and_then(|m| m.current_state(0))
                    .map(|s| s.name().to_string()),
                position: self.world.position(id),
            })
            .collect();

        self.tick = tick.next();
        FrameReport {
            tick: tick.tick,
            time: tick.now_seconds,
            characters,
            events,
        }
    }

    pub fn run(&mut self, frames: u32) -> Vec<FrameReport> {
        (0..frames).map(|_| self.step()).collect()
    }
}
