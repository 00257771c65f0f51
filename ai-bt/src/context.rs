use std::collections::BTreeMap;

use ai_core::{rng, AgentId, Blackboard, SplitMix64};
use ai_tools::TraceEvent;

use crate::{NodeIndex, Status, TRACE_RESET, TRACE_STATUS};

/// RNG stream used for random composite orderings.
const SHUFFLE_STREAM: u64 = 0xB7_5EED;

/// Per-node scratch state that must survive between frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeMemory {
    /// Clock value recorded when the node last spawned (Wait and custom timers).
    pub started_at: f64,
    /// Child order chosen at the last activation of a random composite.
    pub order: Vec<NodeIndex>,
}

/// Mutable execution state of one character running one tree.
///
/// Statuses are index-aligned with the tree's node indices. A context is sized lazily on the
/// first `execute` and grows with the tree; it is never shared between characters.
pub struct ExecutionContext<A: AgentId> {
    agent: A,
    statuses: Vec<Status>,
    memory: Vec<NodeMemory>,
    last_running: Option<NodeIndex>,
    breaking: Option<NodeIndex>,
    finished: bool,
    last_tick: u64,
    pub(crate) rng: SplitMix64,
    pub blackboard: Blackboard,
}

impl<A: AgentId> ExecutionContext<A> {
    pub fn new(agent: A) -> Self {
        Self::seeded(agent, 0)
    }

    /// A context whose random composites shuffle reproducibly for `(seed, agent)`.
    pub fn seeded(agent: A, seed: u64) -> Self {
        Self {
            agent,
            statuses: Vec::new(),
            memory: Vec::new(),
            last_running: None,
            breaking: None,
            finished: false,
            last_tick: 0,
            rng: SplitMix64::new(rng::derive_seed(seed, agent.stable_id(), SHUFFLE_STREAM)),
            blackboard: Blackboard::new(),
        }
    }

    pub fn agent(&self) -> A {
        self.agent
    }

    /// Stored status of `node`; `Invalid` for nodes this context has not been sized for yet.
    pub fn status(&self, node: NodeIndex) -> Status {
        self.statuses
            .get(node.index())
            .copied()
            .unwrap_or(Status::Invalid)
    }

    pub fn statuses(&self) -> &[Status] {
        &self.statuses
    }

    pub fn memory(&self, node: NodeIndex) -> Option<&NodeMemory> {
        self.memory.get(node.index())
    }

    pub fn last_running(&self) -> Option<NodeIndex> {
        self.last_running
    }

    pub fn breaking(&self) -> Option<NodeIndex> {
        self.breaking
    }

    /// Debugger hook: mark `node` as the paused node so the next execute resumes there.
    pub fn set_breaking(&mut self, node: Option<NodeIndex>) {
        self.breaking = node;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub(crate) fn set_finished(&mut self, finished: bool) {
        self.finished = finished;
    }

    pub(crate) fn begin_frame(&mut self, tick: u64, tree_len: usize) {
        self.last_tick = tick;
        self.ensure_len(tree_len);
    }

    pub(crate) fn ensure_len(&mut self, tree_len: usize) {
        if self.statuses.len() < tree_len {
            self.statuses.resize(tree_len, Status::Invalid);
            self.memory.resize_with(tree_len, NodeMemory::default);
        }
    }

    pub(crate) fn memory_mut(&mut self, node: NodeIndex) -> &mut NodeMemory {
        &mut self.memory[node.index()]
    }

    pub(crate) fn blackboard_and_memory(
        &mut self,
        node: NodeIndex,
    ) -> (&mut Blackboard, &mut NodeMemory) {
        (&mut self.blackboard, &mut self.memory[node.index()])
    }

    pub(crate) fn write_status(&mut self, node: NodeIndex, status: Status) {
        self.statuses[node.index()] = status;
        if status == Status::Running {
            self.last_running = Some(node);
        }
        tracing::trace!(agent = ?self.agent, node = node.0, ?status, "bt status");
        ai_tools::emit(
            &mut self.blackboard,
            TraceEvent::new(self.last_tick, TRACE_STATUS)
                .with_agent(self.agent.stable_id())
                .with_a(u64::from(node.0))
                .with_b(u64::from(status.code())),
        );
    }

    /// Back to a fresh run: every status `Invalid`, no running or breaking node.
    pub(crate) fn reset(&mut self) {
        self.statuses.fill(Status::Invalid);
        self.memory.fill_with(NodeMemory::default);
        self.last_running = None;
        self.breaking = None;
        ai_tools::emit(
            &mut self.blackboard,
            TraceEvent::new(self.last_tick, TRACE_RESET).with_agent(self.agent.stable_id()),
        );
    }
}

/// Execution contexts keyed by character handle, created on first use.
pub struct ExecutionContexts<A: AgentId> {
    seed: u64,
    contexts: BTreeMap<A, ExecutionContext<A>>,
}

impl<A: AgentId> ExecutionContexts<A> {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            contexts: BTreeMap::new(),
        }
    }

    pub fn get_or_create(&mut self, agent: A) -> &mut ExecutionContext<A> {
        let seed = self.seed;
        self.contexts
            .entry(agent)
            .or_insert_with(|| ExecutionContext::seeded(agent, seed))
    }

    pub fn get(&self, agent: A) -> Option<&ExecutionContext<A>> {
        self.contexts.get(&agent)
    }

    /// Drop the context of a character that left the simulation.
    pub fn remove(&mut self, agent: A) -> Option<ExecutionContext<A>> {
        self.contexts.remove(&agent)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&A, &ExecutionContext<A>)> {
        self.contexts.iter()
    }
}
