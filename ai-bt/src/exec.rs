//! The per-node execution protocol.

use ai_core::{DeterministicRng, TickContext, WorldMut};

use crate::{BehaviorTree, ExecutionContext, NodeIndex, NodeKind, NodeScope, Status};

pub(crate) struct Frame<'a, W>
where
    W: WorldMut + 'static,
{
    pub(crate) tick: &'a TickContext,
    pub(crate) ctx: &'a mut ExecutionContext<W::Agent>,
    pub(crate) world: &'a mut W,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Sequence,
    Selector,
}

impl<W> BehaviorTree<W>
where
    W: WorldMut + 'static,
{
    pub(crate) fn execute_node(&self, index: NodeIndex, frame: &mut Frame<'_, W>) -> Status {
        match frame.ctx.breaking() {
            None => {
                if self.node(index).breakpoint {
                    frame.ctx.set_breaking(Some(index));
                    tracing::debug!(tree = %self.name(), node = index.0, "breakpoint hit");
                    return Status::Breaking;
                }
                self.run_node(index, frame)
            }
            Some(breaking) if breaking == index => {
                frame.ctx.set_breaking(None);
                tracing::debug!(tree = %self.name(), node = index.0, "resuming from breakpoint");
                self.run_node(index, frame)
            }
            // Above a pending breakpoint: refresh without re-entering.
            Some(_) => {
                let status = self.tick_node(index, frame);
                frame.ctx.write_status(index, status);
                status
            }
        }
    }

    fn run_node(&self, index: NodeIndex, frame: &mut Frame<'_, W>) -> Status {
        if frame.ctx.status(index) != Status::Running {
            self.spawn_node(index, frame);
        }
        let status = self.tick_node(index, frame);
        frame.ctx.write_status(index, status);
        if status != Status::Running {
            self.terminate_node(index, status, frame);
        }
        status
    }

    fn spawn_node(&self, index: NodeIndex, frame: &mut Frame<'_, W>) {
        let node = self.node(index);
        match &node.kind {
            NodeKind::RandomSequence | NodeKind::RandomSelector => {
                let mut order = node.children.clone();
                frame.ctx.rng.shuffle(&mut order);
                frame.ctx.memory_mut(index).order = order;
            }
            NodeKind::Wait { .. } => {
                frame.ctx.memory_mut(index).started_at = frame.tick.now_seconds;
            }
            NodeKind::Generic {
                behavior: Some(behavior),
                ..
            } => behavior.spawn(&mut scope(index, frame)),
            _ => {}
        }
    }

    fn tick_node(&self, index: NodeIndex, frame: &mut Frame<'_, W>) -> Status {
        match &self.node(index).kind {
            NodeKind::Sequence | NodeKind::RandomSequence => {
                self.tick_composite(index, Flavor::Sequence, frame)
            }
            NodeKind::Selector | NodeKind::RandomSelector => {
                self.tick_composite(index, Flavor::Selector, frame)
            }
            NodeKind::Wait { duration } => {
                let started_at = frame.ctx.memory_mut(index).started_at;
                if frame.tick.now_seconds - started_at >= *duration {
                    Status::Success
                } else {
                    Status::Running
                }
            }
            NodeKind::Generic {
                behavior: Some(behavior),
                ..
            } => behavior.tick(&mut scope(index, frame)),
            // Unregistered type: inert.
            NodeKind::Generic { behavior: None, .. } => Status::Success,
        }
    }

    fn terminate_node(&self, index: NodeIndex, status: Status, frame: &mut Frame<'_, W>) {
        if let NodeKind::Generic {
            behavior: Some(behavior),
            ..
        } = &self.node(index).kind
        {
            behavior.terminate(&mut scope(index, frame), status);
        }
    }

    /// Child at position `i` for this activation: the shuffled order for random composites,
    /// sibling order otherwise.
    fn child_at(&self, index: NodeIndex, i: usize, ctx: &ExecutionContext<W::Agent>) -> NodeIndex {
        let node = self.node(index);
        if node.kind.is_random() {
            if let Some(order) = ctx.memory(index).map(|m| &m.order) {
                if order.len() == node.children.len() {
                    return order[i];
                }
            }
        }
        node.children[i]
    }

    fn tick_composite(&self, index: NodeIndex, flavor: Flavor, frame: &mut Frame<'_, W>) -> Status {
        let len = self.node(index).children.len();
        let start = (0..len)
            .find(|&i| frame.ctx.status(self.child_at(index, i, &*frame.ctx)) == Status::Running)
            .unwrap_or(0);

        for i in start..len {
            let child = self.child_at(index, i, &*frame.ctx);
            match (flavor, self.execute_node(child, frame)) {
                (_, Status::Running) => return Status::Running,
                (_, Status::Breaking) => {
                    // Keep a prior result rather than overwriting it with a transient pause.
                    let own = frame.ctx.status(index);
                    return if own == Status::Invalid {
                        Status::Breaking
                    } else {
                        own
                    };
                }
                (Flavor::Sequence, Status::Failure) => return Status::Failure,
                (Flavor::Selector, Status::Success) => return Status::Success,
                _ => continue,
            }
        }

        match flavor {
            Flavor::Sequence => Status::Success,
            Flavor::Selector => Status::Failure,
        }
    }
}

fn scope<'a, W>(index: NodeIndex, frame: &'a mut Frame<'_, W>) -> NodeScope<'a, W>
where
    W: WorldMut + 'static,
{
    let agent = frame.ctx.agent();
    let ctx = &mut *frame.ctx;
    let (blackboard, memory) = ctx.blackboard_and_memory(index);
    NodeScope {
        tick: frame.tick,
        node: index,
        agent,
        world: &mut *frame.world,
        blackboard,
        memory,
    }
}
