use ai_core::{TickContext, WorldMut};

use crate::exec::Frame;
use crate::{ExecutionContext, NodeIndex, NodeKind, Status, TreeNode};

/// Shared, read-only behavior tree definition.
///
/// Nodes live in an arena indexed by their stable [`NodeIndex`]; parent and child links are
/// indices into the same arena. Build the tree completely before the first `execute` and do not
/// mutate it while characters are running it.
pub struct BehaviorTree<W>
where
    W: WorldMut + 'static,
{
    name: String,
    pub(crate) nodes: Vec<TreeNode<W>>,
    root: Option<NodeIndex>,
}

impl<W> BehaviorTree<W>
where
    W: WorldMut + 'static,
{
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            root: None,
        }
    }

    pub(crate) fn from_parts(name: String, nodes: Vec<TreeNode<W>>, root: NodeIndex) -> Self {
        Self {
            name,
            nodes,
            root: Some(root),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    /// # Panics
    ///
    /// Panics if the tree already has a root.
    pub fn add_root(&mut self, kind: NodeKind<W>) -> NodeIndex {
        assert!(
            self.root.is_none(),
            "behavior tree '{}' already has a root",
            self.name
        );
        let index = self.push(None, kind);
        self.root = Some(index);
        index
    }

    /// Append a child to `parent`; the new node is its last child.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not exist or cannot own children.
    pub fn add_child(&mut self, parent: NodeIndex, kind: NodeKind<W>) -> NodeIndex {
        let parent_node = self.node(parent);
        assert!(
            parent_node.kind.accepts_children(),
            "{} node {} cannot have children",
            parent_node.type_name(),
            parent
        );
        let index = self.push(Some(parent), kind);
        self.nodes[parent.index()].children.push(index);
        index
    }

    fn push(&mut self, parent: Option<NodeIndex>, kind: NodeKind<W>) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(TreeNode {
            index,
            parent,
            children: Vec::new(),
            kind,
            breakpoint: false,
        });
        index
    }

    /// # Panics
    ///
    /// Panics if `index` is not part of this tree; a dangling index means the tree or the caller
    /// is corrupt.
    pub fn node(&self, index: NodeIndex) -> &TreeNode<W> {
        match self.nodes.get(index.index()) {
            Some(node) => node,
            None => panic!(
                "behavior tree '{}' has no node {} (len {})",
                self.name,
                index,
                self.nodes.len()
            ),
        }
    }

    pub fn get(&self, index: NodeIndex) -> Option<&TreeNode<W>> {
        self.nodes.get(index.index())
    }

    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.node(index).parent
    }

    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        &self.node(index).children
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode<W>> {
        self.nodes.iter()
    }

    pub fn set_breakpoint(&mut self, index: NodeIndex, enabled: bool) {
        match self.nodes.get_mut(index.index()) {
            Some(node) => node.breakpoint = enabled,
            None => panic!("behavior tree '{}' has no node {}", self.name, index),
        }
    }

    /// Prepare `ctx` for a new run. Does nothing unless the previous run finished.
    pub fn startup(&self, ctx: &mut ExecutionContext<W::Agent>) {
        if !ctx.is_finished() {
            return;
        }
        ctx.set_finished(false);
        ctx.ensure_len(self.len());
        ctx.reset();
        tracing::debug!(tree = %self.name, agent = ?ctx.agent(), "behavior tree restarted");
    }

    /// Stop the run immediately. The context stays finished until the next `startup`.
    pub fn abort(&self, ctx: &mut ExecutionContext<W::Agent>) {
        ctx.set_finished(true);
        ctx.ensure_len(self.len());
        ctx.reset();
        tracing::debug!(tree = %self.name, agent = ?ctx.agent(), "behavior tree aborted");
    }

    /// Debugger hook: continue from `node` on the next execute, skipping spawn for every node
    /// above it.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not part of this tree.
    pub fn resume(&self, ctx: &mut ExecutionContext<W::Agent>, node: NodeIndex) {
        let _ = self.node(node);
        ctx.set_breaking(Some(node));
        tracing::debug!(tree = %self.name, agent = ?ctx.agent(), node = node.0, "resume requested");
    }

    /// Tick the tree once for the character owning `ctx`.
    ///
    /// Returns `None` when the run already finished. A `Success` or `Failure` from the root
    /// finishes the run; `Running`, `Breaking` and `Invalid` keep it alive.
    ///
    /// # Panics
    ///
    /// Panics if the tree has no nodes.
    pub fn execute(
        &self,
        tick: &TickContext,
        ctx: &mut ExecutionContext<W::Agent>,
        world: &mut W,
    ) -> Option<Status> {
        let root = match self.root {
            Some(root) if !self.nodes.is_empty() => root,
            _ => panic!("cannot execute empty behavior tree '{}'", self.name),
        };
        if ctx.is_finished() {
            return None;
        }

        ctx.begin_frame(tick.tick, self.len());
        let status = {
            let mut frame = Frame {
                tick,
                ctx: &mut *ctx,
                world: &mut *world,
            };
            self.execute_node(root, &mut frame)
        };

        if status.is_terminal() {
            ctx.set_finished(true);
            tracing::debug!(tree = %self.name, agent = ?ctx.agent(), ?status, "behavior tree finished");
        }
        Some(status)
    }
}

impl<W> Clone for BehaviorTree<W>
where
    W: WorldMut + 'static,
{
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            nodes: self.nodes.clone(),
            root: self.root,
        }
    }
}

impl<W> std::fmt::Debug for BehaviorTree<W>
where
    W: WorldMut + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorTree")
            .field("name", &self.name)
            .field("root", &self.root)
            .field("nodes", &self.nodes)
            .finish()
    }
}
