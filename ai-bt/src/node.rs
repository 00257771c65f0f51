use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ai_core::{Blackboard, TickContext, WorldMut};

use crate::context::NodeMemory;
use crate::Status;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Node-type-specific attributes, as carried by tree documents.
pub type Attributes = BTreeMap<String, String>;

/// Stable position of a node in its tree.
///
/// Indices are assigned once, at creation or import, and never renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything a leaf behavior may touch while it runs.
pub struct NodeScope<'a, W>
where
    W: WorldMut + 'static,
{
    pub tick: &'a TickContext,
    pub node: NodeIndex,
    pub agent: W::Agent,
    pub world: &'a mut W,
    pub blackboard: &'a mut Blackboard,
    pub memory: &'a mut NodeMemory,
}

/// A registered leaf behavior.
///
/// Behaviors live inside the shared tree definition, so they take `&self`; anything that must
/// persist between frames goes into [`NodeScope::memory`] or the blackboard.
pub trait Behavior<W>: Send + Sync + 'static
where
    W: WorldMut + 'static,
{
    /// Called when the node goes from not-running to active.
    fn spawn(&self, _scope: &mut NodeScope<'_, W>) {}

    fn tick(&self, scope: &mut NodeScope<'_, W>) -> Status;

    /// Called whenever a tick produced anything other than `Running`.
    fn terminate(&self, _scope: &mut NodeScope<'_, W>, _status: Status) {}
}

/// What a node does.
///
/// The set is closed; new leaf types plug in through [`NodeKind::Generic`] with a registered
/// [`Behavior`]. A `Generic` node without a behavior is an inert placeholder for a type name the
/// registry did not know. It keeps its type name and attributes so the tree exports unchanged.
pub enum NodeKind<W>
where
    W: WorldMut + 'static,
{
    Sequence,
    Selector,
    RandomSequence,
    RandomSelector,
    Wait {
        duration: f64,
    },
    Generic {
        type_name: String,
        attributes: Attributes,
        behavior: Option<Arc<dyn Behavior<W>>>,
    },
}

impl<W> NodeKind<W>
where
    W: WorldMut + 'static,
{
    pub fn wait(duration: f64) -> Self {
        NodeKind::Wait { duration }
    }

    /// A placeholder for an unregistered type.
    pub fn placeholder(type_name: impl Into<String>, attributes: Attributes) -> Self {
        NodeKind::Generic {
            type_name: type_name.into(),
            attributes,
            behavior: None,
        }
    }

    pub fn behavior(type_name: impl Into<String>, behavior: impl Behavior<W>) -> Self {
        NodeKind::Generic {
            type_name: type_name.into(),
            attributes: Attributes::new(),
            behavior: Some(Arc::new(behavior)),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            NodeKind::Sequence => "Sequence",
            NodeKind::Selector => "Selector",
            NodeKind::RandomSequence => "RandomSequence",
            NodeKind::RandomSelector => "RandomSelector",
            NodeKind::Wait { .. } => "Wait",
            NodeKind::Generic { type_name, .. } => type_name,
        }
    }

    /// Attributes as they are written to a document.
    pub fn attributes(&self) -> Attributes {
        match self {
            NodeKind::Wait { duration } => {
                let mut attrs = Attributes::new();
                attrs.insert("Duration".to_string(), duration.to_string());
                attrs
            }
            NodeKind::Generic { attributes, .. } => attributes.clone(),
            _ => Attributes::new(),
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            NodeKind::Sequence
                | NodeKind::Selector
                | NodeKind::RandomSequence
                | NodeKind::RandomSelector
        )
    }

    pub fn is_random(&self) -> bool {
        matches!(self, NodeKind::RandomSequence | NodeKind::RandomSelector)
    }

    /// Whether the node may own children. Placeholders may, so unknown composite types survive
    /// a round trip.
    pub fn accepts_children(&self) -> bool {
        match self {
            NodeKind::Wait { .. } => false,
            NodeKind::Generic { behavior, .. } => behavior.is_none(),
            _ => true,
        }
    }
}

impl<W> Clone for NodeKind<W>
where
    W: WorldMut + 'static,
{
    fn clone(&self) -> Self {
        match self {
            NodeKind::Sequence => NodeKind::Sequence,
            NodeKind::Selector => NodeKind::Selector,
            NodeKind::RandomSequence => NodeKind::RandomSequence,
            NodeKind::RandomSelector => NodeKind::RandomSelector,
            NodeKind::Wait { duration } => NodeKind::Wait {
                duration: *duration,
            },
            NodeKind::Generic {
                type_name,
                attributes,
                behavior,
            } => NodeKind::Generic {
                type_name: type_name.clone(),
                attributes: attributes.clone(),
                behavior: behavior.clone(),
            },
        }
    }
}

impl<W> fmt::Debug for NodeKind<W>
where
    W: WorldMut + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Wait { duration } => f.debug_struct("Wait").field("duration", duration).finish(),
            NodeKind::Generic {
                type_name,
                attributes,
                behavior,
            } => f
                .debug_struct("Generic")
                .field("type_name", type_name)
                .field("attributes", attributes)
                .field("registered", &behavior.is_some())
                .finish(),
            other => f.write_str(other.type_name()),
        }
    }
}

/// One node of a [`crate::BehaviorTree`] arena.
pub struct TreeNode<W>
where
    W: WorldMut + 'static,
{
    pub(crate) index: NodeIndex,
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) children: Vec<NodeIndex>,
    pub(crate) kind: NodeKind<W>,
    pub(crate) breakpoint: bool,
}

impl<W> TreeNode<W>
where
    W: WorldMut + 'static,
{
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    pub fn kind(&self) -> &NodeKind<W> {
        &self.kind
    }

    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }

    pub fn has_breakpoint(&self) -> bool {
        self.breakpoint
    }
}

impl<W> Clone for TreeNode<W>
where
    W: WorldMut + 'static,
{
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            parent: self.parent,
            children: self.children.clone(),
            kind: self.kind.clone(),
            breakpoint: self.breakpoint,
        }
    }
}

impl<W> fmt::Debug for TreeNode<W>
where
    W: WorldMut + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("index", &self.index)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("kind", &self.kind)
            .field("breakpoint", &self.breakpoint)
            .finish()
    }
}
