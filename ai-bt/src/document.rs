//! Flat, serializable form of a behavior tree.
//!
//! A document is a list of records, one per node, each naming its own index and its parent's
//! (`-1` for the root). Records that share a parent become siblings in document order.

use std::collections::{BTreeMap, VecDeque};

use ai_core::WorldMut;

use crate::{Attributes, BehaviorTree, BtError, NodeIndex, NodeRegistry, TreeNode};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parent value of the root record.
pub const ROOT_PARENT: i64 = -1;

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TreeDocument {
    pub name: String,
    pub nodes: Vec<NodeRecord>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeRecord {
    #[cfg_attr(feature = "serde", serde(rename = "Index"))]
    pub index: u32,
    #[cfg_attr(feature = "serde", serde(rename = "Parent"))]
    pub parent: i64,
    #[cfg_attr(feature = "serde", serde(rename = "Type"))]
    pub type_name: String,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "Breakpoint", default, skip_serializing_if = "is_false")
    )]
    pub breakpoint: bool,
    /// Type-specific attributes, written inline next to the fixed fields.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub attributes: Attributes,
}

#[cfg(feature = "serde")]
fn is_false(value: &bool) -> bool {
    !*value
}

impl NodeRecord {
    pub fn new(index: u32, parent: i64, type_name: impl Into<String>) -> Self {
        Self {
            index,
            parent,
            type_name: type_name.into(),
            breakpoint: false,
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_breakpoint(mut self, breakpoint: bool) -> Self {
        self.breakpoint = breakpoint;
        self
    }
}

impl TreeDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    pub fn push(&mut self, record: NodeRecord) -> &mut Self {
        self.nodes.push(record);
        self
    }
}

impl<W> BehaviorTree<W>
where
    W: WorldMut + 'static,
{
    /// Write the tree as a document, parents before children.
    pub fn export(&self) -> TreeDocument {
        let mut doc = TreeDocument::new(self.name());
        let Some(root) = self.root() else {
            return doc;
        };

        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            let node = self.node(index);
            doc.nodes.push(NodeRecord {
                index: index.0,
                parent: node.parent.map_or(ROOT_PARENT, |p| i64::from(p.0)),
                type_name: node.type_name().to_string(),
                breakpoint: node.breakpoint,
                attributes: node.kind.attributes(),
            });
            stack.extend(node.children.iter().rev().copied());
        }
        doc
    }

    /// Build a tree from `doc`, creating nodes through `registry`.
    ///
    /// Indices are kept exactly as written; they must cover `0..len` with no gaps.
    pub fn import(doc: &TreeDocument, registry: &NodeRegistry<W>) -> Result<Self, BtError> {
        let len = doc.nodes.len();
        if len == 0 {
            return Err(BtError::EmptyDocument(doc.name.clone()));
        }

        // Slot each record at its index.
        let mut slots: Vec<Option<&NodeRecord>> = vec![None; len];
        let mut root: Option<u32> = None;
        for record in &doc.nodes {
            let slot = slots
                .get_mut(record.index as usize)
                .ok_or(BtError::IndexOutOfRange {
                    index: record.index,
                    len,
                })?;
            if slot.is_some() {
                return Err(BtError::DuplicateIndex(record.index));
            }
            *slot = Some(record);

            if record.parent == ROOT_PARENT {
                if let Some(first) = root {
                    return Err(BtError::MultipleRoots {
                        first,
                        second: record.index,
                    });
                }
                root = Some(record.index);
            }
        }
        let root = root.ok_or(BtError::MissingRoot)?;

        // Children in document order.
        let mut children: BTreeMap<u32, Vec<NodeIndex>> = BTreeMap::new();
        for record in &doc.nodes {
            if record.parent == ROOT_PARENT {
                continue;
            }
            let known = u32::try_from(record.parent)
                .ok()
                .filter(|&p| (p as usize) < len && p != record.index);
            let Some(parent) = known else {
                return Err(BtError::UnknownParent {
                    index: record.index,
                    parent: record.parent,
                });
            };
            children
                .entry(parent)
                .or_default()
                .push(NodeIndex(record.index));
        }

        // Parent links can still form loops detached from the root.
        let mut reached = vec![false; len];
        let mut queue = VecDeque::from([root]);
        reached[root as usize] = true;
        while let Some(index) = queue.pop_front() {
            for child in children.get(&index).into_iter().flatten() {
                if !reached[child.index()] {
                    reached[child.index()] = true;
                    queue.push_back(child.0);
                }
            }
        }
        if let Some(orphan) = reached.iter().position(|&r| !r) {
            return Err(BtError::Unreachable(orphan as u32));
        }

        let mut nodes = Vec::with_capacity(len);
        for (i, slot) in slots.into_iter().enumerate() {
            let Some(record) = slot else {
                // Every slot is filled once no index repeats and none is out of range.
                return Err(BtError::IndexOutOfRange {
                    index: i as u32,
                    len,
                });
            };
            let kind = registry.create(&record.type_name, &record.attributes)?;
            let node_children = children.remove(&record.index).unwrap_or_default();
            if !node_children.is_empty() && !kind.accepts_children() {
                return Err(BtError::LeafWithChildren {
                    index: record.index,
                    type_name: record.type_name.clone(),
                });
            }
            nodes.push(TreeNode {
                index: NodeIndex(record.index),
                parent: (record.parent != ROOT_PARENT).then(|| NodeIndex(record.parent as u32)),
                children: node_children,
                kind,
                breakpoint: record.breakpoint,
            });
        }

        tracing::debug!(tree = %doc.name, nodes = len, "behavior tree imported");
        Ok(Self::from_parts(doc.name.clone(), nodes, NodeIndex(root)))
    }
}
