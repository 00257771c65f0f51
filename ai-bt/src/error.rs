use thiserror::Error;

/// Errors raised while building a tree from external data.
///
/// Lookups on an already-constructed tree never return these: a missing index there is a
/// programming error and panics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BtError {
    #[error("tree document '{0}' has no nodes")]
    EmptyDocument(String),

    #[error("node index {index} is outside 0..{len}")]
    IndexOutOfRange { index: u32, len: usize },

    #[error("node index {0} appears more than once")]
    DuplicateIndex(u32),

    #[error("tree has no root node (parent -1)")]
    MissingRoot,

    #[error("tree has two root nodes: {first} and {second}")]
    MultipleRoots { first: u32, second: u32 },

    #[error("node {index} refers to unknown parent {parent}")]
    UnknownParent { index: u32, parent: i64 },

    #[error("node {0} is not reachable from the root (cycle in parent links)")]
    Unreachable(u32),

    #[error("{type_name} node {index} cannot have children")]
    LeafWithChildren { index: u32, type_name: String },

    #[error("{type_name} node is missing attribute '{attribute}'")]
    MissingAttribute {
        type_name: String,
        attribute: String,
    },

    #[error("{type_name} node has invalid {attribute}='{value}'")]
    InvalidAttribute {
        type_name: String,
        attribute: String,
        value: String,
    },
}
