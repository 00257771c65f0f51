//! Resumable behavior tree runtime.
//!
//! A [`BehaviorTree`] is an immutable, shareable definition: an arena of nodes addressed by
//! stable [`NodeIndex`] values. All mutable execution state (per-node status, timers, random
//! orderings, breakpoint bookkeeping) lives in an [`ExecutionContext`] owned by one character, so
//! a single tree can drive any number of characters without cross-talk.
//!
//! Each status write is mirrored as a `bt.status` [`ai_tools::TraceEvent`] through the context's
//! blackboard, which is how a remote debugger follows execution live.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod context;
pub mod document;
pub mod error;
mod exec;
pub mod node;
pub mod registry;
pub mod status;
pub mod tree;

pub use context::{ExecutionContext, ExecutionContexts, NodeMemory};
pub use document::{NodeRecord, TreeDocument, ROOT_PARENT};
pub use error::BtError;
pub use node::{Attributes, Behavior, NodeIndex, NodeKind, NodeScope, TreeNode};
pub use registry::{optional_attribute, required_attribute, NodeConstructor, NodeRegistry};
pub use status::Status;
pub use tree::BehaviorTree;

/// Trace tag for node status writes (`a` = node index, `b` = [`Status::code`]).
pub const TRACE_STATUS: &str = "bt.status";
/// Trace tag for full context resets (`startup` after a finished run, `abort`).
pub const TRACE_RESET: &str = "bt.reset";
