use crate::AgentId;

/// Read-only world access.
///
/// The core crate does not prescribe which queries a world must expose; behavior leaves that
/// need more define extension traits on their own world type.
pub trait WorldView {
    type Agent: AgentId;
}

/// Write access / effect sink.
pub trait WorldMut: WorldView {}

/// The empty world, for trees made only of control-flow and timing nodes.
impl WorldView for () {
    type Agent = u64;
}

impl WorldMut for () {}
