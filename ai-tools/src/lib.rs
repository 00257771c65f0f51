//! Tracing and debug-mirroring primitives for the character runtime.
//!
//! Trace events are the out-of-band channel a remote observer (a debugger UI, a replay recorder)
//! uses to mirror execution. They never influence control flow.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{
    emit, NullTraceSink, SharedTraceSink, TraceEvent, TraceLog, TraceSink, VecTraceSink,
    TRACE_LOG, TRACE_SINK,
};
