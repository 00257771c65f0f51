use std::sync::{Arc, Mutex};

use ai_core::Blackboard;
use ai_tools::{emit, SharedTraceSink, TraceEvent, TraceLog, TraceSink, TRACE_LOG, TRACE_SINK};

#[derive(Clone, Default)]
struct ArcSink(Arc<Mutex<Vec<TraceEvent>>>);

impl TraceSink for ArcSink {
    fn emit(&mut self, event: TraceEvent) {
        self.0.lock().unwrap().push(event);
    }
}

#[test]
fn emit_writes_to_trace_log_when_present() {
    let mut bb = Blackboard::new();
    bb.set(TRACE_LOG, TraceLog::default());

    emit(&mut bb, TraceEvent::new(1, "test").with_agent(5).with_a(10).with_b(20));

    let log = bb.get(TRACE_LOG).unwrap();
    assert_eq!(log.events.len(), 1);
    assert_eq!(log.events[0].tick, 1);
    assert_eq!(log.events[0].agent, 5);
    assert_eq!(log.events[0].tag, "test");
    assert_eq!(log.events[0].a, 10);
    assert_eq!(log.events[0].b, 20);
}

#[test]
fn emit_writes_to_sink_when_present() {
    let mut bb = Blackboard::new();
    let handle = ArcSink::default();
    let shared = handle.0.clone();
    bb.set(TRACE_SINK, Box::new(handle) as Box<dyn TraceSink>);

    emit(&mut bb, TraceEvent::new(2, "sink_event"));

    let events = shared.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].tick, 2);
    assert_eq!(events[0].tag, "sink_event");
}

#[test]
fn emit_is_a_no_op_without_log_or_sink() {
    let mut bb = Blackboard::new();
    emit(&mut bb, TraceEvent::new(3, "dropped"));
    assert!(bb.is_empty());
}

#[test]
fn shared_sink_can_be_drained_from_another_thread() {
    let sink = SharedTraceSink::new();
    let mut bb = Blackboard::new();
    bb.set(TRACE_SINK, Box::new(sink.clone()) as Box<dyn TraceSink>);

    emit(&mut bb, TraceEvent::new(1, "bt.status").with_a(0).with_b(3));
    emit(&mut bb, TraceEvent::new(1, "bt.status").with_a(1).with_b(1));

    let reader = sink.clone();
    let drained = std::thread::spawn(move || reader.drain()).join().unwrap();

    assert_eq!(drained.len(), 2);
    assert!(sink.is_empty());
}

#[test]
fn with_tag_filters_events() {
    let mut log = TraceLog::default();
    log.push(TraceEvent::new(0, "bt.status"));
    log.push(TraceEvent::new(0, "anim.event"));
    log.push(TraceEvent::new(1, "bt.status"));

    assert_eq!(log.with_tag("bt.status").count(), 2);
}
