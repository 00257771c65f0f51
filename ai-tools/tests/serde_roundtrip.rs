#![cfg(feature = "serde")]

use ai_tools::{TraceEvent, TraceLog};

#[test]
fn trace_log_json_roundtrip() {
    let log = TraceLog {
        events: vec![
            TraceEvent::new(1, "bt.status").with_agent(4).with_a(0).with_b(3),
            TraceEvent::new(2, "bt.status").with_agent(4).with_a(2).with_b(1),
            TraceEvent::new(3, "anim.event").with_agent(9).with_a(1),
        ],
    };

    let json = serde_json::to_string(&log).expect("serialize");
    let roundtrip: TraceLog = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(roundtrip, log);
}
