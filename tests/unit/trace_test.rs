//! Tests for trace sinks

use prometheus_event_loop::core::{
    build_trace_event, InMemoryTraceSink, LogTraceSink, TraceOutcome, TraceSink,
};
use prometheus_event_loop::util::LoopId;
use prometheus_event_loop::{WorkClass, WorkItemId};

#[test]
fn test_in_memory_trace_sink() {
    let loop_id = LoopId::new();
    let mut sink = InMemoryTraceSink::new(10);

    let event = build_trace_event(
        loop_id,
        WorkItemId(1),
        WorkClass::Timer,
        Some("timeout".to_string()),
        5,
        0,
        None,
    );

    sink.record(event);
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].item, WorkItemId(1));
    assert_eq!(events[0].class, WorkClass::Timer);
    assert_eq!(events[0].outcome, TraceOutcome::Completed);
    assert_eq!(sink.names(), ["timeout"]);
}

#[test]
fn test_trace_sink_overflow() {
    let loop_id = LoopId::new();
    let mut sink = InMemoryTraceSink::new(2);

    for i in 1..=3 {
        sink.record(build_trace_event(loop_id, WorkItemId(i), WorkClass::Immediate, None, 0, i - 1, None));
    }

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].item, WorkItemId(2)); // First one popped
    assert_eq!(events[1].item, WorkItemId(3));
}

#[test]
fn test_clones_share_buffer() {
    let reader = InMemoryTraceSink::new(4);
    let mut writer = reader.clone();
    writer.record(build_trace_event(
        LoopId::new(),
        WorkItemId(9),
        WorkClass::Microtask,
        None,
        0,
        0,
        Some("boom"),
    ));

    assert_eq!(reader.names(), ["#9"]);
    reader.clear();
    assert!(writer.events().is_empty());
}

#[test]
fn test_zero_capacity_records_nothing() {
    let mut sink = InMemoryTraceSink::new(0);
    sink.record(build_trace_event(LoopId::new(), WorkItemId(1), WorkClass::Immediate, None, 0, 0, None));
    assert!(sink.events().is_empty());
}

#[test]
fn test_trace_event_serializes() {
    let event = build_trace_event(
        LoopId::new(),
        WorkItemId(4),
        WorkClass::IoCompletion,
        Some("read".to_string()),
        12,
        3,
        Some("EACCES"),
    );
    let json: serde_json::Value = serde_json::to_value(&event).unwrap();
    assert_eq!(json["item"], 4);
    assert_eq!(json["class"], "io_completion");
    assert_eq!(json["outcome"]["status"], "failed");
    assert_eq!(json["outcome"]["message"], "EACCES");

    // Log sink accepts the same event without a subscriber installed.
    LogTraceSink.record(event);
}
