//! Tests for utility functions

use prometheus_event_loop::util::{LogicalClock, LoopId, WorkClass, WorkItemId};

#[test]
fn test_class_ordering() {
    assert!(WorkClass::Immediate < WorkClass::Microtask);
    assert!(WorkClass::Microtask < WorkClass::Timer);
    assert!(WorkClass::Timer < WorkClass::IoCompletion);
}

#[test]
fn test_class_names() {
    assert_eq!(WorkClass::IoCompletion.to_string(), "io_completion");
    assert_eq!(WorkClass::Immediate.as_str(), "immediate");
}

#[test]
fn test_work_item_id() {
    let id = WorkItemId(12345);
    assert_eq!(id.0, 12345);
    assert_eq!(id.to_string(), "#12345");
}

#[test]
fn test_loop_ids_are_unique() {
    assert_ne!(LoopId::new(), LoopId::new());
}

#[test]
fn test_logical_clock() {
    let mut clock = LogicalClock::starting_at(5);
    assert_eq!(clock.deadline_after(10).unwrap(), 15);
    clock.advance_to(15).unwrap();
    assert_eq!(clock.now(), 15);
    assert!(clock.deadline_after(-3).is_err());
}
