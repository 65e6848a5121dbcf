//! Tests for builder modules

use prometheus_event_loop::builders::{build_scheduler, SchedulerBuilder};
use prometheus_event_loop::config::SchedulerConfig;
use prometheus_event_loop::core::{InMemoryTraceSink, Submit};
use prometheus_event_loop::util::LoopId;

#[test]
fn test_builder_defaults() {
    let builder = SchedulerBuilder::new(SchedulerConfig::default());
    assert_eq!(builder.config().max_microtasks_per_drain, 100_000);

    let scheduler = builder.build().unwrap();
    assert_eq!(scheduler.now(), 0);
}

#[test]
fn test_builder_applies_config() {
    let loop_id = LoopId::new();
    let cfg = SchedulerConfig {
        start_time: 50,
        ..SchedulerConfig::default()
    };
    let trace = InMemoryTraceSink::new(8);
    let mut scheduler = SchedulerBuilder::new(cfg)
        .loop_id(loop_id)
        .trace(Box::new(trace.clone()))
        .build()
        .unwrap();

    scheduler.submit_timer(|_| Ok(()), 10).unwrap();
    let report = scheduler.run().unwrap();

    assert_eq!(scheduler.loop_id(), loop_id);
    assert_eq!(report.finished_at, 60);
    assert_eq!(trace.events()[0].at, 60);
}

#[test]
fn test_builder_rejects_invalid_config() {
    let cfg = SchedulerConfig {
        max_microtasks_per_drain: 0,
        ..SchedulerConfig::default()
    };
    assert!(SchedulerBuilder::new(cfg).build().is_err());
}

#[test]
fn test_build_scheduler_with_trace_capacity() {
    let cfg = SchedulerConfig {
        trace_capacity: 4,
        ..SchedulerConfig::default()
    };
    let (mut scheduler, trace) = build_scheduler(&cfg).unwrap();
    let trace = trace.expect("trace enabled by capacity");

    scheduler.submit_immediate(|_| Ok(()));
    scheduler.submit_microtask(|_| Ok(()));
    scheduler.run().unwrap();
    assert_eq!(trace.events().len(), 2);
}

#[test]
fn test_build_scheduler_without_trace() {
    let (_, trace) = build_scheduler(&SchedulerConfig::default()).unwrap();
    assert!(trace.is_none());
}
