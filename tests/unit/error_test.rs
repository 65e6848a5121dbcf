//! Tests for error types

use prometheus_event_loop::core::SchedulerError;
use prometheus_event_loop::WorkItemId;

#[test]
fn test_action_failure_error() {
    let err = SchedulerError::ActionFailure {
        id: WorkItemId(3),
        message: "file not found".to_string(),
    };
    assert_eq!(format!("{}", err), "action failed for work item #3: file not found");
    assert!(!err.is_fatal());
}

#[test]
fn test_unknown_work_item_error() {
    let err = SchedulerError::UnknownWorkItem(WorkItemId(42));
    assert_eq!(format!("{}", err), "unknown work item: #42");
    assert!(!err.is_fatal());
}

#[test]
fn test_schedule_violation_error() {
    let err = SchedulerError::ScheduleViolation("negative timer delay -1".to_string());
    assert_eq!(format!("{}", err), "schedule violation: negative timer delay -1");
    assert!(err.is_fatal());
}

#[test]
fn test_config_and_port_errors() {
    let err = SchedulerError::InvalidConfig("bad".to_string());
    assert_eq!(format!("{}", err), "invalid configuration: bad");
    assert_eq!(format!("{}", SchedulerError::PortClosed), "completion port closed");
}

#[test]
fn test_error_converts_into_anyhow() {
    let err: anyhow::Error = SchedulerError::UnknownWorkItem(WorkItemId(1)).into();
    assert!(err.downcast_ref::<SchedulerError>().is_some());
}
