//! Tests for configuration validation

use std::collections::HashMap;

use prometheus_event_loop::config::SchedulerConfig;
use prometheus_event_loop::config::scheduler::{ENV_MAX_MICROTASKS, ENV_START_TIME, ENV_TRACE_CAPACITY};

#[test]
fn test_default_config_is_valid() {
    let cfg = SchedulerConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.start_time, 0);
    assert_eq!(cfg.trace_capacity, 0);
}

#[test]
fn test_config_invalid_microtask_limit() {
    let invalid = SchedulerConfig {
        max_microtasks_per_drain: 0,
        ..SchedulerConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "start_time": 100,
        "max_microtasks_per_drain": 500,
        "trace_capacity": 32
    }"#;

    let config = SchedulerConfig::from_json_str(json).unwrap();
    assert_eq!(config.start_time, 100);
    assert_eq!(config.max_microtasks_per_drain, 500);
    assert_eq!(config.trace_capacity, 32);
}

#[test]
fn test_config_from_json_defaults() {
    let config = SchedulerConfig::from_json_str("{}").unwrap();
    assert_eq!(config, SchedulerConfig::default());
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(SchedulerConfig::from_json_str(r#"{"max_microtasks_per_drain": 0}"#).is_err());
    assert!(SchedulerConfig::from_json_str("not json").is_err());
}

#[test]
fn test_config_from_lookup() {
    let vars: HashMap<&str, &str> = [
        (ENV_START_TIME, "7"),
        (ENV_MAX_MICROTASKS, " 64 "),
        (ENV_TRACE_CAPACITY, "16"),
    ]
    .into_iter()
    .collect();

    let config = SchedulerConfig::from_lookup(|name| vars.get(name).map(|v| (*v).to_string())).unwrap();
    assert_eq!(config.start_time, 7);
    assert_eq!(config.max_microtasks_per_drain, 64);
    assert_eq!(config.trace_capacity, 16);
}

#[test]
fn test_config_from_lookup_bad_number() {
    let result = SchedulerConfig::from_lookup(|name| (name == ENV_START_TIME).then(|| "soon".to_string()));
    let err = result.unwrap_err().to_string();
    assert!(err.contains(ENV_START_TIME));
}
