#![allow(non_snake_case)]

use super::*;

#[test]
fn CourierConfig___default___has_expected_values() {
    let config = CourierConfig::default();

    assert!(config.worker_threads.is_none());
    assert_eq!(config.thread_name, "courier-worker");
    assert_eq!(config.main_thread_name, "courier-main");
    assert_eq!(config.log_level, "info");
    assert!(config.deliver_local_data);
}

#[test]
fn CourierConfig___from_json___parses_deliver_local_data() {
    let json = r#"{"deliver_local_data": false}"#;

    let config = CourierConfig::from_json(json.as_bytes()).unwrap();

    assert!(!config.deliver_local_data);
    assert_eq!(config.log_level, "info");
}

#[test]
fn CourierConfig___from_json___parses_worker_threads() {
    let json = r#"{"worker_threads": 4}"#;

    let config = CourierConfig::from_json(json.as_bytes()).unwrap();

    assert_eq!(config.worker_threads, Some(4));
}

#[test]
fn CourierConfig___from_empty_bytes___returns_defaults() {
    let config = CourierConfig::from_json(&[]).unwrap();

    assert_eq!(config, CourierConfig::default());
}

#[test]
fn CourierConfig___from_json___invalid_returns_error() {
    let result = CourierConfig::from_json(b"{not json");

    assert!(result.is_err());
}

#[test]
fn CourierConfig___from_toml___parses_all_fields() {
    let source = r#"
        worker_threads = 2
        thread_name = "bg"
        main_thread_name = "ui"
        log_level = "debug"
        deliver_local_data = false
    "#;

    let config = CourierConfig::from_toml(source).unwrap();

    assert_eq!(config.worker_threads, Some(2));
    assert_eq!(config.thread_name, "bg");
    assert_eq!(config.main_thread_name, "ui");
    assert_eq!(config.log_level, "debug");
    assert!(!config.deliver_local_data);
}

#[test]
fn CourierConfig___builder_chain___combines_options() {
    let config = CourierConfig::new()
        .with_worker_threads(3)
        .with_deliver_local_data(false)
        .with_log_level("trace");

    assert_eq!(config.worker_threads, Some(3));
    assert!(!config.deliver_local_data);
    assert_eq!(config.log_level, "trace");
}

#[test]
fn CourierConfig___level___parses_configured_name() {
    let config = CourierConfig::new().with_log_level("WARNING");

    assert_eq!(config.level(), LogLevel::Warn);
}
