use super::*;

#[test]
fn test_mock_records_in_order() {
    let log = Log::mock();
    log.info("test", "first");
    log.warn("test", "second");
    log.error("other", "third");

    let messages = log.messages().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].level, LogLevel::Info);
    assert_eq!(messages[0].message, "first");
    assert_eq!(messages[1].level, LogLevel::Warning);
    assert_eq!(messages[2].scope, "other");
}

#[test]
fn test_on_error_helpers_pass_results_through() {
    let log = Log::mock();
    let ok: Result<u32, &str> = Ok(42);
    let err: Result<u32, &str> = Err("boom");

    assert_eq!(log.warn_on_error("test", ok), Ok(42));
    assert_eq!(log.error_on_error("test", err), Err("boom"));

    let messages = log.messages().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].level, LogLevel::Error);
    assert_eq!(messages[0].message, "boom");
}

#[tokio::test]
async fn test_actual_logger_writes_latest_log() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = ArcPath::from(dir.path());
    let log = Log::spawn(LogLevel::Error, 0, log_dir.clone()).await.unwrap();
    assert!(log.messages().is_none());

    log.info("test", "written before flush");
    log.clone().collect_garbage().await;
    log.flush().await;

    let latest = tokio::fs::read_to_string(log_dir.join("latest.log"))
        .await
        .unwrap();
    assert!(latest.contains("[INFO] [test] written before flush"));
}
