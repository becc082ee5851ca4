use anyhow::Result;

use gdorker::data_models::{Engine, OutputOptions, RunState};
use gdorker::errors::SessionError;
use gdorker::session::SessionStore;

mod test_helpers {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static TEST_FILE_COUNTER: AtomicUsize = AtomicUsize::new(0);

    pub fn unique_session_path() -> PathBuf {
        let count = TEST_FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis();
        std::env::temp_dir().join(format!(
            "gdorker_session_test_{}_{}_{}.json",
            std::process::id(),
            timestamp,
            count
        ))
    }
}

use test_helpers::*;

fn sample_state() -> RunState {
    RunState {
        query_source: "./bb_dorks.txt".to_string(),
        output_options: OutputOptions {
            show_title: true,
            show_http_code: false,
            show_body_snippet: true,
            destination_file: Some("results.txt".to_string()),
            debug: false,
            engine: Engine::DuckDuckGo,
        },
        current_query: Some("inurl:admin ext:php".to_string()),
        offset: 30,
    }
}

#[test]
fn test_save_then_load_round_trip() -> Result<()> {
    let store = SessionStore::new(unique_session_path());
    let fresh = RunState::new("site:example.com".to_string(), OutputOptions::default());

    for state in [sample_state(), fresh] {
        store.save(&state)?;
        assert_eq!(store.load()?, state);
    }

    store.clear()?;
    Ok(())
}

#[test]
fn test_save_overwrites_previous_content() -> Result<()> {
    let store = SessionStore::new(unique_session_path());
    let mut state = sample_state();
    store.save(&state)?;

    state.offset = 90;
    state.current_query = Some("filetype:pdf".to_string());
    store.save(&state)?;

    assert_eq!(store.load()?, state);
    store.clear()?;
    Ok(())
}

#[test]
fn test_file_uses_documented_keys() -> Result<()> {
    let store = SessionStore::new(unique_session_path());
    store.save(&sample_state())?;

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(store.path())?)?;
    assert_eq!(raw["file_or_query"], "./bb_dorks.txt");
    assert_eq!(raw["current_query"], "inurl:admin ext:php");
    assert_eq!(raw["offset"], 30);
    assert_eq!(raw["options"]["title"], true);
    assert_eq!(raw["options"]["code"], false);
    assert_eq!(raw["options"]["body"], true);
    assert_eq!(raw["options"]["dest"], "results.txt");
    assert_eq!(raw["options"]["engine"], "duckduckgo");

    store.clear()?;
    Ok(())
}

#[test]
fn test_loads_session_written_by_older_versions() -> Result<()> {
    let path = unique_session_path();
    std::fs::write(
        &path,
        r#"{
  "file_or_query": "dorks.txt",
  "options": { "title": false, "body": false, "code": true, "dest": null, "debug": true },
  "current_query": null,
  "offset": 0
}"#,
    )?;

    let state = SessionStore::new(&path).load()?;
    assert_eq!(state.query_source, "dorks.txt");
    assert!(state.output_options.show_http_code);
    assert_eq!(state.output_options.engine, Engine::Google);
    assert!(state.current_query.is_none());

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn test_garbage_is_corrupt() -> Result<()> {
    let path = unique_session_path();
    std::fs::write(&path, "this is not json")?;

    let err = SessionStore::new(&path).load().unwrap_err();
    assert!(matches!(err, SessionError::CorruptSession { .. }));

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn test_missing_field_is_corrupt() -> Result<()> {
    let path = unique_session_path();
    std::fs::write(
        &path,
        r#"{"file_or_query": "q", "current_query": "q", "offset": 10}"#,
    )?;

    let err = SessionStore::new(&path).load().unwrap_err();
    assert!(matches!(err, SessionError::CorruptSession { .. }));

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn test_missing_current_query_is_corrupt() -> Result<()> {
    let path = unique_session_path();
    std::fs::write(
        &path,
        r#"{"file_or_query": "dorks.txt",
            "options": {"title": true, "code": false, "body": false, "dest": null, "debug": false},
            "offset": 30}"#,
    )?;

    let err = SessionStore::new(&path).load().unwrap_err();
    assert!(matches!(err, SessionError::CorruptSession { .. }));

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn test_missing_destination_key_is_corrupt() -> Result<()> {
    let path = unique_session_path();
    std::fs::write(
        &path,
        r#"{"file_or_query": "dorks.txt",
            "options": {"title": true, "code": false, "body": false, "debug": false},
            "current_query": "inurl:admin",
            "offset": 30}"#,
    )?;

    let err = SessionStore::new(&path).load().unwrap_err();
    assert!(matches!(err, SessionError::CorruptSession { .. }));

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn test_null_values_are_accepted() -> Result<()> {
    let path = unique_session_path();
    std::fs::write(
        &path,
        r#"{"file_or_query": "dorks.txt",
            "options": {"title": false, "code": false, "body": false, "dest": null, "debug": false},
            "current_query": null,
            "offset": 0}"#,
    )?;

    let state = SessionStore::new(&path).load()?;
    assert_eq!(state.current_query, None);
    assert_eq!(state.output_options.destination_file, None);
    assert_eq!(state.output_options.engine, Engine::Google);

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn test_unaligned_offset_is_corrupt() -> Result<()> {
    let store = SessionStore::new(unique_session_path());
    let mut state = sample_state();
    state.offset = 15;
    store.save(&state)?;

    let err = store.load().unwrap_err();
    assert!(matches!(err, SessionError::CorruptSession { .. }));

    store.clear()?;
    Ok(())
}

#[test]
fn test_missing_file_is_io_error() {
    let err = SessionStore::new(unique_session_path()).load().unwrap_err();
    assert!(matches!(err, SessionError::Io { .. }));
}

#[test]
fn test_clear_is_idempotent() -> Result<()> {
    let store = SessionStore::new(unique_session_path());
    store.save(&sample_state())?;

    store.clear()?;
    assert!(!store.path().exists());
    store.clear()?;
    Ok(())
}

#[test]
fn test_generated_name() {
    let store = SessionStore::with_generated_name();
    let name = store.path().to_str().unwrap();
    assert!(name.starts_with("gdorker_session_"));
    assert!(name.ends_with(".json"));
    assert!(
        name["gdorker_session_".len()..name.len() - ".json".len()]
            .chars()
            .all(|c| c.is_ascii_digit())
    );
}
