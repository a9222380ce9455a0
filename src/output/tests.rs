//! Tests for output module

use super::*;
use crate::error::Error;
use crate::model::Record;
use crate::table::TableProjector;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use tempfile::tempdir;

fn sample_records() -> Vec<Record> {
    serde_json::from_value(json!([
        {
            "object": "page",
            "id": "r1",
            "properties": {
                "Name": {"id": "title", "type": "title", "title": [{"plain_text": " Ann "}]},
                "Email": {"id": "e", "type": "email", "email": ""}
            },
            "url": "u1"
        },
        {
            "object": "page",
            "id": "r2",
            "properties": {
                "Name": {"id": "title", "type": "title", "title": [{"plain_text": "Bob"}]},
                "Email": {"id": "e", "type": "email", "email": "bob@example.com"}
            },
            "url": "u2"
        }
    ]))
    .unwrap()
}

// ============================================================================
// BackupWriter Tests
// ============================================================================

#[test]
fn test_run_timestamp_format() {
    let at = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
    assert_eq!(run_timestamp(at), "2024-03-05T07:08:09.000Z");
}

#[test]
fn test_artifact_paths() {
    let writer = BackupWriter::new("/backups", "2024-03-05T07:08:09.000Z");

    assert_eq!(
        writer.artifact_path("users", RAW_EXTENSION),
        std::path::PathBuf::from("/backups/2024-03-05T07:08:09.000Z-users.json")
    );
    assert_eq!(
        writer.artifact_path("users", TABLE_EXTENSION),
        std::path::PathBuf::from("/backups/2024-03-05T07:08:09.000Z-users.tsv")
    );
}

#[test]
fn test_prepare_creates_nested_dir() {
    let dir = tempdir().unwrap();
    let data_dir = dir.path().join("a").join("data");
    let writer = BackupWriter::new(&data_dir, "ts");

    writer.prepare().unwrap();
    writer.prepare().unwrap();

    assert!(data_dir.is_dir());
}

#[test]
fn test_write_raw_round_trip() {
    let dir = tempdir().unwrap();
    let writer = BackupWriter::new(dir.path(), "ts");
    let records = sample_records();

    let path = writer.write_raw("users", &records).unwrap();
    let contents = fs::read_to_string(&path).unwrap();

    // One-space indentation, keys in source order
    assert!(contents.starts_with("[\n {\n  \"object\": \"page\",\n  \"id\": \"r1\",\n  \"properties\": {"));
    assert!(contents.contains("\n  \"url\": \"u1\"\n }"));

    let replayed = read_raw(&path).unwrap();
    assert_eq!(replayed, records);
}

#[test]
fn test_write_raw_empty_collection() {
    let dir = tempdir().unwrap();
    let writer = BackupWriter::new(dir.path(), "ts");

    let path = writer.write_raw("empty", &[]).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    assert!(read_raw(&path).unwrap().is_empty());
}

#[test]
fn test_write_table_tsv() {
    let dir = tempdir().unwrap();
    let writer = BackupWriter::new(dir.path(), "ts");
    let table = TableProjector::default().project(&sample_records()).unwrap();

    let path = writer.write_table("users", &table).unwrap();
    let contents = fs::read_to_string(&path).unwrap();

    assert_eq!(
        contents,
        "Name\tEmail\tid\turl\nAnn\t\tr1\tu1\nBob\tbob@example.com\tr2\tu2\n"
    );
}

#[test]
fn test_write_table_does_not_quote_sentinel() {
    use crate::flatten::{EmptyCell, FlattenOptions};
    use crate::table::ProjectorOptions;

    let dir = tempdir().unwrap();
    let writer = BackupWriter::new(dir.path(), "ts");
    let options = ProjectorOptions {
        flatten: FlattenOptions::new(EmptyCell::Quoted),
        include_original_properties: false,
    };
    let table = TableProjector::new(options)
        .project(&sample_records()[..1])
        .unwrap();

    let path = writer.write_table("users", &table).unwrap();
    let contents = fs::read_to_string(&path).unwrap();

    assert_eq!(contents, "Name\tEmail\tid\turl\nAnn\t\"\"\tr1\tu1\n");
}

#[test]
fn test_write_table_escapes_header_names() {
    let dir = tempdir().unwrap();
    let records: Vec<Record> = serde_json::from_value(json!([{
        "id": "r1",
        "url": "u1",
        "properties": {"Na\tme": {"type": "email", "email": "a@b"}}
    }]))
    .unwrap();
    let table = TableProjector::default().project(&records).unwrap();

    let path = dir.path().join("out.tsv");
    write_table_file(&path, &table).unwrap();
    let contents = fs::read_to_string(&path).unwrap();

    assert_eq!(contents, "Na\\tme\tid\turl\na@b\tr1\tu1\n");
    for line in contents.lines() {
        assert_eq!(line.split('\t').count(), 3);
    }
}

#[test]
fn test_failed_table_write_leaves_no_file() {
    let dir = tempdir().unwrap();
    let mut table = TableProjector::default().project(&sample_records()).unwrap();
    table.rows[1].pop();

    let path = dir.path().join("out.tsv");
    let err = write_table_file(&path, &table).unwrap_err();

    assert!(err.is_persistence());
    assert!(!path.exists());
}

#[test]
fn test_write_never_overwrites() {
    let dir = tempdir().unwrap();
    let writer = BackupWriter::new(dir.path(), "ts");
    let records = sample_records();

    writer.write_raw("users", &records).unwrap();
    let err = writer.write_raw("users", &records).unwrap_err();

    assert!(err.is_persistence());
}

#[test]
fn test_write_into_missing_dir_is_persistence_error() {
    let dir = tempdir().unwrap();
    let writer = BackupWriter::new(dir.path().join("missing"), "ts");

    let err = writer.write_raw("users", &sample_records()).unwrap_err();

    assert!(matches!(err, Error::Persistence { .. }));
}

#[test]
fn test_read_raw_missing_file() {
    let dir = tempdir().unwrap();
    let err = read_raw(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}

// ============================================================================
// ErrorLog Tests
// ============================================================================

#[test]
fn test_format_entry() {
    let err = Error::fetch("users", 2, Error::http_status(500, "boom\nline"));

    let line = format_entry(Some("Download data users"), &err);

    assert!(line.starts_with("Download data users Fetch of collection 'users' failed after 2 records: HTTP 500: boom line {"));
    assert!(line.ends_with("}\n"));
    assert_eq!(line.matches('\n').count(), 1);

    let json_part = &line[line.find('{').unwrap()..line.len() - 1];
    let fields: serde_json::Value = serde_json::from_str(json_part).unwrap();
    assert_eq!(fields["collection"], "users");
    assert_eq!(fields["source"]["status"], 500);
}

#[test]
fn test_format_entry_without_header() {
    let line = format_entry(None, &Error::EmptyInput);
    assert_eq!(
        line,
        "Cannot project an empty record list {\"message\":\"Cannot project an empty record list\",\"kind\":\"empty_input\"}\n"
    );
}

#[test]
fn test_error_log_appends_lines() {
    let dir = tempdir().unwrap();
    let log_dir = dir.path().join("logs");

    let mut log = ErrorLog::create(&log_dir, "ts").unwrap();
    log.record(Some("first"), &Error::Cancelled).unwrap();
    log.record(None, &Error::persistence("/x", "disk full")).unwrap();

    assert_eq!(log.entries(), 2);
    assert_eq!(log.path(), log_dir.join("ts.log"));

    let contents = fs::read_to_string(log.path()).unwrap();
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("first Operation cancelled {"));
    assert!(lines[1].starts_with("Failed to write '/x': disk full {"));
}
