//! Tests for reading records from JSON and JSON Lines.

use process_queue::ItemId;
use process_queue::input::{parse_records, read_records};

#[test]
fn parses_json_array() {
    let records = parse_records(r#"[{"id": "a", "n": 1}, {"id": 2}]"#).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, ItemId::from("a"));
    assert_eq!(records[1].id, ItemId::from(2i64));
}

#[test]
fn parses_json_lines_skipping_blanks() {
    let records = parse_records("{\"id\": \"a\"}\n\n  {\"id\": \"b\", \"x\": true}\n").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].get("x"), Some(&serde_json::json!(true)));
}

#[test]
fn reports_bad_line_number() {
    let err = parse_records("{\"id\": \"a\"}\n{\"name\": \"no id\"}\n").unwrap_err();
    assert!(err.to_string().contains("line 2"), "got: {err}");
}

#[test]
fn reads_records_from_file() {
    let path = std::env::temp_dir().join(format!("pqueue-input-{}.jsonl", std::process::id()));
    std::fs::write(&path, "{\"id\": 1}\n{\"id\": 2}\n").unwrap();

    let records = read_records(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(records.len(), 2);
}

#[test]
fn missing_file_is_an_error() {
    assert!(read_records(std::path::Path::new("/nonexistent/pqueue.json")).is_err());
}
