//! Tests for item ids, records and item state.

use std::collections::HashSet;

use process_queue::{Error, ItemId, ItemState, QueueItem, Record};
use serde_json::json;

#[test]
fn empty_string_id_is_invalid() {
    assert!(matches!(
        ItemId::from("").validate(),
        Err(Error::Validation(_))
    ));
    assert!(ItemId::from("a").validate().is_ok());
}

#[test]
fn every_number_is_a_valid_id() {
    for n in [0.0, -0.0, -12.0, 0.5, f64::INFINITY, f64::NAN] {
        assert!(ItemId::from(n).validate().is_ok(), "{n} should be valid");
    }
}

#[test]
fn numeric_ids_use_same_value_zero_equality() {
    assert_eq!(ItemId::from(0.0), ItemId::from(-0.0));
    assert_eq!(ItemId::from(f64::NAN), ItemId::from(f64::NAN));
    assert_eq!(ItemId::from(3i64), ItemId::from(3.0));
    assert_ne!(ItemId::from(3i64), ItemId::from("3"));

    let set: HashSet<ItemId> = [
        ItemId::from(0.0),
        ItemId::from(-0.0),
        ItemId::from(f64::NAN),
        ItemId::from(f64::NAN),
        ItemId::from("0"),
    ]
    .into_iter()
    .collect();
    assert_eq!(set.len(), 3);
}

#[test]
fn ids_deserialize_from_strings_and_numbers() {
    let s: ItemId = serde_json::from_value(json!("abc")).unwrap();
    let n: ItemId = serde_json::from_value(json!(42)).unwrap();
    assert_eq!(s, ItemId::from("abc"));
    assert_eq!(n, ItemId::from(42i64));
    assert_eq!(n.to_string(), "42");
    assert_eq!(s.as_str(), Some("abc"));
    assert_eq!(n.as_str(), None);
}

#[test]
fn record_round_trips_through_json_with_extra_fields() {
    let value = json!({"id": 7, "value": 10, "tags": ["x"]});
    let record: Record = serde_json::from_value(value.clone()).unwrap();

    assert_eq!(record.id, ItemId::from(7i64));
    assert_eq!(record.get("value"), Some(&json!(10)));
    assert!(record.get("id").is_none());
    assert_eq!(serde_json::to_value(&record).unwrap()["tags"], json!(["x"]));
}

#[test]
fn record_exposes_fields_and_id_for_filtering() {
    let record = Record::new("job").with("value", 10);
    assert_eq!(record.id(), ItemId::from("job"));
    assert_eq!(record.field("value"), Some(json!(10)));
    assert_eq!(record.field("id"), Some(json!("job")));
    assert_eq!(record.field("missing"), None);
}

#[test]
fn item_state_transitions() {
    assert!(ItemState::Pending.can_transition_to(ItemState::InProcess));
    assert!(!ItemState::InProcess.can_transition_to(ItemState::Pending));
    assert!(!ItemState::Pending.can_transition_to(ItemState::Pending));
    assert_eq!(ItemState::InProcess.to_string(), "in_process");
}

#[test]
fn record_with_id_sets_the_id_and_round_trips() {
    let record = Record::new("x").with("id", 5).with("value", 10);

    assert_eq!(record.id, ItemId::from(5i64));
    assert!(record.get("id").is_none());
    assert!(!record.fields().contains_key("id"));
    assert_eq!(record.field("id"), Some(json!(5.0)));

    let text = serde_json::to_string(&record).unwrap();
    let back: Record = serde_json::from_str(&text).unwrap();
    assert_eq!(back, record);
}

#[test]
fn record_with_non_scalar_id_keeps_existing_id() {
    let mut record = Record::new("x").with("id", json!({"nested": 1})).with("tmp", 1);
    assert_eq!(record.id, ItemId::from("x"));
    assert!(!record.fields().is_empty());
    assert_eq!(record.remove("tmp"), Some(json!(1)));
    assert!(record.fields().is_empty());
}
