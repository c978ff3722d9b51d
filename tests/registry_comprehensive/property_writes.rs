//! Fixture-driven property writes.
//!
//! Each scenario starts from the fixture's `existingNode`, applies one
//! operation to entity `Student/123`, and compares the single serialized
//! write, byte for byte, with `expected`. Field order is part of the check.

use entity_registry::{Document, MutationMode, PropertyOperation, ReadOptions};
use serde_json::Value;

use crate::test_utils::*;

const ADD_FIXTURE: &str = include_str!("fixtures/add_property.json");
const UPDATE_FIXTURE: &str = include_str!("fixtures/update_property.json");

fn run_scenarios(raw: &str, value_key: &str, mode: MutationMode) -> usize {
    init_tracing();
    let fixture = fixture(raw);
    let existing = fixture["existingNode"].clone();
    let scenarios = fixture["scenarios"].as_array().expect("scenarios array");

    for tc in scenarios {
        let path = tc["propertyPath"].as_str().expect("propertyPath");
        let store = RecordingStore::new(existing.clone());
        let coordinator = coordinator_over(&store);

        coordinator
            .apply_operation("Student", "123", path, Document::from(tc[value_key].clone()), mode)
            .unwrap_or_else(|e| panic!("{} {} failed: {}", mode, path, e));

        let writes = store.writes();
        assert_eq!(writes.len(), 1, "{} {}: exactly one write", mode, path);
        assert_eq!(writes[0], tc["expected"].to_string(), "{} {}", mode, path);

        let written: Value = serde_json::from_str(&writes[0]).unwrap();
        assert_eq!(written, tc["expected"]);
    }
    scenarios.len()
}

#[test]
fn add_property_scenarios() {
    assert_eq!(run_scenarios(ADD_FIXTURE, "newPropertyNode", MutationMode::Add), 8);
}

#[test]
fn update_property_scenarios() {
    assert_eq!(
        run_scenarios(UPDATE_FIXTURE, "updatedPropNode", MutationMode::Update),
        6
    );
}

#[test]
fn reads_request_raw_stored_form() {
    let store = RecordingStore::new(fixture(UPDATE_FIXTURE)["existingNode"].clone());
    coordinator_over(&store)
        .update_entity_property("Student", "123", "name", Document::from("Ravi"))
        .unwrap();

    let reads = store.reads();
    assert_eq!(reads, vec![ReadOptions::raw()]);
    assert!(reads[0].skip_decryption);
    assert!(!reads[0].include_signatures);
    assert!(reads[0].fields.is_none());
}

#[test]
fn prepared_operation_matches_string_path() {
    let existing = fixture(ADD_FIXTURE)["existingNode"].clone();

    let by_string = RecordingStore::new(existing.clone());
    coordinator_over(&by_string)
        .add_entity_property("Student", "123", "address.pin", Document::from("411001"))
        .unwrap();

    let by_op = RecordingStore::new(existing);
    let op = PropertyOperation::add("Student", "123", "address.pin".parse().unwrap(), "411001");
    coordinator_over(&by_op).execute(op).unwrap();

    assert_eq!(by_string.writes(), by_op.writes());
}

#[test]
fn untouched_fields_survive_nested_update() {
    let existing = fixture(UPDATE_FIXTURE)["existingNode"].clone();
    let store = RecordingStore::new(existing.clone());
    coordinator_over(&store)
        .update_entity_property("Student", "123", "education[0].degree", Document::from("MA"))
        .unwrap();

    let written: Value = serde_json::from_str(&store.writes()[0]).unwrap();
    for field in ["osid", "name", "address", "tags"] {
        assert_eq!(written["Student"][field], existing["Student"][field], "{}", field);
    }
    assert_eq!(written["Student"]["education"][0]["institute"], "IIT");
}
