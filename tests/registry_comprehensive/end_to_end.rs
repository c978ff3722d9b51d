//! End-to-end scenarios over the in-memory registry.

use std::io::Write;
use std::thread;

use entity_registry::{
    Document, MutationMode, PropertyOperation, PropertyPath, Registry, RegistryConfig,
    RegistryError,
};
use proptest::prelude::*;
use serde_json::json;
use tempfile::NamedTempFile;

use crate::test_utils::init_tracing;

fn registry_with(id: &str, document: serde_json::Value) -> Registry {
    init_tracing();
    let registry = Registry::in_memory(RegistryConfig::default());
    registry
        .store()
        .insert_entity("Student", id, Document::from(document));
    registry
}

#[test]
fn update_replaces_existing_value() {
    let registry = registry_with("s1", json!({"Student": {"name": "A"}}));
    registry
        .update_entity_property("Student", "s1", "name", "B")
        .unwrap();
    assert_eq!(
        registry.read_entity("Student", "s1").unwrap().to_json_string(),
        r#"{"Student":{"name":"B"}}"#
    );
}

#[test]
fn add_creates_array_element_container() {
    let registry = registry_with("s1", json!({"Student": {"address": []}}));
    registry
        .add_entity_property("Student", "s1", "address[0].city", "X")
        .unwrap();
    assert_eq!(
        registry.read_entity("Student", "s1").unwrap().to_json_string(),
        r#"{"Student":{"address":[{"city":"X"}]}}"#
    );
    assert_eq!(registry.store().write_count(), 1);
}

#[test]
fn add_on_existing_field_writes_nothing() {
    let registry = registry_with("s1", json!({"Student": {"name": "A"}}));
    let err = registry
        .add_entity_property("Student", "s1", "name", "B")
        .unwrap_err();
    assert!(matches!(err, RegistryError::PropertyAlreadyExists { .. }));
    assert_eq!(registry.store().write_count(), 0);
    assert_eq!(
        registry.read_entity("Student", "s1").unwrap().to_json_string(),
        r#"{"Student":{"name":"A"}}"#
    );
}

#[test]
fn unknown_entity_is_not_found() {
    let registry = registry_with("s1", json!({"Student": {"name": "A"}}));
    let err = registry
        .update_entity_property("Student", "s2", "name", "B")
        .unwrap_err();
    assert!(matches!(err, RegistryError::NotFound { .. }));
}

#[test]
fn sequential_operations_compose() {
    let registry = registry_with("s1", json!({"Student": {"name": "A"}}));
    let ops = vec![
        PropertyOperation::add("Student", "s1", "tags".parse().unwrap(), json!([])),
        PropertyOperation::add("Student", "s1", "tags[-]".parse().unwrap(), "x"),
        PropertyOperation::add("Student", "s1", "tags[0]".parse().unwrap(), "w"),
        PropertyOperation::update("Student", "s1", "tags[1]".parse().unwrap(), "y"),
        PropertyOperation::update("Student", "s1", "name".parse().unwrap(), "Z"),
    ];
    for op in ops {
        registry.execute(op).unwrap();
    }
    assert_eq!(
        registry.read_entity("Student", "s1").unwrap().to_json_string(),
        r#"{"Student":{"name":"Z","tags":["w","y"]}}"#
    );
    assert_eq!(registry.store().write_count(), 5);
}

#[test]
fn created_entity_carries_generated_identifier() {
    init_tracing();
    let registry = Registry::in_memory(RegistryConfig::new().uuid_property_name("id"));
    let id = registry
        .create_entity("Student", Document::from(json!({"name": "A"})))
        .unwrap();
    let doc = registry.read_entity("Student", &id).unwrap();
    assert_eq!(doc["Student"]["id"], json!(id));
}

#[test]
fn configuration_file_controls_audit_naming() {
    init_tracing();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "audit_suffix = \"History\"").unwrap();
    writeln!(file, "audit_suffix_separator = \"-\"").unwrap();

    let registry = Registry::open(file.path()).unwrap();
    assert_eq!(registry.config().uuid_property_name, "osid");
    registry
        .create_entity("Teacher", Document::from(json!({"name": "A"})))
        .unwrap();

    let result = registry
        .get_audit_log(&Document::from(json!({"Teacher": {}})))
        .unwrap();
    assert_eq!(result.keys().collect::<Vec<_>>(), vec!["Teacher-History"]);
    assert_eq!(result.get("Teacher-History").unwrap().len(), 1);
}

#[test]
fn missing_configuration_file_is_config_error() {
    let err = Registry::open("/nonexistent/registry.toml").err().unwrap();
    assert!(matches!(err, RegistryError::Config { .. }));
}

#[test]
fn concurrent_writes_to_distinct_entities() {
    init_tracing();
    let registry = Registry::in_memory(RegistryConfig::default());
    let ids: Vec<String> = (0..8)
        .map(|i| {
            registry
                .create_entity("Student", Document::from(json!({"n": i})))
                .unwrap()
        })
        .collect();

    thread::scope(|s| {
        for id in &ids {
            let registry = registry.clone();
            s.spawn(move || {
                for k in 0..10 {
                    registry
                        .add_entity_property("Student", id, &format!("f{}", k), k as i64)
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(registry.store().write_count(), 80);
    for id in &ids {
        let doc = registry.read_entity("Student", id).unwrap();
        let body = doc["Student"].as_object().unwrap();
        let fields: Vec<&str> = body.keys().map(String::as_str).collect();
        assert_eq!(&fields[..2], &["n", "osid"]);
        assert_eq!(fields.len(), 12);
        assert_eq!(fields[11], "f9");
    }
}

proptest! {
    #[test]
    fn added_fields_keep_insertion_order(names in prop::collection::btree_set("[a-z]{1,6}", 1..8)) {
        let registry = Registry::in_memory(RegistryConfig::default());
        registry.store().insert_entity("Student", "s1", Document::from(json!({"Student": {}})));

        // btree_set yields sorted names; reverse so insertion order differs from key order
        let names: Vec<String> = names.into_iter().rev().collect();
        for name in &names {
            registry.add_entity_property("Student", "s1", name, true).unwrap();
        }

        let doc = registry.read_entity("Student", "s1").unwrap();
        let keys: Vec<String> = doc["Student"].as_object().unwrap().keys().cloned().collect();
        prop_assert_eq!(keys, names);
    }

    #[test]
    fn failed_operation_leaves_document_unchanged(index in 2usize..20) {
        let original = json!({"Student": {"tags": ["a", "b"]}});
        let registry = Registry::in_memory(RegistryConfig::default());
        registry.store().insert_entity("Student", "s1", Document::from(original.clone()));

        let path = PropertyPath::field("tags").index(index);
        let result = registry.execute(PropertyOperation {
            entity_type: "Student".to_string(),
            entity_id: "s1".to_string(),
            path,
            value: Document::from("z"),
            mode: MutationMode::Update,
        });

        prop_assert!(result.is_err());
        prop_assert_eq!(registry.read_entity("Student", "s1").unwrap().into_inner(), original);
        prop_assert_eq!(registry.store().write_count(), 0);
    }
}
