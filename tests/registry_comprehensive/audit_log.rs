//! Audit trail retrieval through the registry facade.

use std::sync::Arc;

use entity_registry::registry_engine::ProjectionView;
use entity_registry::{AuditAction, Document, Registry, RegistryConfig, RegistryError};
use serde_json::json;

use crate::test_utils::init_tracing;

fn registry() -> Registry {
    init_tracing();
    Registry::in_memory(RegistryConfig::default())
}

#[test]
fn audit_log_lists_create_then_update() {
    let registry = registry();
    let id = registry
        .create_entity("Teacher", Document::from(json!({"name": "Meera"})))
        .unwrap();
    registry
        .add_entity_property("Teacher", &id, "subjects", json!(["Maths"]))
        .unwrap();

    let query = Document::from(json!({
        "Teacher": {"filters": {"recordId": {"eq": id}}}
    }));
    let result = registry.get_audit_log(&query).unwrap();

    let records = result.records("Teacher_Audit").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].action, AuditAction::Add);
    assert_eq!(records[1].action, AuditAction::Update);
    for record in &records {
        assert_eq!(record.record_id, id);
        assert_eq!(record.entity_audit_type, "Teacher_Audit");
        assert!(record.recorded_at().is_some());
        assert!(record.uuid("osid").is_some());
    }
    assert_eq!(
        records[1].audit_json,
        vec![json!({"op": "add", "path": "/Teacher/subjects"})]
    );

    let envelope = result.into_document();
    assert_eq!(envelope["Teacher_Audit"][0]["recordId"], query["Teacher"]["filters"]["recordId"]["eq"]);
}

#[test]
fn filter_selects_only_matching_entity() {
    let registry = registry();
    let first = registry
        .create_entity("Teacher", Document::from(json!({"name": "A"})))
        .unwrap();
    let _second = registry
        .create_entity("Teacher", Document::from(json!({"name": "B"})))
        .unwrap();

    let all = registry
        .get_audit_log(&Document::from(json!({"Teacher": {}})))
        .unwrap();
    assert_eq!(all.get("Teacher_Audit").unwrap().len(), 2);

    let one = registry
        .get_audit_log(&Document::from(json!({
            "Teacher": {"filters": {"recordId": {"eq": first}}}
        })))
        .unwrap();
    assert_eq!(one.get("Teacher_Audit").unwrap().len(), 1);
}

#[test]
fn every_queried_type_is_keyed_even_without_matches() {
    let registry = registry();
    registry
        .create_entity("Teacher", Document::from(json!({"name": "A"})))
        .unwrap();

    let result = registry
        .get_audit_log(&Document::from(json!({"Teacher": {}, "Student": {}})))
        .unwrap();

    assert_eq!(result.keys().collect::<Vec<_>>(), vec!["Teacher_Audit", "Student_Audit"]);
    assert_eq!(result.get("Teacher_Audit").unwrap().len(), 1);
    assert!(result.get("Student_Audit").unwrap().is_empty());
}

#[test]
fn unsupported_filter_operator_fails_whole_query() {
    let registry = registry();
    let err = registry
        .get_audit_log(&Document::from(json!({
            "Teacher": {},
            "Student": {"filters": {"recordId": {"regex": ".*"}}}
        })))
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidQuery { .. }), "{}", err);
}

#[test]
fn rejected_write_leaves_no_audit_row() {
    let registry = registry();
    let id = registry
        .create_entity("Teacher", Document::from(json!({"name": "A"})))
        .unwrap();
    registry
        .add_entity_property("Teacher", &id, "name", "B")
        .unwrap_err();

    let result = registry
        .get_audit_log(&Document::from(json!({"Teacher": {}})))
        .unwrap();
    assert_eq!(result.get("Teacher_Audit").unwrap().len(), 1);
    assert_eq!(registry.store().write_count(), 0);
}

#[test]
fn view_templates_shape_audit_records() {
    let views = ProjectionView::new().with_template("Teacher", ["recordId", "action"]);
    let registry = registry().with_views(Arc::new(views));
    let id = registry
        .create_entity("Teacher", Document::from(json!({"name": "A"})))
        .unwrap();

    let result = registry
        .get_audit_log(&Document::from(json!({"Teacher": {}})))
        .unwrap();
    let records = result.get("Teacher_Audit").unwrap();
    assert_eq!(
        records[0].to_json_string(),
        json!({"recordId": id, "action": "ADD"}).to_string()
    );
}
