//! Audit record types.
//!
//! Audit records are produced by the external audit pipeline, one per
//! committed mutation. The core only reads them back through the audit
//! collection search.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of mutation an audit record describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    /// Entity created
    Add,
    /// Entity or property changed
    Update,
    /// Entity removed
    Delete,
    /// Entity read
    Read,
    /// Any action this core does not know about
    #[serde(other)]
    Other,
}

/// One row of an entity's audit trail.
///
/// The record identifier is stored under the configured uuid property name
/// (see [`crate::RegistryConfig::uuid_property_name`]), so it lands in
/// `extra` and is read through [`AuditRecord::uuid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Identifier of this audit row
    pub audit_id: String,
    /// Identifier of the audited entity
    pub record_id: String,
    /// Wall-clock time, `yyyy-MM-dd HH:mm:ss.SSS`
    #[serde(default)]
    pub time_stamp: String,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub date: i64,
    /// Audit collection the record belongs to
    #[serde(rename = "@type", default)]
    pub entity_audit_type: String,
    /// What happened
    pub action: AuditAction,
    /// Change entries (JSON patch style)
    #[serde(default)]
    pub audit_json: Vec<Value>,
    /// Caller that issued the mutation
    #[serde(default)]
    pub user_id: String,
    /// Transactions that produced the mutation
    #[serde(default)]
    pub transaction_id: Vec<i64>,
    /// Remaining fields, including the record identifier
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuditRecord {
    /// Identifier stored under `uuid_property_name`
    pub fn uuid(&self, uuid_property_name: &str) -> Option<&str> {
        self.extra.get(uuid_property_name).and_then(Value::as_str)
    }

    /// When the audited mutation was recorded
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.date)
    }
}
