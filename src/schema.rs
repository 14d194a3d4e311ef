//! Schema resolution: which fields become columns, under which names, in
//! which order, and which header maps back to which field.
//!
//! A record type declares its [`RecordSchema`] once, either with the builder
//! or from YAML:
//!
//! ```
//! use sheetmap::schema::{FieldBinding, RecordSchema};
//! use sheetmap::types::ValueType;
//!
//! let schema = RecordSchema::new()
//!     .with_sheet_name("People")
//!     .field(FieldBinding::new("name", ValueType::Text).with_display_name("Name").with_order(0))
//!     .field(FieldBinding::new("age", ValueType::Integer).with_order(1));
//!
//! let from_yaml = RecordSchema::from_yaml(
//!     r#"
//! sheet_name: People
//! fields:
//!   - key: name
//!     type: text
//!     display_name: Name
//!     order: 0
//!   - key: age
//!     type: integer
//!     order: 1
//! "#,
//! )?;
//! assert_eq!(schema, from_yaml);
//! # Ok::<(), sheetmap::SheetError>(())
//! ```

use crate::error::SheetResult;
use crate::record::FieldValue;
use crate::types::ValueType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

/// Sheet used when a schema declares none
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

//==============================================================================
// Declaration
//==============================================================================

/// Mapping metadata for one record field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldBinding {
    /// Key passed to [`SheetRecord`](crate::SheetRecord) accessors
    pub key: String,

    #[serde(rename = "type")]
    pub value_type: ValueType,

    /// Export without a display name or order
    #[serde(default)]
    pub exported: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl FieldBinding {
    pub fn new(key: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            key: key.into(),
            value_type,
            exported: false,
            display_name: None,
            import_name: None,
            order: None,
        }
    }

    /// Binding whose value type is taken from the field's Rust type
    pub fn of<T: FieldValue>(key: impl Into<String>) -> Self {
        Self::new(key, T::VALUE_TYPE)
    }

    pub fn exported(mut self) -> Self {
        self.exported = true;
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_import_name(mut self, name: impl Into<String>) -> Self {
        self.import_name = Some(name.into());
        self
    }

    /// Same header on export and import
    pub fn with_column_name(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.with_display_name(name.clone()).with_import_name(name)
    }

    /// A field is exported iff it carries any export metadata
    pub fn is_exported(&self) -> bool {
        self.exported || self.display_name.is_some() || self.order.is_some()
    }

    /// Header written for this field
    pub fn export_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.key)
    }

    fn sort_key(&self) -> i32 {
        self.order.unwrap_or(i32::MAX)
    }
}

/// Declared schema of one record type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,

    #[serde(default)]
    pub fields: Vec<FieldBinding>,
}

impl RecordSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    /// Add a field binding; declaration order is kept
    pub fn field(mut self, binding: FieldBinding) -> Self {
        self.fields.push(binding);
        self
    }

    /// Parse a schema declared in YAML
    pub fn from_yaml(yaml: &str) -> SheetResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

//==============================================================================
// Resolution
//==============================================================================

/// Exported fields in column order
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchema {
    columns: Vec<FieldBinding>,
}

impl ColumnSchema {
    pub fn fields(&self) -> &[FieldBinding] {
        &self.columns
    }

    /// Header row, in column order
    pub fn names(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|binding| binding.export_name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Resolve the export columns of a schema
///
/// Explicitly ordered fields come first by ascending order; unordered fields
/// follow in declaration order.
pub fn resolve_export_columns(schema: &RecordSchema) -> ColumnSchema {
    let mut columns: Vec<FieldBinding> = schema
        .fields
        .iter()
        .filter(|binding| binding.is_exported())
        .cloned()
        .collect();

    // sort_by_key is stable
    columns.sort_by_key(FieldBinding::sort_key);

    ColumnSchema { columns }
}

/// Header name a field is read from
pub fn resolve_import_name(field: &FieldBinding) -> String {
    field.import_name.clone().unwrap_or_else(|| field.key.clone())
}

/// Sheet a record type lives in
pub fn resolve_sheet_name(schema: &RecordSchema) -> String {
    schema
        .sheet_name
        .clone()
        .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string())
}

/// Trimmed header name → field binding, over every declared field
#[derive(Debug, Clone, Default)]
pub struct ImportLookup {
    bindings: HashMap<String, FieldBinding>,
}

impl ImportLookup {
    pub fn from_schema(schema: &RecordSchema) -> Self {
        let mut bindings = HashMap::new();
        for field in &schema.fields {
            let name = resolve_import_name(field).trim().to_string();
            if bindings.contains_key(&name) {
                trace!(column = %name, field = %field.key, "duplicate import column, keeping first");
                continue;
            }
            bindings.insert(name, field.clone());
        }
        Self { bindings }
    }

    /// Binding for a header cell, if any
    pub fn get(&self, header: &str) -> Option<&FieldBinding> {
        self.bindings.get(header.trim())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ordered_schema() -> RecordSchema {
        RecordSchema::new()
            .field(FieldBinding::new("f1", ValueType::Text).with_order(2))
            .field(FieldBinding::new("f2", ValueType::Text).exported())
            .field(FieldBinding::new("f3", ValueType::Text).with_order(0))
    }

    #[test]
    fn test_explicit_orders_first_then_unordered() {
        let columns = resolve_export_columns(&ordered_schema());
        assert_eq!(columns.names(), vec!["f3", "f1", "f2"]);
    }

    #[test]
    fn test_unordered_fields_keep_declaration_order() {
        let schema = RecordSchema::new()
            .field(FieldBinding::new("c", ValueType::Text).exported())
            .field(FieldBinding::new("a", ValueType::Text).exported())
            .field(FieldBinding::new("b", ValueType::Text).with_order(5))
            .field(FieldBinding::new("d", ValueType::Text).exported());

        let columns = resolve_export_columns(&schema);
        assert_eq!(columns.names(), vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_fields_without_export_metadata_are_skipped() {
        let schema = RecordSchema::new()
            .field(FieldBinding::new("id", ValueType::Integer))
            .field(FieldBinding::new("name", ValueType::Text).with_display_name("Full Name"));

        let columns = resolve_export_columns(&schema);
        assert_eq!(columns.len(), 1);
        assert_eq!(columns.names(), vec!["Full Name"]);
    }

    #[test]
    fn test_import_name_fallback() {
        let plain = FieldBinding::new("age", ValueType::Integer);
        let renamed = FieldBinding::new("age", ValueType::Integer).with_import_name("Years");

        assert_eq!(resolve_import_name(&plain), "age");
        assert_eq!(resolve_import_name(&renamed), "Years");
    }

    #[test]
    fn test_column_name_sets_both_directions() {
        let binding = FieldBinding::new("age", ValueType::Integer).with_column_name("Age");
        assert!(binding.is_exported());
        assert_eq!(binding.export_name(), "Age");
        assert_eq!(resolve_import_name(&binding), "Age");
    }

    #[test]
    fn test_sheet_name_fallback() {
        assert_eq!(resolve_sheet_name(&RecordSchema::new()), "Sheet1");
        assert_eq!(
            resolve_sheet_name(&RecordSchema::new().with_sheet_name("People")),
            "People"
        );
    }

    #[test]
    fn test_import_lookup_covers_unexported_fields_and_trims() {
        let schema = RecordSchema::new()
            .field(FieldBinding::new("id", ValueType::Integer))
            .field(FieldBinding::new("name", ValueType::Text).with_import_name(" Name "));

        let lookup = ImportLookup::from_schema(&schema);
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.get("id").map(|b| b.key.as_str()), Some("id"));
        assert_eq!(lookup.get("  Name").map(|b| b.key.as_str()), Some("name"));
        assert!(lookup.get("missing").is_none());
    }

    #[test]
    fn test_import_lookup_first_declaration_wins() {
        let schema = RecordSchema::new()
            .field(FieldBinding::new("first", ValueType::Text).with_import_name("Name"))
            .field(FieldBinding::new("second", ValueType::Text).with_import_name("Name"));

        let lookup = ImportLookup::from_schema(&schema);
        assert_eq!(lookup.get("Name").map(|b| b.key.as_str()), Some("first"));
    }

    #[test]
    fn test_from_yaml_marks_export_by_metadata() {
        let schema = RecordSchema::from_yaml(
            r#"
fields:
  - key: id
    type: integer
  - key: note
    type: text
    exported: true
  - key: total
    type: decimal
    display_name: Total
"#,
        )
        .unwrap();

        assert_eq!(schema.sheet_name, None);
        assert_eq!(resolve_export_columns(&schema).names(), vec!["note", "Total"]);
    }

    #[test]
    fn test_from_yaml_rejects_unknown_type() {
        let result = RecordSchema::from_yaml(
            r#"
fields:
  - key: id
    type: uuid
"#,
        );
        assert!(result.is_err());
    }
}
