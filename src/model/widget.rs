//! Widget instances and their data mappings.
//!
//! A [`WidgetInstance`] is a stored declarative definition of a visual
//! element (chart, pivot table, KPI) bound to a sheet. Its
//! [`DataMappings`] assign dataset columns to visual roles; the compiler
//! turns each mapping into one dataset query request.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::model::filter::FilterModel;

// ============================================================================
// Widget instance
// ============================================================================

/// A stored widget definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetInstance {
    #[serde(default)]
    pub id: Uuid,
    pub widget_type: String,
    #[serde(default)]
    pub sheet_id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub data_mappings: DataMappings,
    /// Opaque display configuration, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_config: Option<Value>,
}

impl WidgetInstance {
    /// Apply a partial update: only non-empty/non-nil payload fields
    /// overwrite the stored instance.
    pub fn apply_update(&mut self, update: WidgetInstanceUpdate) {
        if let Some(widget_type) = update.widget_type.filter(|t| !t.is_empty()) {
            self.widget_type = widget_type;
        }
        if let Some(sheet_id) = update.sheet_id.filter(|s| !s.is_nil()) {
            self.sheet_id = sheet_id;
        }
        if let Some(title) = update.title.filter(|t| !t.is_empty()) {
            self.title = title;
        }
        if let Some(data_mappings) = update.data_mappings {
            self.data_mappings = data_mappings;
        }
        if let Some(display_config) = update.display_config.filter(|c| !c.is_null()) {
            self.display_config = Some(display_config);
        }
    }
}

/// Partial-update payload for a widget instance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WidgetInstanceUpdate {
    #[serde(default)]
    pub widget_type: Option<String>,
    #[serde(default)]
    pub sheet_id: Option<Uuid>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub data_mappings: Option<DataMappings>,
    #[serde(default)]
    pub display_config: Option<Value>,
}

// ============================================================================
// Data mappings
// ============================================================================

/// The ordered set of role-to-field mappings carried by a widget.
///
/// Mapping order is significant: it determines the order of the results
/// returned for the widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataMappings {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub mappings: Vec<DataMappingFields>,
}

/// One dataset's role-to-field mapping within a widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataMappingFields {
    pub dataset_id: i64,
    /// Logical name labelling this mapping's compiled query and result.
    /// Unique within the widget when present; may be empty.
    #[serde(default, rename = "ref")]
    pub reference: String,
    /// Role name (x_axis, rows, values, ...) to its ordered fields.
    #[serde(default)]
    pub fields: HashMap<String, Vec<Field>>,
    /// Filters baked into the widget definition at design time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_filters: Option<FilterModel>,
    /// Mapping-level sort; fallback sort source for window aggregations.
    #[serde(default)]
    pub sort_by: Vec<SortBy>,
    /// Multi-dataset join description, carried through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<JoinConfig>,
}

impl DataMappingFields {
    /// First field assigned to `role`, if any.
    pub fn first_field(&self, role: &str) -> Option<&Field> {
        self.fields.get(role).and_then(|fields| fields.first())
    }

    /// All fields assigned to `role`, in declaration order.
    pub fn role_fields(&self, role: &str) -> &[Field] {
        self.fields.get(role).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A source column assigned to a visual role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub column: String,
    /// SQL-like expression override; falls back to `column`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
    /// Output name override; falls back to `column`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Per-field sort; takes precedence over the mapping-level sort for
    /// window aggregations.
    #[serde(default)]
    pub sort_by: Vec<SortBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drilldown: Option<Value>,
}

impl Field {
    pub fn expr_or_column(&self) -> &str {
        match self.expression.as_deref() {
            Some(expr) if !expr.is_empty() => expr,
            _ => &self.column,
        }
    }

    pub fn alias_or_column(&self) -> &str {
        match self.alias.as_deref() {
            Some(alias) if !alias.is_empty() => alias,
            _ => &self.column,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Asc
    }
}

impl SortOrder {
    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// A sort instruction declared on a mapping or field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SortBy {
    pub column: String,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl SortBy {
    /// The alias when non-empty, otherwise the column.
    pub fn effective_column(&self) -> &str {
        match self.alias.as_deref() {
            Some(alias) if !alias.is_empty() => alias,
            _ => &self.column,
        }
    }
}

// ============================================================================
// Joins (informational only)
// ============================================================================

/// Multi-dataset join description. The compiler never expands joins; the
/// description rides along for the dataset-query engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinConfig {
    #[serde(default)]
    pub sources: Vec<i64>,
    #[serde(default)]
    pub edges: Vec<JoinEdge>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinEdge {
    pub left_dataset: i64,
    pub left_column: String,
    pub right_dataset: i64,
    pub right_column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_type: Option<String>,
}
