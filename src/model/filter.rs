//! Filter trees attached to widget definitions and query requests.
//!
//! A [`FilterModel`] is a flat list of conditions joined by one logical
//! operator. Individual conditions may carry nested sub-conditions with
//! their own operator, which the dataset-query engine resolves; this
//! crate only builds and combines the trees.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Logical connective between filter conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    Or,
}

impl Default for LogicalOperator {
    fn default() -> Self {
        LogicalOperator::And
    }
}

/// A filter tree: one logical operator over a list of conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterModel {
    #[serde(default)]
    pub logical_operator: LogicalOperator,
    #[serde(default)]
    pub conditions: Vec<Filter>,
}

impl FilterModel {
    /// An AND tree over the given conditions.
    pub fn all(conditions: Vec<Filter>) -> Self {
        Self {
            logical_operator: LogicalOperator::And,
            conditions,
        }
    }

    /// A tree with no conditions is treated as absent everywhere.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// A single filter condition.
///
/// `value` holds a scalar or a list; a nested group instead populates
/// `conditions` together with a `logical_operator` override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub operator: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_operator: Option<LogicalOperator>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Filter>,
}

impl Filter {
    /// A leaf condition: `column <operator> value`.
    pub fn condition(column: impl Into<String>, operator: impl Into<String>, value: Value) -> Self {
        Self {
            column: column.into(),
            operator: operator.into(),
            value,
            logical_operator: None,
            conditions: Vec::new(),
        }
    }
}
