//! Dataset query parameters - the compiler's output.
//!
//! One [`DatasetParams`] fully specifies a dataset query request: selected
//! columns, aggregations, grouping, ordering, filters, pagination. A
//! window-based "first/last" aggregation nests a second [`DatasetParams`]
//! as a ranked subquery.

use serde::{Deserialize, Serialize};

use crate::model::filter::FilterModel;
use crate::model::widget::SortOrder;

/// Boolean column marking logically-deleted rows; always excluded inside
/// window subqueries.
pub const SOFT_DELETE_COLUMN: &str = "is_deleted";

/// Alias of the row-numbering window inside a ranked subquery.
pub const WINDOW_RANK_ALIAS: &str = "rn";

/// Ranking function used for first/last-value selection.
pub const ROW_NUMBER_FUNCTION: &str = "row_number";

/// A selected column with an optional output alias.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl Column {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            alias: None,
        }
    }
}

/// An aggregation over a column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub column: String,
    pub function: String,
    pub alias: String,
}

/// A grouping column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupBy {
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl GroupBy {
    pub fn alias_or_column(&self) -> &str {
        match self.alias.as_deref() {
            Some(alias) if !alias.is_empty() => alias,
            _ => &self.column,
        }
    }
}

/// An ordering instruction in the compiled request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    pub order: SortOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// A window-function specification attached to a subquery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub function: String,
    #[serde(default)]
    pub partition_by: Vec<String>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    pub alias: String,
}

/// Result paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 100,
        }
    }
}

/// A fully-specified dataset query request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetParams {
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub aggregations: Vec<Aggregation>,
    #[serde(default)]
    pub group_by: Vec<GroupBy>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterModel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub windows: Vec<WindowSpec>,
    /// Ranked subquery implementing first/last-value aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subquery: Option<Box<DatasetParams>>,
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default)]
    pub get_from_lake: bool,
}
