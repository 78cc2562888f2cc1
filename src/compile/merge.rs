//! Combining a widget's default filters with the caller's ad-hoc filters.

use crate::model::filter::{FilterModel, LogicalOperator};

/// Merge a mapping's (already parametrized) default filters with the
/// ad-hoc filters supplied for its dataset.
///
/// - Both empty: no filters.
/// - One side empty: the other side, unchanged.
/// - Same logical operator: one tree holding the default conditions
///   followed by the ad-hoc conditions.
/// - Differing operators: the ad-hoc tree, unmodified. OR trees are not
///   otherwise supported, so the default side is dropped here; this
///   mirrors the long-standing behavior downstream consumers rely on.
pub fn merge_filters(
    default: Option<&FilterModel>,
    adhoc: Option<&FilterModel>,
) -> Option<FilterModel> {
    let default = default.filter(|f| !f.is_empty());
    let adhoc = adhoc.filter(|f| !f.is_empty());

    match (default, adhoc) {
        (None, None) => None,
        (Some(default), None) => Some(default.clone()),
        (None, Some(adhoc)) => Some(adhoc.clone()),
        (Some(default), Some(adhoc)) => {
            if default.logical_operator != adhoc.logical_operator {
                return Some(adhoc.clone());
            }
            let mut conditions = default.conditions.clone();
            conditions.extend(adhoc.conditions.iter().cloned());
            Some(FilterModel {
                logical_operator: adhoc.logical_operator,
                conditions,
            })
        }
    }
}

/// Append a condition to an optional tree, creating an AND tree when absent.
pub fn append_condition(
    filters: Option<FilterModel>,
    condition: crate::model::filter::Filter,
) -> FilterModel {
    let mut filters = filters.unwrap_or_else(|| FilterModel {
        logical_operator: LogicalOperator::And,
        conditions: Vec::new(),
    });
    filters.conditions.push(condition);
    filters
}
