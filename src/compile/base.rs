//! Shared per-mapping compilation machinery.
//!
//! Every widget-type strategy runs the same template over a mapping, in
//! this fixed order:
//!
//! 1. look up the ad-hoc filters for the mapping's dataset
//! 2. parametrize the mapping's default filters against them
//! 3. merge both filter trees
//! 4. initialize an empty request carrying the merged tree
//! 5. run the strategy's field-processing callback
//! 6. rewrite time-bucketed columns
//! 7. append the derived sort order
//! 8. propagate the display currency
//!
//! Only step 5 differs between widget types.

use std::collections::HashSet;

use crate::compile::bucket::apply_time_bucket;
use crate::compile::macros::MacroEngine;
use crate::compile::merge::merge_filters;
use crate::compile::window::apply_window_aggregation;
use crate::compile::{CompileContext, CompileResult};
use crate::model::params::{Aggregation, Column, DatasetParams, GroupBy, OrderBy};
use crate::model::widget::{DataMappingFields, Field, SortBy, SortOrder};

/// Aggregation names compiled through the ranked-subquery path.
const WINDOW_AGGREGATIONS: [&str; 2] = ["first", "last"];

/// Compile one mapping into a dataset request, with `populate` supplying
/// the widget-type-specific field processing (step 5).
pub fn compile_mapping<F>(
    mapping: &DataMappingFields,
    ctx: &CompileContext,
    populate: F,
) -> CompileResult<DatasetParams>
where
    F: FnOnce(&DataMappingFields, &mut DatasetParams) -> CompileResult<()>,
{
    let adhoc = ctx.adhoc_filters.get(&mapping.dataset_id);

    let engine = MacroEngine::new(ctx.now, adhoc);
    let defaults = mapping
        .default_filters
        .as_ref()
        .map(|filters| engine.parametrize(filters));

    let mut params = DatasetParams {
        filters: merge_filters(defaults.as_ref(), adhoc),
        get_from_lake: ctx.get_from_lake,
        ..Default::default()
    };

    populate(mapping, &mut params)?;

    apply_time_bucket(
        &mut params,
        ctx.time_columns.get(&mapping.dataset_id).map(String::as_str),
        ctx.periodicity,
    );
    append_sort_by(&mut params, &mapping.sort_by);
    apply_currency(&mut params, ctx.currency.as_deref());

    Ok(params)
}

/// Add a field as a grouping column (expression override wins, output
/// named after the alias-or-column).
pub fn push_group_field(params: &mut DatasetParams, field: &Field) {
    params.group_by.push(GroupBy {
        column: field.expr_or_column().to_string(),
        alias: Some(field.alias_or_column().to_string()),
    });
}

/// Add a field as a value: a window-based first/last selection, a plain
/// aggregation, or - with no aggregation function at all - a selected
/// column.
pub fn push_value_field(
    params: &mut DatasetParams,
    mapping: &DataMappingFields,
    field: &Field,
) -> CompileResult<()> {
    match field.aggregation.as_deref() {
        Some(aggregation) if WINDOW_AGGREGATIONS.contains(&aggregation) => {
            let mut sort_by: Vec<SortBy> = if !field.sort_by.is_empty() {
                field.sort_by.clone()
            } else {
                mapping.sort_by.clone()
            };
            // "last" is "first" over the reversed ranking order.
            if aggregation == "last" {
                for sort in &mut sort_by {
                    sort.order = sort.order.reversed();
                }
            }
            apply_window_aggregation(params, field, &sort_by)
        }
        Some(function) if !function.is_empty() => {
            params.aggregations.push(Aggregation {
                column: field.expr_or_column().to_string(),
                function: function.to_string(),
                alias: field.alias_or_column().to_string(),
            });
            Ok(())
        }
        _ => {
            params.columns.push(Column {
                column: field.expr_or_column().to_string(),
                alias: Some(field.alias_or_column().to_string()),
            });
            Ok(())
        }
    }
}

/// Derive the request's ordering: explicit sort entries first, then every
/// grouping column not already sorted on, ascending.
fn append_sort_by(params: &mut DatasetParams, sort_by: &[SortBy]) {
    let mut seen: HashSet<String> = HashSet::new();

    for sort in sort_by {
        let column = sort.effective_column().to_string();
        seen.insert(column.clone());
        params.order_by.push(OrderBy {
            column: column.clone(),
            order: sort.order,
            alias: Some(column),
        });
    }

    let mut derived = Vec::new();
    for group in &params.group_by {
        let column = group.alias_or_column().to_string();
        if seen.insert(column.clone()) {
            derived.push(OrderBy {
                column: column.clone(),
                order: SortOrder::Asc,
                alias: Some(column),
            });
        }
    }
    params.order_by.extend(derived);
}

/// The currency lands on the subquery when one exists, otherwise on the
/// top level. Never both.
fn apply_currency(params: &mut DatasetParams, currency: Option<&str>) {
    let Some(currency) = currency else { return };
    match params.subquery.as_mut() {
        Some(subquery) => subquery.currency = Some(currency.to_string()),
        None => params.currency = Some(currency.to_string()),
    }
}
