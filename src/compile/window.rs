//! First/last-value aggregation via a ranked subquery.
//!
//! A field aggregated with `first` or `last` cannot use a plain aggregate
//! function. Instead the compiled request wraps the original query in a
//! subquery that numbers rows per group with a window function, and the
//! outer query keeps only rank 1:
//!
//! ```text
//! outer:    filters = (rn = 1), group by <groups>
//! subquery: select <value>, <groups>, is_deleted
//!           window row_number() partition by <groups> order by <sort> as rn
//!           filters = <original filters> and is_deleted = false
//! ```

use serde_json::json;

use crate::compile::merge::append_condition;
use crate::compile::{CompileError, CompileResult};
use crate::model::filter::{Filter, FilterModel};
use crate::model::params::{
    Aggregation, Column, DatasetParams, OrderBy, WindowSpec, ROW_NUMBER_FUNCTION,
    SOFT_DELETE_COLUMN, WINDOW_RANK_ALIAS,
};
use crate::model::widget::{Field, SortBy};

/// Rewrite `params` in place to select the first-ranked row per group.
///
/// The sort entries define the ranking order; at least one is required.
/// Group-by entries already present on `params` become the window's
/// partition columns.
///
/// The aggregation entry appended to the outer query uses a fixed `sum`
/// function name. It does not sum anything: the rank filter on the
/// subquery selects the row, and the entry only carries the column and
/// alias for downstream consumers keyed off the alias.
pub fn apply_window_aggregation(
    params: &mut DatasetParams,
    field: &Field,
    sort_by: &[SortBy],
) -> CompileResult<()> {
    if sort_by.is_empty() {
        return Err(CompileError::SortByRequired);
    }

    let mut subquery = DatasetParams::default();

    subquery.columns.push(Column::new(field.column.clone()));
    for group in &params.group_by {
        subquery.columns.push(Column::new(group.column.clone()));
    }
    subquery.columns.push(Column::new(SOFT_DELETE_COLUMN));

    subquery.windows.push(WindowSpec {
        function: ROW_NUMBER_FUNCTION.to_string(),
        partition_by: params.group_by.iter().map(|g| g.column.clone()).collect(),
        order_by: sort_by
            .iter()
            .map(|s| OrderBy {
                column: s.column.clone(),
                order: s.order,
                alias: s.alias.clone(),
            })
            .collect(),
        alias: WINDOW_RANK_ALIAS.to_string(),
    });

    subquery.filters = Some(append_condition(
        params.filters.take(),
        Filter::condition(SOFT_DELETE_COLUMN, "eq", json!(false)),
    ));

    params.filters = Some(FilterModel::all(vec![Filter::condition(
        WINDOW_RANK_ALIAS,
        "eq",
        json!(1),
    )]));
    params.aggregations.push(Aggregation {
        column: field.column.clone(),
        function: "sum".to_string(),
        alias: field.alias_or_column().to_string(),
    });
    params.subquery = Some(Box::new(subquery));

    Ok(())
}
