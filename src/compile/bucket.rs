//! Time-bucket rewriting for a requested periodicity.
//!
//! When the caller supplies a time-column mapping and a periodicity, every
//! reference to the raw time column in the compiled request is replaced by
//! a date-truncation expression so the engine groups by bucket instead of
//! by instant. Matching is by exact column name.

use std::str::FromStr;

use crate::compile::CompileError;
use crate::model::params::DatasetParams;

/// Time-bucket granularity for time-series grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Periodicity {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Periodicity {
    pub fn as_str(self) -> &'static str {
        match self {
            Periodicity::Day => "day",
            Periodicity::Week => "week",
            Periodicity::Month => "month",
            Periodicity::Quarter => "quarter",
            Periodicity::Year => "year",
        }
    }
}

impl FromStr for Periodicity {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Periodicity::Day),
            "week" => Ok(Periodicity::Week),
            "month" => Ok(Periodicity::Month),
            "quarter" => Ok(Periodicity::Quarter),
            "year" => Ok(Periodicity::Year),
            other => Err(CompileError::InvalidPeriodicity(other.to_string())),
        }
    }
}

/// The truncation expression substituted for the raw time column.
pub fn truncate_expression(periodicity: Periodicity, column: &str) -> String {
    format!("date_trunc('{}', {})", periodicity.as_str(), column)
}

/// Replace every exact occurrence of `time_column` in the request's
/// columns, group-bys and order-bys with the truncation expression,
/// preserving output aliases. When a ranked subquery is present its window
/// partition columns are rewritten as well; that is the only place a
/// bucket expression reaches into a window spec.
pub fn apply_time_bucket(
    params: &mut DatasetParams,
    time_column: Option<&str>,
    periodicity: Option<Periodicity>,
) {
    let (Some(column), Some(periodicity)) = (time_column, periodicity) else {
        return;
    };
    let expression = truncate_expression(periodicity, column);

    for selected in &mut params.columns {
        if selected.column == column {
            if selected.alias.as_deref().map_or(true, str::is_empty) {
                selected.alias = Some(column.to_string());
            }
            selected.column = expression.clone();
        }
    }
    for group in &mut params.group_by {
        if group.column == column {
            if group.alias.as_deref().map_or(true, str::is_empty) {
                group.alias = Some(column.to_string());
            }
            group.column = expression.clone();
        }
    }
    for order in &mut params.order_by {
        if order.column == column {
            if order.alias.as_deref().map_or(true, str::is_empty) {
                order.alias = Some(column.to_string());
            }
            order.column = expression.clone();
        }
    }

    if let Some(subquery) = params.subquery.as_mut() {
        for window in &mut subquery.windows {
            for partition in &mut window.partition_by {
                if partition == column {
                    *partition = expression.clone();
                }
            }
        }
    }
}
