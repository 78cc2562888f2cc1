//! Parametrized filter values (relative-date placeholders).
//!
//! Default filters baked into a widget may carry placeholder values of the
//! shape `{{.$today}}` or `{{.$today.addDays(-7)}}`. Before merging with
//! the caller's ad-hoc filters, every placeholder is replaced with a
//! concrete date-time string.
//!
//! Recognized names:
//! - `$today` - start of the current calendar day
//! - `$start_date` / `$end_date` - first / last bound of the ad-hoc date
//!   range supplied for the same column
//!
//! Recognized methods: `addDays(n)`, `addSeconds(n)`. An unknown method or
//! an unparsable argument leaves the base time unchanged.
//!
//! Only whole-string placeholders are substituted. A value that embeds a
//! placeholder next to other text passes through untouched.

use chrono::{Duration, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::model::filter::{Filter, FilterModel};

/// Date-time format shared with ad-hoc filter values.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{\{\.(\$[^}]+)\}\}$").expect("placeholder pattern"));

static METHOD_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9]*)\((.*)\)$").expect("method pattern"));

/// Which bound of an ad-hoc date range to read.
enum RangeBound {
    Start,
    End,
}

/// Evaluates placeholders against a fixed "now" and the ad-hoc filters
/// supplied for the mapping's dataset.
pub struct MacroEngine<'a> {
    now: NaiveDateTime,
    adhoc: Option<&'a FilterModel>,
}

impl<'a> MacroEngine<'a> {
    pub fn new(now: NaiveDateTime, adhoc: Option<&'a FilterModel>) -> Self {
        Self { now, adhoc }
    }

    /// Return a copy of `filters` with every parametrized value replaced.
    pub fn parametrize(&self, filters: &FilterModel) -> FilterModel {
        FilterModel {
            logical_operator: filters.logical_operator,
            conditions: filters
                .conditions
                .iter()
                .map(|c| self.parametrize_condition(c))
                .collect(),
        }
    }

    fn parametrize_condition(&self, condition: &Filter) -> Filter {
        Filter {
            column: condition.column.clone(),
            operator: condition.operator.clone(),
            value: self.substitute_value(&condition.column, &condition.value),
            logical_operator: condition.logical_operator,
            conditions: condition
                .conditions
                .iter()
                .map(|c| self.parametrize_condition(c))
                .collect(),
        }
    }

    fn substitute_value(&self, column: &str, value: &Value) -> Value {
        match value {
            Value::String(s) => match self.substitute_str(column, s) {
                Some(replaced) => Value::String(replaced),
                None => value.clone(),
            },
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.substitute_value(column, item))
                    .collect(),
            ),
            _ => value.clone(),
        }
    }

    fn substitute_str(&self, column: &str, value: &str) -> Option<String> {
        let body = PLACEHOLDER.captures(value)?.get(1)?.as_str().to_string();
        self.evaluate(&body, column)
    }

    /// Evaluate a placeholder body such as `$today.addDays(1)`.
    ///
    /// Returns `None` when the name is unrecognized; the original value
    /// stays in place in that case.
    fn evaluate(&self, body: &str, column: &str) -> Option<String> {
        let (name, method) = match body.split_once('.') {
            Some((name, method)) => (name, Some(method)),
            None => (body, None),
        };

        let base = match name {
            "$today" => self.start_of_day(),
            "$start_date" => self.range_bound(column, RangeBound::Start),
            "$end_date" => self.range_bound(column, RangeBound::End),
            _ => {
                tracing::debug!(placeholder = body, "unrecognized placeholder name");
                return None;
            }
        };

        let resolved = match method {
            Some(call) => apply_method(base, call),
            None => base,
        };

        Some(resolved.format(DATE_TIME_FORMAT).to_string())
    }

    fn start_of_day(&self) -> NaiveDateTime {
        self.now.date().and_hms_opt(0, 0, 0).unwrap_or(self.now)
    }

    /// Resolve `$start_date`/`$end_date` from the ad-hoc condition on the
    /// same column. A missing or malformed condition degrades to the
    /// `$today` value.
    fn range_bound(&self, column: &str, bound: RangeBound) -> NaiveDateTime {
        let condition = self
            .adhoc
            .and_then(|f| f.conditions.iter().find(|c| c.column == column));

        let parsed = condition.and_then(|c| {
            let values = c.value.as_array()?;
            let raw = match bound {
                RangeBound::Start => values.first(),
                RangeBound::End => values.last(),
            }?
            .as_str()?;
            NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT).ok()
        });

        match parsed {
            Some(datetime) => datetime,
            None => {
                tracing::warn!(
                    column,
                    "ad-hoc date range missing or malformed, falling back to today"
                );
                self.start_of_day()
            }
        }
    }
}

/// Apply a method call to the base time. Unknown methods and unparsable
/// arguments are no-ops.
fn apply_method(base: NaiveDateTime, call: &str) -> NaiveDateTime {
    let Some(captures) = METHOD_CALL.captures(call) else {
        tracing::debug!(call, "malformed placeholder method");
        return base;
    };
    let method = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    let argument = captures.get(2).map(|m| m.as_str()).unwrap_or_default();

    match method {
        "addDays" => match argument.trim().parse::<i64>() {
            Ok(days) => base + Duration::days(days),
            Err(_) => {
                tracing::warn!(argument, "unparsable addDays argument");
                base
            }
        },
        "addSeconds" => match argument.trim().parse::<i64>() {
            Ok(seconds) => base + Duration::seconds(seconds),
            Err(_) => {
                tracing::warn!(argument, "unparsable addSeconds argument");
                base
            }
        },
        _ => {
            tracing::debug!(method, "unknown placeholder method");
            base
        }
    }
}
