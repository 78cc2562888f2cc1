//! Compilation from widget definitions to dataset query requests.
//!
//! ```text
//! WidgetInstance + WidgetQueryParams
//!         │
//!         ▼ [strategy registry]
//! widget-type strategy ──► per-mapping template (base)
//!         │                     │
//!         │                     ├─ macro engine (relative dates)
//!         │                     ├─ filter merge
//!         │                     ├─ window builder (first/last)
//!         │                     └─ time buckets / sort / currency
//!         ▼
//! ref ──► DatasetParams
//! ```
//!
//! Compilation is synchronous and side-effect-free apart from diagnostic
//! logging; all I/O lives in [`crate::service`].

pub mod base;
pub mod bucket;
pub mod macros;
pub mod merge;
pub mod strategy;
pub mod window;

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::compile::bucket::Periodicity;
use crate::compile::strategy::{
    BasicChartStrategy, KpiStrategy, PieChartStrategy, PivotTableStrategy, WidgetStrategy,
};
use crate::model::filter::FilterModel;
use crate::model::params::DatasetParams;
use crate::model::widget::{DataMappingFields, WidgetInstance};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while compiling a widget.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("unsupported widget type: {0}")]
    UnsupportedWidgetType(String),

    #[error("no mappings found for {0} widget")]
    NoMappings(String),

    #[error("sort by is required for window functions")]
    SortByRequired,

    #[error("invalid periodicity: {0}")]
    InvalidPeriodicity(String),
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// Widget type tags
// ============================================================================

/// Widget-type tags recognized by the registry.
pub mod widget_types {
    pub const BAR_CHART: &str = "bar_chart";
    pub const LINE_CHART: &str = "line_chart";
    pub const PIE_CHART: &str = "pie_chart";
    pub const DONUT_CHART: &str = "donut_chart";
    pub const PIVOT_TABLE: &str = "pivot_table";
    pub const KPI: &str = "kpi";
}

// ============================================================================
// Run-time context
// ============================================================================

/// Caller-supplied run-time parameters for one data request.
#[derive(Debug, Clone, Default)]
pub struct WidgetQueryParams {
    /// Ad-hoc filters, keyed by dataset id.
    pub filters: HashMap<i64, FilterModel>,
    /// Raw time column per dataset id, for time-bucket rewriting.
    pub time_columns: HashMap<i64, String>,
    /// Requested time-bucket size (day/week/month/quarter/year).
    pub periodicity: Option<String>,
    /// Display currency propagated into the compiled requests.
    pub currency: Option<String>,
    /// Route the requests to the data lake instead of the warehouse.
    pub get_from_lake: bool,
}

/// Resolved compile-time context: run-time parameters with the
/// periodicity parsed and a fixed "now" for macro evaluation.
#[derive(Debug, Clone)]
pub struct CompileContext {
    pub adhoc_filters: HashMap<i64, FilterModel>,
    pub time_columns: HashMap<i64, String>,
    pub periodicity: Option<Periodicity>,
    pub currency: Option<String>,
    pub get_from_lake: bool,
    pub now: NaiveDateTime,
}

impl CompileContext {
    /// Resolve run-time parameters. An unrecognized periodicity is a hard
    /// error; everything else passes through.
    pub fn from_params(params: &WidgetQueryParams, now: NaiveDateTime) -> CompileResult<Self> {
        let periodicity = params
            .periodicity
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(str::parse)
            .transpose()?;

        Ok(Self {
            adhoc_filters: params.filters.clone(),
            time_columns: params.time_columns.clone(),
            periodicity,
            currency: params.currency.clone(),
            get_from_lake: params.get_from_lake,
            now,
        })
    }
}

// ============================================================================
// Compiler entry point
// ============================================================================

/// One compiled mapping: the dataset to run against and the request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub dataset_id: i64,
    pub params: DatasetParams,
}

/// The key a mapping's compiled request and result are filed under: the
/// declared reference, or a stable positional fallback when it is empty.
pub fn mapping_key(mapping: &DataMappingFields, index: usize) -> String {
    if mapping.reference.is_empty() {
        format!("mapping_{index}")
    } else {
        mapping.reference.clone()
    }
}

fn strategy_for(widget_type: &str) -> Option<&'static dyn WidgetStrategy> {
    match widget_type {
        widget_types::BAR_CHART | widget_types::LINE_CHART => Some(&BasicChartStrategy),
        widget_types::PIE_CHART | widget_types::DONUT_CHART => Some(&PieChartStrategy),
        widget_types::PIVOT_TABLE => Some(&PivotTableStrategy),
        widget_types::KPI => Some(&KpiStrategy),
        _ => None,
    }
}

/// Compile a widget into dataset query requests, keyed by reference.
///
/// Pivot tables may return several entries (one per mapping); every other
/// widget type returns exactly one.
pub fn compile_widget(
    widget: &WidgetInstance,
    ctx: &CompileContext,
) -> CompileResult<HashMap<String, CompiledQuery>> {
    let strategy = strategy_for(&widget.widget_type)
        .ok_or_else(|| CompileError::UnsupportedWidgetType(widget.widget_type.clone()))?;

    tracing::debug!(
        widget = %widget.id,
        widget_type = %widget.widget_type,
        mappings = widget.data_mappings.mappings.len(),
        "compiling widget"
    );

    strategy.compile(widget, ctx)
}
