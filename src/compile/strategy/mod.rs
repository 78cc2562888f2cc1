//! Widget-type strategies.
//!
//! Each strategy maps one widget type's visual roles onto grouping,
//! aggregation and value instructions; everything else (filters, time
//! buckets, sorting, currency) comes from the shared template in
//! [`crate::compile::base`].

mod chart;
mod kpi;
mod pie;
mod pivot;

pub use chart::BasicChartStrategy;
pub use kpi::KpiStrategy;
pub use pie::PieChartStrategy;
pub use pivot::PivotTableStrategy;

use std::collections::HashMap;

use crate::compile::{CompileContext, CompileResult, CompiledQuery};
use crate::model::widget::WidgetInstance;

/// Visual role names carried by data mappings.
pub mod roles {
    pub const X_AXIS: &str = "x_axis";
    pub const Y_AXIS: &str = "y_axis";
    pub const GROUP_BY: &str = "group_by";
    pub const SLICES: &str = "slices";
    pub const VALUES: &str = "values";
    pub const ROWS: &str = "rows";
    pub const COLUMNS: &str = "columns";
    pub const PRIMARY_VALUE: &str = "primary_value";
    pub const COMPARISON_VALUE: &str = "comparison_value";
    pub const TIME_COMPARISON: &str = "time_comparison";
}

/// A widget-type compiler: turns a widget's mappings into dataset query
/// requests keyed by reference.
pub trait WidgetStrategy: Send + Sync {
    fn compile(
        &self,
        widget: &WidgetInstance,
        ctx: &CompileContext,
    ) -> CompileResult<HashMap<String, CompiledQuery>>;
}
