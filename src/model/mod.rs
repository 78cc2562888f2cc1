//! Data model: widget definitions, filter trees, compiled query parameters.

pub mod filter;
pub mod params;
pub mod widget;

pub use filter::{Filter, FilterModel, LogicalOperator};
pub use params::{
    Aggregation, Column, DatasetParams, GroupBy, OrderBy, Pagination, WindowSpec,
    ROW_NUMBER_FUNCTION, SOFT_DELETE_COLUMN, WINDOW_RANK_ALIAS,
};
pub use widget::{
    DataMappingFields, DataMappings, Field, JoinConfig, JoinEdge, SortBy, SortOrder,
    WidgetInstance, WidgetInstanceUpdate,
};
