//! # Sightline
//!
//! A widget compiler that turns declarative visual definitions into
//! dataset queries.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            WidgetInstance (stored definition)            │
//! │   (data mappings: visual roles → dataset columns)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compile]
//! ┌─────────────────────────────────────────────────────────┐
//! │        ref → DatasetParams (one per data mapping)        │
//! │   (group-bys, aggregations, filters, buckets, sort)      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [service - concurrent fan-out]
//! ┌─────────────────────────────────────────────────────────┐
//! │        dataset-query service (external black box)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [post-processing]
//! ┌─────────────────────────────────────────────────────────┐
//! │   tag flattening + ref tagging, declaration-ordered      │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod compile;
pub mod config;
pub mod model;
pub mod service;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{
        compile_widget, CompileContext, CompileError, CompiledQuery, WidgetQueryParams,
    };
    pub use crate::config::Settings;
    pub use crate::model::{
        DataMappingFields, DataMappings, DatasetParams, Field, Filter, FilterModel,
        LogicalOperator, SortBy, SortOrder, WidgetInstance,
    };
    pub use crate::service::{
        DatasetQueryService, MemoryWidgetStore, QueryOutput, WidgetDataService, WidgetStore,
    };
}
