//! Service layer: storage and query boundaries, post-processing, and the
//! execution orchestrator.

pub mod data;
pub mod error;
pub mod postprocess;
pub mod query;
pub mod store;

pub use data::WidgetDataService;
pub use error::{DataServiceError, DataServiceResult};
pub use query::{ColumnMeta, DatasetQueryService, QueryError, QueryOutput, Row};
pub use store::{MemoryWidgetStore, StoreError, StoredWidget, WidgetStore};
