//! Service-level error taxonomy.
//!
//! Definition errors (unsupported type, bad mappings) and storage errors
//! abort a request immediately. Execution errors are fail-fast across the
//! whole fan-out: one failing entry aborts the request with that entry's
//! reference attached.

use crate::compile::CompileError;
use crate::service::query::QueryError;
use crate::service::store::StoreError;

pub type DataServiceResult<T> = Result<T, DataServiceError>;

/// Errors surfaced by the widget data service.
#[derive(Debug, thiserror::Error)]
pub enum DataServiceError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("query for '{reference}' failed: {source}")]
    Execution {
        reference: String,
        #[source]
        source: QueryError,
    },
}
