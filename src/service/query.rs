//! The dataset-query service boundary.
//!
//! The engine that actually runs a compiled request is external; this
//! crate only hands it a [`DatasetParams`] and consumes rows and column
//! metadata back.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::params::DatasetParams;

/// One result row: column name to value.
pub type Row = HashMap<String, Value>;

/// Metadata for one result column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    pub database_type: String,
}

impl ColumnMeta {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            database_type: "text".to_string(),
        }
    }
}

/// Rows and column metadata returned for one compiled request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOutput {
    pub rows: Vec<Row>,
    pub columns: Vec<ColumnMeta>,
}

/// Error surfaced by the dataset-query service.
#[derive(Debug, Clone, thiserror::Error)]
#[error("dataset query failed: {message}")]
pub struct QueryError {
    pub message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type QueryServiceResult<T> = Result<T, QueryError>;

/// Executes compiled dataset query requests.
#[async_trait]
pub trait DatasetQueryService: Send + Sync {
    async fn execute(
        &self,
        organization_id: i64,
        dataset_id: i64,
        params: &DatasetParams,
    ) -> QueryServiceResult<QueryOutput>;
}
