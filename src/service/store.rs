//! Widget storage boundary and the data-mappings byte codec.
//!
//! Stores persist the mappings as an opaque JSON byte payload; the codec
//! here is the single place that encoding is produced and consumed.
//! Malformed stored bytes are a hard error surfaced to the caller.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::model::widget::{DataMappings, WidgetInstance};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in widget storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("widget instance not found: {0}")]
    NotFound(Uuid),

    #[error("invalid data mappings encoding: {0}")]
    InvalidMappings(#[from] serde_json::Error),

    #[error("widget store error: {0}")]
    Backend(String),
}

/// A widget as persisted: mappings are raw bytes.
#[derive(Debug, Clone)]
pub struct StoredWidget {
    pub id: Uuid,
    pub widget_type: String,
    pub sheet_id: Uuid,
    pub title: String,
    pub data_mappings: Vec<u8>,
    pub display_config: Option<Value>,
}

pub fn encode_data_mappings(mappings: &DataMappings) -> StoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(mappings)?)
}

pub fn decode_data_mappings(payload: &[u8]) -> StoreResult<DataMappings> {
    Ok(serde_json::from_slice(payload)?)
}

impl StoredWidget {
    pub fn from_instance(widget: &WidgetInstance) -> StoreResult<Self> {
        Ok(Self {
            id: widget.id,
            widget_type: widget.widget_type.clone(),
            sheet_id: widget.sheet_id,
            title: widget.title.clone(),
            data_mappings: encode_data_mappings(&widget.data_mappings)?,
            display_config: widget.display_config.clone(),
        })
    }

    pub fn into_instance(self) -> StoreResult<WidgetInstance> {
        Ok(WidgetInstance {
            id: self.id,
            widget_type: self.widget_type,
            sheet_id: self.sheet_id,
            title: self.title,
            data_mappings: decode_data_mappings(&self.data_mappings)?,
            display_config: self.display_config,
        })
    }
}

/// Persists widget instances.
#[async_trait]
pub trait WidgetStore: Send + Sync {
    async fn get(&self, id: Uuid) -> StoreResult<StoredWidget>;
    async fn create(&self, widget: StoredWidget) -> StoreResult<StoredWidget>;
    async fn update(&self, widget: StoredWidget) -> StoreResult<StoredWidget>;
}

/// In-memory store, for tests and embedders without persistence.
#[derive(Default)]
pub struct MemoryWidgetStore {
    widgets: RwLock<HashMap<Uuid, StoredWidget>>,
}

impl MemoryWidgetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WidgetStore for MemoryWidgetStore {
    async fn get(&self, id: Uuid) -> StoreResult<StoredWidget> {
        self.widgets
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn create(&self, widget: StoredWidget) -> StoreResult<StoredWidget> {
        let mut widgets = self.widgets.write().await;
        widgets.insert(widget.id, widget.clone());
        Ok(widget)
    }

    async fn update(&self, widget: StoredWidget) -> StoreResult<StoredWidget> {
        let mut widgets = self.widgets.write().await;
        if !widgets.contains_key(&widget.id) {
            return Err(StoreError::NotFound(widget.id));
        }
        widgets.insert(widget.id, widget.clone());
        Ok(widget)
    }
}
