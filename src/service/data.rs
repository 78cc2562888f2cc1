//! The widget data service: CRUD plus the execution orchestrator.
//!
//! Compilation stays synchronous; execution fans the compiled requests
//! out concurrently against the dataset-query service, post-processes
//! each result, and restores mapping declaration order. The fan-out is
//! fail-fast: once every launched request has settled, the first failure
//! aborts the whole operation and no partial results are returned.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Local;
use uuid::Uuid;

use crate::compile::{compile_widget, mapping_key, CompileContext, WidgetQueryParams};
use crate::config::Settings;
use crate::model::params::Pagination;
use crate::model::widget::{WidgetInstance, WidgetInstanceUpdate};
use crate::service::error::{DataServiceError, DataServiceResult};
use crate::service::postprocess::{flatten_tag_hierarchy, has_tag_column, tag_reference};
use crate::service::query::{DatasetQueryService, QueryOutput};
use crate::service::store::{StoredWidget, WidgetStore};

/// Orchestrates widget reads, writes and data requests.
pub struct WidgetDataService {
    store: Arc<dyn WidgetStore>,
    queries: Arc<dyn DatasetQueryService>,
    settings: Settings,
}

impl WidgetDataService {
    pub fn new(store: Arc<dyn WidgetStore>, queries: Arc<dyn DatasetQueryService>) -> Self {
        Self::with_settings(store, queries, Settings::default())
    }

    pub fn with_settings(
        store: Arc<dyn WidgetStore>,
        queries: Arc<dyn DatasetQueryService>,
        settings: Settings,
    ) -> Self {
        Self {
            store,
            queries,
            settings,
        }
    }

    // =========================================================================
    // Widget CRUD
    // =========================================================================

    pub async fn get_widget_instance(&self, id: Uuid) -> DataServiceResult<WidgetInstance> {
        Ok(self.store.get(id).await?.into_instance()?)
    }

    /// Store a new widget instance, assigning an id when the payload
    /// carries the nil id.
    pub async fn create_widget_instance(
        &self,
        mut widget: WidgetInstance,
    ) -> DataServiceResult<WidgetInstance> {
        if widget.id.is_nil() {
            widget.id = Uuid::new_v4();
        }
        let stored = self.store.create(StoredWidget::from_instance(&widget)?).await?;
        Ok(stored.into_instance()?)
    }

    /// Partial update: only non-empty/non-nil payload fields overwrite
    /// the stored instance.
    pub async fn update_widget_instance(
        &self,
        id: Uuid,
        update: WidgetInstanceUpdate,
    ) -> DataServiceResult<WidgetInstance> {
        let mut widget = self.get_widget_instance(id).await?;
        widget.apply_update(update);
        let stored = self.store.update(StoredWidget::from_instance(&widget)?).await?;
        Ok(stored.into_instance()?)
    }

    // =========================================================================
    // Data execution
    // =========================================================================

    /// Compile a widget and execute every compiled request, returning one
    /// post-processed result per mapping in declaration order.
    pub async fn get_widget_instance_data(
        &self,
        organization_id: i64,
        widget_id: Uuid,
        params: &WidgetQueryParams,
    ) -> DataServiceResult<Vec<QueryOutput>> {
        let widget = self.get_widget_instance(widget_id).await?;

        let ctx = CompileContext::from_params(params, Local::now().naive_local())?;
        let mut compiled = compile_widget(&widget, &ctx)?;

        // Results are capped, never paged: one page at the row cap.
        let pagination = Pagination {
            page: 1,
            page_size: self.settings.limits.max_result_rows,
        };
        for entry in compiled.values_mut() {
            entry.params.pagination = pagination;
        }

        let populate_empty = compiled.len() > 1;

        let requests = compiled.iter().map(|(reference, entry)| async move {
            match self
                .queries
                .execute(organization_id, entry.dataset_id, &entry.params)
                .await
            {
                Ok(mut output) => {
                    if has_tag_column(&output) {
                        flatten_tag_hierarchy(&mut output);
                    }
                    tag_reference(&mut output, reference, populate_empty);
                    Ok((reference.clone(), output))
                }
                Err(source) => {
                    tracing::error!(
                        reference = %reference,
                        error = %source,
                        "dataset query failed"
                    );
                    Err(DataServiceError::Execution {
                        reference: reference.clone(),
                        source,
                    })
                }
            }
        });

        let settled = futures::future::join_all(requests).await;

        let mut by_reference: HashMap<String, QueryOutput> = HashMap::new();
        for result in settled {
            let (reference, output) = result?;
            by_reference.insert(reference, output);
        }

        // Restore mapping declaration order; a reference with no result is
        // dropped (cannot happen under fail-fast, tolerated regardless).
        let mut ordered = Vec::with_capacity(by_reference.len());
        for (index, mapping) in widget.data_mappings.mappings.iter().enumerate() {
            if let Some(output) = by_reference.remove(&mapping_key(mapping, index)) {
                ordered.push(output);
            }
        }

        Ok(ordered)
    }
}
