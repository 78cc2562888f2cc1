//! Execution orchestration: fan-out, ordering, fail-fast, CRUD.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use sightline::compile::WidgetQueryParams;
use sightline::model::{
    DataMappingFields, DataMappings, DatasetParams, Field, WidgetInstance, WidgetInstanceUpdate,
};
use sightline::service::postprocess::REFERENCE_COLUMN;
use sightline::service::{
    ColumnMeta, DataServiceError, DatasetQueryService, MemoryWidgetStore, QueryError, QueryOutput,
    Row, StoreError, StoredWidget, WidgetDataService, WidgetStore,
};
use uuid::Uuid;

// ============================================================================
// Test doubles
// ============================================================================

#[derive(Clone)]
struct Scripted {
    delay_ms: u64,
    result: Result<QueryOutput, QueryError>,
}

/// Dataset-query fake: per-dataset scripted responses with optional
/// delays, capturing every request it receives.
#[derive(Default)]
struct ScriptedQueryService {
    responses: HashMap<i64, Scripted>,
    captured: Mutex<Vec<(i64, DatasetParams)>>,
}

impl ScriptedQueryService {
    fn respond(mut self, dataset_id: i64, delay_ms: u64, result: Result<QueryOutput, QueryError>) -> Self {
        self.responses.insert(dataset_id, Scripted { delay_ms, result });
        self
    }
}

#[async_trait]
impl DatasetQueryService for ScriptedQueryService {
    async fn execute(
        &self,
        _organization_id: i64,
        dataset_id: i64,
        params: &DatasetParams,
    ) -> Result<QueryOutput, QueryError> {
        self.captured
            .lock()
            .unwrap()
            .push((dataset_id, params.clone()));

        let scripted = self
            .responses
            .get(&dataset_id)
            .cloned()
            .unwrap_or_else(|| Scripted {
                delay_ms: 0,
                result: Ok(QueryOutput::default()),
            });

        if scripted.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(scripted.delay_ms)).await;
        }
        scripted.result
    }
}

fn output_with_rows(column: &str, values: &[i64]) -> QueryOutput {
    QueryOutput {
        rows: values
            .iter()
            .map(|v| {
                let mut row = Row::new();
                row.insert(column.to_string(), json!(v));
                row
            })
            .collect(),
        columns: vec![ColumnMeta {
            name: column.to_string(),
            database_type: "bigint".to_string(),
        }],
    }
}

// ============================================================================
// Widget builders
// ============================================================================

fn value_mapping(dataset_id: i64, reference: &str) -> DataMappingFields {
    DataMappingFields {
        dataset_id,
        reference: reference.to_string(),
        fields: HashMap::from([(
            "values".to_string(),
            vec![Field {
                column: "amount".to_string(),
                aggregation: Some("sum".to_string()),
                ..Default::default()
            }],
        )]),
        ..Default::default()
    }
}

fn pivot_widget(mappings: Vec<DataMappingFields>) -> WidgetInstance {
    WidgetInstance {
        id: Uuid::nil(),
        widget_type: "pivot_table".to_string(),
        sheet_id: Uuid::new_v4(),
        title: "pivot".to_string(),
        data_mappings: DataMappings {
            version: "v1".to_string(),
            mappings,
        },
        display_config: None,
    }
}

fn service_with(
    queries: ScriptedQueryService,
) -> (WidgetDataService, Arc<dyn WidgetStore>) {
    let store: Arc<dyn WidgetStore> = Arc::new(MemoryWidgetStore::new());
    let service = WidgetDataService::new(Arc::clone(&store), Arc::new(queries));
    (service, store)
}

// ============================================================================
// Execution
// ============================================================================

#[tokio::test]
async fn results_follow_mapping_declaration_order() {
    // The first mapping's query finishes last.
    let queries = ScriptedQueryService::default()
        .respond(1, 50, Ok(output_with_rows("amount", &[10])))
        .respond(2, 0, Ok(output_with_rows("amount", &[20])));
    let (service, _) = service_with(queries);

    let widget = service
        .create_widget_instance(pivot_widget(vec![
            value_mapping(1, "slow"),
            value_mapping(2, "fast"),
        ]))
        .await
        .unwrap();

    let results = service
        .get_widget_instance_data(99, widget.id, &WidgetQueryParams::default())
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].rows[0][REFERENCE_COLUMN], json!("slow"));
    assert_eq!(results[1].rows[0][REFERENCE_COLUMN], json!("fast"));
}

#[tokio::test]
async fn one_failing_query_aborts_the_whole_request() {
    let queries = ScriptedQueryService::default()
        .respond(1, 0, Ok(output_with_rows("amount", &[10])))
        .respond(2, 0, Err(QueryError::new("relation does not exist")));
    let (service, _) = service_with(queries);

    let widget = service
        .create_widget_instance(pivot_widget(vec![
            value_mapping(1, "good"),
            value_mapping(2, "bad"),
        ]))
        .await
        .unwrap();

    let result = service
        .get_widget_instance_data(99, widget.id, &WidgetQueryParams::default())
        .await;

    match result {
        Err(DataServiceError::Execution { reference, .. }) => assert_eq!(reference, "bad"),
        other => panic!("expected execution error, got {other:?}"),
    }
}

#[tokio::test]
async fn pagination_is_forced_to_one_capped_page() {
    let queries = ScriptedQueryService::default();
    let store: Arc<dyn WidgetStore> = Arc::new(MemoryWidgetStore::new());
    let captured_service = Arc::new(queries);
    let service = WidgetDataService::new(
        Arc::clone(&store),
        Arc::clone(&captured_service) as Arc<dyn DatasetQueryService>,
    );

    let widget = service
        .create_widget_instance(pivot_widget(vec![value_mapping(1, "only")]))
        .await
        .unwrap();

    service
        .get_widget_instance_data(99, widget.id, &WidgetQueryParams::default())
        .await
        .unwrap();

    let captured = captured_service.captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].1.pagination.page, 1);
    assert_eq!(captured[0].1.pagination.page_size, 10_000);
}

#[tokio::test]
async fn empty_results_are_populated_only_with_multiple_mappings() {
    let queries = ScriptedQueryService::default()
        .respond(1, 0, Ok(output_with_rows("amount", &[10])))
        .respond(2, 0, Ok(QueryOutput::default()));
    let (service, _) = service_with(queries);

    let widget = service
        .create_widget_instance(pivot_widget(vec![
            value_mapping(1, "actuals"),
            value_mapping(2, "budget"),
        ]))
        .await
        .unwrap();

    let results = service
        .get_widget_instance_data(99, widget.id, &WidgetQueryParams::default())
        .await
        .unwrap();

    // The empty budget result holds exactly one synthesized row.
    assert_eq!(results[1].rows.len(), 1);
    assert_eq!(results[1].rows[0].len(), 1);
    assert_eq!(results[1].rows[0][REFERENCE_COLUMN], json!("budget"));
}

#[tokio::test]
async fn single_empty_result_is_not_populated() {
    let queries = ScriptedQueryService::default().respond(1, 0, Ok(QueryOutput::default()));
    let (service, _) = service_with(queries);

    let widget = service
        .create_widget_instance(pivot_widget(vec![value_mapping(1, "only")]))
        .await
        .unwrap();

    let results = service
        .get_widget_instance_data(99, widget.id, &WidgetQueryParams::default())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].rows.is_empty());
    assert_eq!(results[0].columns.last().unwrap().name, REFERENCE_COLUMN);
}

#[tokio::test]
async fn tag_columns_are_flattened_before_reference_tagging() {
    let tagged = QueryOutput {
        rows: vec![{
            let mut row = Row::new();
            row.insert("tag".to_string(), json!("ops.infra"));
            row.insert("amount".to_string(), json!(5));
            row
        }],
        columns: vec![
            ColumnMeta::text("tag"),
            ColumnMeta {
                name: "amount".to_string(),
                database_type: "bigint".to_string(),
            },
        ],
    };
    let queries = ScriptedQueryService::default().respond(1, 0, Ok(tagged));
    let (service, _) = service_with(queries);

    let widget = service
        .create_widget_instance(pivot_widget(vec![value_mapping(1, "tagged")]))
        .await
        .unwrap();

    let results = service
        .get_widget_instance_data(99, widget.id, &WidgetQueryParams::default())
        .await
        .unwrap();

    let row = &results[0].rows[0];
    assert_eq!(row["tag_hierarchy_1"], json!("ops"));
    assert_eq!(row["tag_hierarchy_2"], json!("infra"));
    assert!(!row.contains_key("tag"));
    assert_eq!(row[REFERENCE_COLUMN], json!("tagged"));
}

// ============================================================================
// CRUD
// ============================================================================

#[tokio::test]
async fn create_assigns_an_id_and_round_trips() {
    let (service, _) = service_with(ScriptedQueryService::default());

    let created = service
        .create_widget_instance(pivot_widget(vec![value_mapping(1, "only")]))
        .await
        .unwrap();
    assert!(!created.id.is_nil());

    let fetched = service.get_widget_instance(created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn update_overwrites_only_provided_fields() {
    let (service, _) = service_with(ScriptedQueryService::default());

    let created = service
        .create_widget_instance(pivot_widget(vec![value_mapping(1, "only")]))
        .await
        .unwrap();

    let updated = service
        .update_widget_instance(
            created.id,
            WidgetInstanceUpdate {
                title: Some("renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "renamed");
    assert_eq!(updated.widget_type, created.widget_type);
    assert_eq!(updated.data_mappings, created.data_mappings);
}

#[tokio::test]
async fn malformed_stored_mappings_are_a_hard_error() {
    let (service, store) = service_with(ScriptedQueryService::default());

    let id = Uuid::new_v4();
    store
        .create(StoredWidget {
            id,
            widget_type: "bar_chart".to_string(),
            sheet_id: Uuid::new_v4(),
            title: "broken".to_string(),
            data_mappings: b"{not valid json".to_vec(),
            display_config: None,
        })
        .await
        .unwrap();

    let result = service.get_widget_instance(id).await;
    assert!(matches!(
        result,
        Err(DataServiceError::Store(StoreError::InvalidMappings(_)))
    ));
}
