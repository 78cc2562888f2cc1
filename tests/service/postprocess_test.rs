//! Tag flattening and reference tagging.

use serde_json::{json, Value};
use sightline::service::postprocess::{
    flatten_tag_hierarchy, has_tag_column, tag_reference, REFERENCE_COLUMN, TAG_COLUMN, UNTAGGED,
};
use sightline::service::{ColumnMeta, QueryOutput, Row};

fn tagged_row(tag: Value, amount: i64) -> Row {
    let mut row = Row::new();
    row.insert(TAG_COLUMN.to_string(), tag);
    row.insert("amount".to_string(), json!(amount));
    row
}

fn tagged_output(tags: Vec<Value>) -> QueryOutput {
    QueryOutput {
        rows: tags
            .into_iter()
            .enumerate()
            .map(|(i, tag)| tagged_row(tag, i as i64))
            .collect(),
        columns: vec![
            ColumnMeta::text(TAG_COLUMN),
            ColumnMeta {
                name: "amount".to_string(),
                database_type: "bigint".to_string(),
            },
        ],
    }
}

#[test]
fn column_set_spans_the_maximum_observed_depth() {
    let mut output = tagged_output(vec![
        json!("a.b.c"),
        json!("x"),
        json!("p.q.r.s"),
    ]);

    flatten_tag_hierarchy(&mut output);

    let names: Vec<_> = output.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "amount",
            "tag_hierarchy_1",
            "tag_hierarchy_2",
            "tag_hierarchy_3",
            "tag_hierarchy_4"
        ]
    );

    // Depth-3 row fills levels 1..3 and omits level 4.
    assert_eq!(output.rows[0]["tag_hierarchy_1"], json!("a"));
    assert_eq!(output.rows[0]["tag_hierarchy_3"], json!("c"));
    assert!(!output.rows[0].contains_key("tag_hierarchy_4"));

    // Depth-1 row only fills level 1.
    assert_eq!(output.rows[1]["tag_hierarchy_1"], json!("x"));
    assert!(!output.rows[1].contains_key("tag_hierarchy_2"));

    // Depth-4 row reaches the deepest level.
    assert_eq!(output.rows[2]["tag_hierarchy_4"], json!("s"));
}

#[test]
fn tag_column_is_removed_from_rows_and_columns() {
    let mut output = tagged_output(vec![json!("a.b")]);
    assert!(has_tag_column(&output));

    flatten_tag_hierarchy(&mut output);

    assert!(!has_tag_column(&output));
    assert!(!output.rows[0].contains_key(TAG_COLUMN));
    assert_eq!(output.rows[0]["amount"], json!(0));
}

#[test]
fn null_tags_become_the_untagged_sentinel() {
    let mut output = tagged_output(vec![json!(null), json!("a.b")]);
    flatten_tag_hierarchy(&mut output);
    assert_eq!(output.rows[0]["tag_hierarchy_1"], json!(UNTAGGED));
    assert!(!output.rows[0].contains_key("tag_hierarchy_2"));
}

#[test]
fn reference_is_stamped_on_every_row() {
    let mut output = tagged_output(vec![json!("a"), json!("b")]);
    tag_reference(&mut output, "actuals", true);

    assert_eq!(output.columns.last().unwrap().name, REFERENCE_COLUMN);
    for row in &output.rows {
        assert_eq!(row[REFERENCE_COLUMN], json!("actuals"));
    }
}

#[test]
fn empty_result_synthesizes_one_row_when_requested() {
    let mut output = QueryOutput::default();
    tag_reference(&mut output, "budget", true);

    assert_eq!(output.rows.len(), 1);
    assert_eq!(output.rows[0].len(), 1);
    assert_eq!(output.rows[0][REFERENCE_COLUMN], json!("budget"));
}

#[test]
fn empty_result_stays_empty_without_population() {
    let mut output = QueryOutput::default();
    tag_reference(&mut output, "budget", false);
    assert!(output.rows.is_empty());
    assert_eq!(output.columns.last().unwrap().name, REFERENCE_COLUMN);
}
