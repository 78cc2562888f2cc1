//! Result post-processing: tag flattening and reference tagging.

use serde_json::Value;

use crate::service::query::{ColumnMeta, QueryOutput, Row};

/// Column carrying dot-separated hierarchical tag paths.
pub const TAG_COLUMN: &str = "tag";

/// Sentinel emitted for rows with no tag value.
pub const UNTAGGED: &str = "__UNTAGGED__";

/// Column carrying each row's mapping reference.
pub const REFERENCE_COLUMN: &str = "ref";

fn hierarchy_column(level: usize) -> String {
    format!("{TAG_COLUMN}_hierarchy_{level}")
}

/// Whether a result carries the tag column.
pub fn has_tag_column(output: &QueryOutput) -> bool {
    output.columns.iter().any(|c| c.name == TAG_COLUMN)
}

/// Split each row's tag path (`a.b.c`) into per-level columns.
///
/// Levels are numbered from 1; columns are added for every level up to
/// the maximum depth observed across all rows, and a row shallower than
/// that simply omits the deeper keys. A missing or null tag becomes the
/// `__UNTAGGED__` sentinel at level 1. The original tag column is
/// removed.
pub fn flatten_tag_hierarchy(output: &mut QueryOutput) {
    let mut max_depth = 0;

    for row in &mut output.rows {
        let segments = tag_segments(row.remove(TAG_COLUMN));
        max_depth = max_depth.max(segments.len());
        for (index, segment) in segments.into_iter().enumerate() {
            row.insert(hierarchy_column(index + 1), Value::String(segment));
        }
    }

    output.columns.retain(|c| c.name != TAG_COLUMN);
    for level in 1..=max_depth {
        output.columns.push(ColumnMeta::text(hierarchy_column(level)));
    }
}

fn tag_segments(value: Option<Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => vec![UNTAGGED.to_string()],
        Some(Value::String(path)) => path.split('.').map(str::to_string).collect(),
        Some(other) => vec![other.to_string()],
    }
}

/// Stamp every row with the mapping reference.
///
/// When the result is empty and `populate_empty` is set, exactly one row
/// containing only the reference column is synthesized so multi-mapping
/// responses stay aligned.
pub fn tag_reference(output: &mut QueryOutput, reference: &str, populate_empty: bool) {
    output.columns.push(ColumnMeta::text(REFERENCE_COLUMN));

    if output.rows.is_empty() {
        if populate_empty {
            let mut row = Row::new();
            row.insert(
                REFERENCE_COLUMN.to_string(),
                Value::String(reference.to_string()),
            );
            output.rows.push(row);
        }
        return;
    }

    for row in &mut output.rows {
        row.insert(
            REFERENCE_COLUMN.to_string(),
            Value::String(reference.to_string()),
        );
    }
}
