//! Pivot table compilation.
//!
//! Unlike the chart strategies, a pivot table compiles every mapping in
//! the widget: each mapping becomes its own request, keyed by its
//! reference, so one pivot can combine several datasets side by side.

use std::collections::HashMap;

use crate::compile::base::{compile_mapping, push_group_field, push_value_field};
use crate::compile::strategy::{roles, WidgetStrategy};
use crate::compile::{mapping_key, CompileContext, CompileError, CompileResult, CompiledQuery};
use crate::model::widget::WidgetInstance;

/// Compiles pivot tables: rows-role and columns-role fields group (rows
/// first), each values-role field aggregates.
pub struct PivotTableStrategy;

impl WidgetStrategy for PivotTableStrategy {
    fn compile(
        &self,
        widget: &WidgetInstance,
        ctx: &CompileContext,
    ) -> CompileResult<HashMap<String, CompiledQuery>> {
        let mappings = &widget.data_mappings.mappings;
        if mappings.is_empty() {
            return Err(CompileError::NoMappings(widget.widget_type.clone()));
        }

        let mut compiled = HashMap::with_capacity(mappings.len());
        for (index, mapping) in mappings.iter().enumerate() {
            let params = compile_mapping(mapping, ctx, |mapping, params| {
                for field in mapping.role_fields(roles::ROWS) {
                    push_group_field(params, field);
                }
                for field in mapping.role_fields(roles::COLUMNS) {
                    push_group_field(params, field);
                }
                for field in mapping.role_fields(roles::VALUES) {
                    push_value_field(params, mapping, field)?;
                }
                Ok(())
            })?;

            compiled.insert(
                mapping_key(mapping, index),
                CompiledQuery {
                    dataset_id: mapping.dataset_id,
                    params,
                },
            );
        }

        Ok(compiled)
    }
}
