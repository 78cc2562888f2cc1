//! Pie and donut chart compilation.

use std::collections::HashMap;

use crate::compile::base::{compile_mapping, push_group_field, push_value_field};
use crate::compile::strategy::{roles, WidgetStrategy};
use crate::compile::{mapping_key, CompileContext, CompileError, CompileResult, CompiledQuery};
use crate::model::widget::WidgetInstance;

/// Compiles pie and donut charts: the slices field groups, the values
/// field aggregates.
pub struct PieChartStrategy;

impl WidgetStrategy for PieChartStrategy {
    fn compile(
        &self,
        widget: &WidgetInstance,
        ctx: &CompileContext,
    ) -> CompileResult<HashMap<String, CompiledQuery>> {
        let mapping = widget
            .data_mappings
            .mappings
            .first()
            .ok_or_else(|| CompileError::NoMappings(widget.widget_type.clone()))?;

        let params = compile_mapping(mapping, ctx, |mapping, params| {
            if let Some(field) = mapping.first_field(roles::SLICES) {
                push_group_field(params, field);
            }
            if let Some(field) = mapping.first_field(roles::VALUES) {
                push_value_field(params, mapping, field)?;
            }
            Ok(())
        })?;

        Ok(HashMap::from([(
            mapping_key(mapping, 0),
            CompiledQuery {
                dataset_id: mapping.dataset_id,
                params,
            },
        )]))
    }
}
