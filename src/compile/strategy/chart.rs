//! Basic chart compilation (bar and line charts).

use std::collections::HashMap;

use crate::compile::base::{compile_mapping, push_group_field, push_value_field};
use crate::compile::strategy::{roles, WidgetStrategy};
use crate::compile::{mapping_key, CompileContext, CompileError, CompileResult, CompiledQuery};
use crate::model::widget::WidgetInstance;

/// Compiles bar and line charts: the x-axis field groups, the y-axis
/// field aggregates, extra group-by fields refine the grouping.
pub struct BasicChartStrategy;

impl WidgetStrategy for BasicChartStrategy {
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
            if let Some(field) = mapping.first_field(roles::X_AXIS) {
                push_group_field(params, field);
            }
            if let Some(field) = mapping.first_field(roles::Y_AXIS) {
                push_value_field(params, mapping, field)?;
            }
            for field in mapping.role_fields(roles::GROUP_BY) {
                push_group_field(params, field);
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
