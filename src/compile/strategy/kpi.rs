//! KPI compilation.

use std::collections::HashMap;

use crate::compile::base::{compile_mapping, push_value_field};
use crate::compile::strategy::{roles, WidgetStrategy};
use crate::compile::{mapping_key, CompileContext, CompileError, CompileResult, CompiledQuery};
use crate::model::widget::WidgetInstance;

/// Compiles KPIs: the primary-value field aggregates, usually ungrouped.
///
/// The comparison-value and time-comparison roles are accepted in the
/// data model but not compiled into the request; the display layer
/// derives comparisons from separate widget configurations.
pub struct KpiStrategy;

impl WidgetStrategy for KpiStrategy {
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
            if let Some(field) = mapping.first_field(roles::PRIMARY_VALUE) {
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
