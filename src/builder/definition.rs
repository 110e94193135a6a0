//! Conversion between builder state and the persisted report definition
use super::state::ReportBuilderState;
use crate::core::models::DynamicReportDefinition;
use crate::core::types::{ColumnSelection, ColumnSelectionEntry, ColumnVO};
use crate::pivot::PivotConfig;

fn non_empty(cols: &[ColumnVO]) -> Option<Vec<ColumnVO>> {
    if cols.is_empty() { None } else { Some(cols.to_vec()) }
}

/// Persistable definition for `state`; `None` until a dataset is chosen.
///
/// Only selected columns are kept, in display order. Group flags and unselected entries
/// are not part of the definition.
pub fn state_to_definition(state: &ReportBuilderState) -> Option<DynamicReportDefinition> {
    let dataset_key = state.dataset_key.clone()?;
    Some(DynamicReportDefinition {
        dataset_key,
        selected_columns: state.columns.selected_names(),
        filter: state.filter.clone(),
        row_group_cols: non_empty(&state.pivot.row_group_cols),
        pivot_cols: non_empty(&state.pivot.pivot_cols),
        value_cols: non_empty(&state.pivot.value_cols),
    })
}

/// Builder state for a stored definition: every listed column selected, ordered by position
pub fn definition_to_state(definition: &DynamicReportDefinition) -> ReportBuilderState {
    let columns = definition
        .selected_columns
        .iter()
        .enumerate()
        .map(|(i, name)| ColumnSelectionEntry {
            name: name.clone(),
            selected: true,
            is_group: false,
            order: i as i64,
        })
        .collect();
    ReportBuilderState {
        dataset_key: Some(definition.dataset_key.clone()),
        columns: ColumnSelection { columns },
        filter: definition.filter.clone(),
        pivot: PivotConfig {
            row_group_cols: definition.row_group_cols.clone().unwrap_or_default(),
            pivot_cols: definition.pivot_cols.clone().unwrap_or_default(),
            value_cols: definition.value_cols.clone().unwrap_or_default(),
        },
    }
}
