//! Aggregate report builder state and report-level dirtiness
use crate::core::types::ColumnSelection;
use crate::filter::FilterGroup;
use crate::pivot::PivotConfig;
use serde::{Deserialize, Serialize};

/// Applied values of every panel, folded together
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportBuilderState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_key: Option<String>,
    #[serde(default)]
    pub columns: ColumnSelection,
    #[serde(default)]
    pub filter: FilterGroup,
    #[serde(default)]
    pub pivot: PivotConfig,
}

impl ReportBuilderState {
    /// Anything differs from the empty state
    pub fn has_non_default_state(&self) -> bool {
        *self != Self::default()
    }

    /// Empty state bound to `dataset_key`
    pub fn for_dataset(dataset_key: Option<String>) -> Self {
        Self {
            dataset_key,
            ..Self::default()
        }
    }
}

/// Current state differs from the saved snapshot; with no snapshot, any non-default
/// state is unsaved work.
pub fn is_report_dirty(current: &ReportBuilderState, saved: Option<&ReportBuilderState>) -> bool {
    match saved {
        Some(saved) => current != saved,
        None => current.has_non_default_state(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_without_snapshot() {
        let state = ReportBuilderState::default();
        assert!(!state.has_non_default_state());
        assert!(!is_report_dirty(&state, None));

        let state = ReportBuilderState::for_dataset(Some("sales".to_string()));
        assert!(is_report_dirty(&state, None));
    }

    #[test]
    fn test_dirty_against_snapshot() {
        let saved = ReportBuilderState::for_dataset(Some("sales".to_string()));
        let mut current = saved.clone();
        assert!(!is_report_dirty(&current, Some(&saved)));

        current.filter.negate = true;
        assert!(is_report_dirty(&current, Some(&saved)));
    }
}
