use serde::{Deserialize, Serialize};
use strum::Display;
use crate::core::types::ColumnSelection;
use crate::filter::FilterGroup;
use crate::pivot::PivotConfig;


/// Events panels hand to the report builder.
///
/// Apply events carry the dataset key they were produced for, so an apply that arrives
/// after a dataset change can be recognised as stale.
#[derive(Debug, Clone, PartialEq, Display, Serialize, Deserialize)]
pub enum Action {
    /// User applied a dataset choice (or cleared it)
    DatasetApplied(Option<String>),
    /// User applied the columns panel
    ColumnsApplied {
        dataset_key: Option<String>,
        selection: ColumnSelection,
    },
    /// User applied the filter panel with a root group
    FilterApplied {
        dataset_key: Option<String>,
        filter: FilterGroup,
    },
    /// User applied the pivot layout panel
    PivotApplied {
        dataset_key: Option<String>,
        pivot: PivotConfig,
    },
    /// Drop everything, including the saved snapshot
    ClearAll,
    /// Revert to the last saved snapshot
    ResetToSaved,
}

impl Action {
    /// Dataset key an apply event was produced for; `None` for non-apply events
    pub fn source_dataset(&self) -> Option<Option<&str>> {
        match self {
            Action::ColumnsApplied { dataset_key, .. }
            | Action::FilterApplied { dataset_key, .. }
            | Action::PivotApplied { dataset_key, .. } => Some(dataset_key.as_deref()),
            Action::DatasetApplied(_) | Action::ClearAll | Action::ResetToSaved => None,
        }
    }
}
