//! PivotPanel: places dimensions and measures into the rows, columns and values zones
use crate::action::Action;
use crate::core::DirtyTracker;
use crate::core::types::{AggFunc, ColumnMeta, ColumnVO};
use crate::pivot::{
    PivotConfig, PivotError, PivotZone, add_to_zone, column_vo_from_meta_or, remove_from_zone, reorder_in_zone,
    unplaced_dimensions, unplaced_measures, update_agg_func, validate_pivot,
};
use std::borrow::Cow;
use tracing::debug;

#[derive(Debug, Default, Clone)]
pub struct PivotPanel {
    dataset_key: Option<String>,
    columns: Vec<ColumnMeta>,
    default_agg: AggFunc,
    tracker: DirtyTracker<PivotConfig>,
}

impl PivotPanel {
    pub fn new(default_agg: AggFunc) -> Self {
        Self {
            default_agg,
            ..Self::default()
        }
    }

    pub fn set_columns(&mut self, columns: Vec<ColumnMeta>) {
        self.columns = columns;
    }

    pub fn reset(&mut self, dataset_key: Option<String>, config: PivotConfig) {
        self.dataset_key = dataset_key;
        self.tracker.reset(config);
    }

    pub fn config(&self) -> &PivotConfig {
        self.tracker.current()
    }

    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    pub fn undo(&mut self) {
        self.tracker.undo();
    }

    fn meta(&self, id: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|c| c.name == id)
    }

    /// Place a dimension in rows or columns. Returns false for unknown columns,
    /// non-dimensions, or the values zone.
    pub fn add_dimension(&mut self, zone: PivotZone, id: &str) -> bool {
        if zone == PivotZone::Values {
            return false;
        }
        let Some(meta) = self.meta(id).filter(|m| m.is_dimension) else {
            debug!("{id} is not a known dimension");
            return false;
        };
        let next = add_to_zone(self.tracker.current(), zone, ColumnVO::dimension(meta));
        self.tracker.set_current(next);
        true
    }

    /// Place a measure in values, with `agg` or the column's default aggregate
    pub fn add_measure(&mut self, id: &str, agg: Option<AggFunc>) -> bool {
        let Some(meta) = self.meta(id).filter(|m| m.is_measure) else {
            debug!("{id} is not a known measure");
            return false;
        };
        if let Some(agg) = agg {
            if !meta.allows_agg(agg) {
                return false;
            }
        }
        let column = column_vo_from_meta_or(meta, agg, self.default_agg);
        let next = add_to_zone(self.tracker.current(), PivotZone::Values, column);
        self.tracker.set_current(next);
        true
    }

    pub fn remove(&mut self, zone: PivotZone, id: &str) {
        let next = remove_from_zone(self.tracker.current(), zone, id);
        self.tracker.set_current(next);
    }

    /// Returns whether anything moved
    pub fn reorder(&mut self, zone: PivotZone, from: usize, to: usize) -> bool {
        match reorder_in_zone(self.tracker.current(), zone, from, to) {
            Cow::Borrowed(_) => false,
            Cow::Owned(next) => {
                self.tracker.set_current(next);
                true
            }
        }
    }

    pub fn set_agg_func(&mut self, id: &str, agg: AggFunc) -> Result<(), PivotError> {
        if let Some(meta) = self.meta(id) {
            if !meta.allows_agg(agg) {
                return Err(PivotError::AggNotAllowed {
                    column: id.to_string(),
                    agg,
                });
            }
        }
        let next = update_agg_func(self.tracker.current(), id, agg);
        self.tracker.set_current(next);
        Ok(())
    }

    pub fn unplaced_dimensions(&self) -> Vec<&ColumnMeta> {
        unplaced_dimensions(&self.columns, self.tracker.current())
    }

    pub fn unplaced_measures(&self) -> Vec<&ColumnMeta> {
        unplaced_measures(&self.columns, self.tracker.current())
    }

    /// Validate, then apply. An invalid layout stays in the draft.
    pub fn apply(&mut self) -> Result<Action, PivotError> {
        validate_pivot(self.tracker.current(), &self.columns)?;
        Ok(Action::PivotApplied {
            dataset_key: self.dataset_key.clone(),
            pivot: self.tracker.apply(),
        })
    }
}
