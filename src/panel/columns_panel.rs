//! ColumnsPanel: which dataset columns a report shows, grouped and in what order
use crate::action::Action;
use crate::core::types::{ColumnMeta, ColumnSelection};
use crate::core::DirtyTracker;
use tracing::debug;

#[derive(Debug, Default, Clone)]
pub struct ColumnsPanel {
    dataset_key: Option<String>,
    available: Vec<ColumnMeta>,
    tracker: DirtyTracker<ColumnSelection>,
}

impl ColumnsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column metadata for the current dataset
    pub fn set_available(&mut self, columns: Vec<ColumnMeta>) {
        self.available = columns;
    }

    pub fn available(&self) -> &[ColumnMeta] {
        &self.available
    }

    /// Re-baseline on a new dataset or a loaded report
    pub fn reset(&mut self, dataset_key: Option<String>, selection: ColumnSelection) {
        self.dataset_key = dataset_key;
        self.tracker.reset(selection);
    }

    pub fn selection(&self) -> &ColumnSelection {
        self.tracker.current()
    }

    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    pub fn undo(&mut self) {
        self.tracker.undo();
    }

    fn is_available(&self, name: &str) -> bool {
        self.available.iter().any(|c| c.name == name)
    }

    /// Make sure a known column has an entry before it is edited
    fn ensure_entry(&mut self, name: &str) -> bool {
        if self.tracker.current().get(name).is_some() {
            return true;
        }
        if !self.is_available(name) {
            debug!("Ignoring unknown column {name}");
            return false;
        }
        self.tracker.current_mut().insert_column(name);
        true
    }

    pub fn toggle_selected(&mut self, name: &str) -> bool {
        self.ensure_entry(name) && self.tracker.current_mut().toggle_selected(name)
    }

    pub fn toggle_group(&mut self, name: &str) -> bool {
        self.ensure_entry(name) && self.tracker.current_mut().toggle_group(name)
    }

    pub fn move_column(&mut self, from: usize, to: usize) {
        self.tracker.current_mut().move_column(from, to);
    }

    /// Select every available column, adding entries for ones not listed yet
    pub fn select_all(&mut self) {
        let names: Vec<String> = self.available.iter().map(|c| c.name.clone()).collect();
        let selection = self.tracker.current_mut();
        for name in &names {
            selection.insert_column(name);
        }
        selection.select_all();
    }

    pub fn select_none(&mut self) {
        self.tracker.current_mut().select_none();
    }

    pub fn apply(&mut self) -> Action {
        Action::ColumnsApplied {
            dataset_key: self.dataset_key.clone(),
            selection: self.tracker.apply(),
        }
    }
}
