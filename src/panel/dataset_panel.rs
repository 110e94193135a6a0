//! DatasetPanel: chooses the dataset a report is built on
use crate::action::Action;
use crate::core::DirtyTracker;
use tracing::debug;

#[derive(Debug, Default, Clone)]
pub struct DatasetPanel {
    /// Dataset keys offered to the user; empty means any key is accepted
    datasets: Vec<String>,
    tracker: DirtyTracker<Option<String>>,
}

impl DatasetPanel {
    pub fn new(datasets: Vec<String>) -> Self {
        Self {
            datasets,
            tracker: DirtyTracker::new(None),
        }
    }

    pub fn datasets(&self) -> &[String] {
        &self.datasets
    }

    pub fn set_datasets(&mut self, datasets: Vec<String>) {
        self.datasets = datasets;
    }

    pub fn current(&self) -> Option<&str> {
        self.tracker.current().as_deref()
    }

    pub fn applied(&self) -> Option<&str> {
        self.tracker.applied().as_deref()
    }

    /// Choose a dataset, or none. Keys missing from a non-empty offer list are refused.
    pub fn select(&mut self, key: Option<String>) -> bool {
        if let Some(k) = &key {
            if !self.datasets.is_empty() && !self.datasets.contains(k) {
                debug!("Dataset {k} is not offered");
                return false;
            }
        }
        self.tracker.set_current(key);
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    pub fn undo(&mut self) {
        self.tracker.undo();
    }

    pub fn reset(&mut self, key: Option<String>) {
        self.tracker.reset(key);
    }

    pub fn apply(&mut self) -> Action {
        Action::DatasetApplied(self.tracker.apply())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_select_and_apply() {
        let mut panel = DatasetPanel::new(vec!["sales".to_string(), "inventory".to_string()]);
        assert!(panel.select(Some("sales".to_string())));
        assert!(panel.is_dirty());
        assert_eq!(panel.applied(), None);

        assert_eq!(panel.apply(), Action::DatasetApplied(Some("sales".to_string())));
        assert!(!panel.is_dirty());

        panel.select(Some("inventory".to_string()));
        panel.undo();
        assert_eq!(panel.current(), Some("sales"));
    }

    #[test]
    fn test_select_only_offered_datasets() {
        let mut panel = DatasetPanel::default();
        assert!(panel.select(Some("anything".to_string())));

        panel.set_datasets(vec!["sales".to_string()]);
        assert_eq!(panel.datasets(), &["sales".to_string()]);
        assert!(!panel.select(Some("inventory".to_string())));
        assert_eq!(panel.current(), Some("anything"));
        assert!(panel.select(None));
        assert!(panel.select(Some("sales".to_string())));
    }
}
