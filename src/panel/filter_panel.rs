//! FilterPanel: edits the report filter in basic (one row per column) or advanced (tree) mode
use crate::action::Action;
use crate::core::DirtyTracker;
use crate::core::types::{ColumnMeta, Operator};
use crate::filter::tree;
use crate::filter::{
    BasicOperator, BasicRow, FilterCondition, FilterGroup, basic_rows_or_default, basic_rows_to_filter_group,
    default_basic_rows, filter_group_to_basic_rows, is_basic_compatible_for,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;
use tracing::{debug, info};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FilterMode {
    #[default]
    Basic,
    Advanced,
}

/// Filter editor state.
///
/// In basic mode the rows are authoritative and the tracker's working group is kept in
/// step with them; in advanced mode the tree is edited directly. Basic mode is only used
/// while the rows hold every condition of the working group.
#[derive(Debug, Clone)]
pub struct FilterPanel {
    dataset_key: Option<String>,
    columns: Vec<ColumnMeta>,
    mode: FilterMode,
    /// Advanced mode was entered because the rows could not hold the group, not by choice
    forced_advanced: bool,
    rows: Vec<BasicRow>,
    tracker: DirtyTracker<FilterGroup>,
    /// Selected group in the advanced tree
    pub selected_path: Vec<usize>,
}

impl Default for FilterPanel {
    fn default() -> Self {
        Self::new(FilterMode::default())
    }
}

impl FilterPanel {
    pub fn new(mode: FilterMode) -> Self {
        Self {
            dataset_key: None,
            columns: vec![],
            mode,
            forced_advanced: false,
            rows: vec![],
            tracker: DirtyTracker::new(FilterGroup::new()),
            selected_path: vec![],
        }
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn rows(&self) -> &[BasicRow] {
        &self.rows
    }

    pub fn group(&self) -> &FilterGroup {
        self.tracker.current()
    }

    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Rebuild the rows from the working group, or leave basic mode when they cannot hold it
    fn fit_rows(&mut self) {
        let names = self.column_names();
        if is_basic_compatible_for(self.tracker.current(), &names) {
            self.rows = filter_group_to_basic_rows(self.tracker.current(), &names);
        } else {
            info!("Filter needs advanced mode");
            self.mode = FilterMode::Advanced;
            self.forced_advanced = true;
            self.rows = default_basic_rows(&names);
        }
    }

    /// Column metadata changed. Drafts are kept; a clean filter that only left basic mode
    /// for lack of columns goes back to it.
    pub fn set_columns(&mut self, columns: Vec<ColumnMeta>) {
        self.columns = columns;
        match self.mode {
            FilterMode::Basic => self.fit_rows(),
            FilterMode::Advanced if self.forced_advanced && !self.is_dirty() => {
                if is_basic_compatible_for(self.tracker.current(), &self.column_names()) {
                    debug!("Filter fits basic rows again");
                    self.mode = FilterMode::Basic;
                    self.forced_advanced = false;
                    self.fit_rows();
                }
            }
            FilterMode::Advanced => {}
        }
    }

    /// Re-baseline on a new dataset or a loaded report. A group basic mode cannot show
    /// opens in advanced mode instead of being discarded.
    pub fn reset(&mut self, dataset_key: Option<String>, group: FilterGroup) {
        self.dataset_key = dataset_key;
        self.selected_path.clear();
        self.tracker.reset(group);
        if self.forced_advanced {
            self.mode = FilterMode::Basic;
            self.forced_advanced = false;
        }
        if self.mode == FilterMode::Basic {
            self.fit_rows();
        }
    }

    /// Switch editing mode. Returns false when switching to basic had to discard the tree
    /// because basic mode cannot represent it.
    pub fn set_mode(&mut self, mode: FilterMode) -> bool {
        self.forced_advanced = false;
        if mode == self.mode {
            return true;
        }
        self.mode = mode;
        match mode {
            FilterMode::Advanced => {
                self.tracker.set_current(basic_rows_to_filter_group(&self.rows));
                self.selected_path.clear();
                true
            }
            FilterMode::Basic => {
                let names = self.column_names();
                let fits = is_basic_compatible_for(self.tracker.current(), &names);
                self.rows = basic_rows_or_default(self.tracker.current(), &names);
                if !fits {
                    debug!("Discarding advanced filter on switch to basic mode");
                    self.sync_rows();
                }
                fits
            }
        }
    }

    fn sync_rows(&mut self) {
        self.tracker.set_current(basic_rows_to_filter_group(&self.rows));
    }

    /// Edit the basic row for `column`. The operator must be one the column offers.
    pub fn set_row(
        &mut self,
        column: &str,
        operator: BasicOperator,
        value: Option<Value>,
        value_secondary: Option<Value>,
    ) -> bool {
        if self.mode != FilterMode::Basic {
            return false;
        }
        if let Some(op) = operator.operator() {
            if !self.operators_for(column).contains(&op) {
                debug!("{op} is not offered for {column}");
                return false;
            }
        }
        let Some(row) = self.rows.iter_mut().find(|r| r.column == column) else {
            return false;
        };
        row.operator = operator;
        row.value = value;
        row.value_secondary = value_secondary;
        self.sync_rows();
        true
    }

    /// Operators offered for `column` in either mode
    pub fn operators_for(&self, column: &str) -> Vec<Operator> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(ColumnMeta::operators)
            .unwrap_or_default()
    }

    /// Tree to edit; tree edits always happen in advanced mode
    fn tree_mut(&mut self) -> &mut FilterGroup {
        if self.mode == FilterMode::Basic {
            self.set_mode(FilterMode::Advanced);
        }
        self.tracker.current_mut()
    }

    pub fn add_condition(&mut self, path: &[usize]) -> bool {
        let columns = self.columns.clone();
        tree::add_condition_to_group(self.tree_mut(), path, &columns)
    }

    pub fn add_sub_group(&mut self, path: &[usize]) {
        self.selected_path = tree::add_sub_group(self.tree_mut(), path);
    }

    pub fn update_condition(&mut self, path: &[usize], index: usize, condition: FilterCondition) {
        tree::update_condition(self.tree_mut(), path, index, condition);
    }

    pub fn remove_condition(&mut self, path: &[usize], index: usize) {
        tree::remove_condition_from_group(self.tree_mut(), path, index);
    }

    /// Remove a sub-group; the root is refused
    pub fn remove_group(&mut self, path: &[usize]) -> bool {
        match tree::remove_group(self.tree_mut(), path) {
            Some(next) => {
                self.selected_path = next;
                true
            }
            None => false,
        }
    }

    pub fn toggle_combinator(&mut self, path: &[usize]) {
        tree::toggle_combinator(self.tree_mut(), path);
    }

    pub fn toggle_group_negate(&mut self, path: &[usize]) {
        tree::toggle_group_negate(self.tree_mut(), path);
    }

    pub fn toggle_condition_negate(&mut self, path: &[usize], index: usize) {
        tree::toggle_condition_negate(self.tree_mut(), path, index);
    }

    pub fn undo(&mut self) {
        self.tracker.undo();
        self.selected_path.clear();
        if self.mode == FilterMode::Basic {
            self.fit_rows();
        }
    }

    /// Apply the working group. Row edits are already folded into it.
    pub fn apply(&mut self) -> Action {
        Action::FilterApplied {
            dataset_key: self.dataset_key.clone(),
            filter: self.tracker.apply(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ColumnDataType;
    use crate::filter::Combinator;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn panel() -> FilterPanel {
        let mut panel = FilterPanel::new(FilterMode::Basic);
        panel.set_columns(vec![
            ColumnMeta::new("year", ColumnDataType::Number),
            ColumnMeta::new("region", ColumnDataType::String),
        ]);
        panel.reset(Some("sales".to_string()), FilterGroup::new());
        panel
    }

    #[test]
    fn test_basic_edit_marks_dirty_and_applies() {
        let mut panel = panel();
        assert_eq!(panel.rows().len(), 2);
        assert!(panel.set_row("year", BasicOperator::Op(Operator::Gt), Some(json!("2020")), None));
        assert!(panel.is_dirty());

        let Action::FilterApplied { dataset_key, filter } = panel.apply() else {
            panic!("expected FilterApplied");
        };
        assert_eq!(dataset_key.as_deref(), Some("sales"));
        assert_eq!(filter.conditions.len(), 1);
        assert_eq!(filter.conditions[0].column, "year");
        assert!(!panel.is_dirty());
    }

    #[test]
    fn test_switch_to_basic_discards_or_group() {
        let mut panel = panel();
        panel.set_mode(FilterMode::Advanced);
        panel.add_condition(&[]);
        panel.toggle_combinator(&[]);
        assert_eq!(panel.group().combinator, Combinator::Or);

        assert!(!panel.set_mode(FilterMode::Basic));
        assert!(panel.rows().iter().all(|r| r.operator == BasicOperator::All));
        assert!(panel.group().is_empty());
    }

    #[test]
    fn test_switch_to_basic_keeps_flat_and_group() {
        let mut panel = panel();
        panel.set_mode(FilterMode::Advanced);
        panel.add_condition(&[]);
        assert!(panel.set_mode(FilterMode::Basic));
        assert_eq!(panel.rows()[0].operator, BasicOperator::Op(Operator::Eq));
    }

    #[test]
    fn test_tree_edit_from_basic_switches_mode() {
        let mut panel = panel();
        panel.set_row("region", BasicOperator::Op(Operator::IsNull), None, None);
        panel.add_sub_group(&[]);

        assert_eq!(panel.mode(), FilterMode::Advanced);
        assert_eq!(panel.selected_path, vec![0]);
        assert_eq!(panel.group().conditions.len(), 1);
        assert!(panel.remove_group(&[0]));
        assert!(!panel.remove_group(&[]));
    }

    #[test]
    fn test_reset_with_nested_group_opens_advanced() {
        let mut panel = panel();
        let mut group = FilterGroup::new();
        group.groups.push(FilterGroup::new());
        panel.reset(Some("sales".to_string()), group.clone());

        assert_eq!(panel.mode(), FilterMode::Advanced);
        assert_eq!(panel.group(), &group);
        assert!(!panel.is_dirty());
    }

    #[test]
    fn test_condition_on_unknown_column_survives_apply() {
        let mut panel = FilterPanel::new(FilterMode::Basic);
        panel.set_columns(vec![ColumnMeta::new("year", ColumnDataType::Number)]);
        let group = FilterGroup {
            conditions: vec![FilterCondition::new("amount", Operator::Gt, Some(json!(5)))],
            ..FilterGroup::new()
        };
        panel.reset(Some("sales".to_string()), group.clone());

        assert_eq!(panel.mode(), FilterMode::Advanced);
        assert!(!panel.is_dirty());
        let Action::FilterApplied { filter, .. } = panel.apply() else {
            panic!("expected FilterApplied");
        };
        assert_eq!(filter, group);
    }

    #[test]
    fn test_filter_without_column_metadata_survives_apply() {
        let mut panel = FilterPanel::new(FilterMode::Basic);
        let group = FilterGroup {
            conditions: vec![FilterCondition::new("year", Operator::Gt, Some(json!(5)))],
            ..FilterGroup::new()
        };
        panel.reset(Some("sales".to_string()), group.clone());
        let Action::FilterApplied { filter, .. } = panel.apply() else {
            panic!("expected FilterApplied");
        };
        assert_eq!(filter, group);

        // Metadata arriving later brings the clean filter back to basic rows
        panel.set_columns(vec![ColumnMeta::new("year", ColumnDataType::Number)]);
        assert_eq!(panel.mode(), FilterMode::Basic);
        assert_eq!(panel.rows()[0].operator, BasicOperator::Op(Operator::Gt));
        assert_eq!(panel.group(), &group);
    }

    #[test]
    fn test_refresh_keeps_basic_draft() {
        let mut panel = panel();
        panel.set_row("year", BasicOperator::Op(Operator::Lt), Some(json!(2000)), None);
        panel.set_columns(vec![
            ColumnMeta::new("year", ColumnDataType::Number),
            ColumnMeta::new("region", ColumnDataType::String),
            ColumnMeta::new("channel", ColumnDataType::String),
        ]);

        assert!(panel.is_dirty());
        assert_eq!(panel.rows().len(), 3);
        assert_eq!(panel.rows()[0].value, Some(json!(2000)));
    }

    #[test]
    fn test_set_row_checks_offered_operators() {
        let mut panel = panel();
        assert!(panel.operators_for("region").contains(&Operator::Contains));
        assert!(!panel.set_row("region", BasicOperator::Op(Operator::Between), Some(json!(1)), None));
        assert!(!panel.set_row("nope", BasicOperator::All, None, None));
        assert!(!panel.is_dirty());
    }

    #[test]
    fn test_undo_restores_rows() {
        let mut panel = panel();
        panel.set_row("year", BasicOperator::Op(Operator::Eq), Some(json!(1)), None);
        panel.undo();
        assert!(!panel.is_dirty());
        assert_eq!(panel.rows()[0], BasicRow::all("year"));
    }
}
