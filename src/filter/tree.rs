//! Path-addressed edits on a `FilterGroup` tree.
//!
//! A path is the list of `groups` indices walked from the root; the root itself is `[]`.
//! Paths are produced by the editor against its own tree, so a path that does not resolve
//! is a bug and panics rather than being silently ignored.
use crate::core::types::{ColumnMeta, Operator};
use crate::filter::model::{FilterCondition, FilterGroup};
use tracing::{debug, trace};

// Helper: get parent path of a node
fn parent_path_of(path: &[usize]) -> Option<Vec<usize>> {
    if path.is_empty() { None } else { Some(path[..path.len() - 1].to_vec()) }
}

impl FilterGroup {
    /// Group at `path`, or `None` if any index is out of range
    pub fn group_at(&self, path: &[usize]) -> Option<&FilterGroup> {
        let mut node = self;
        for &i in path {
            node = node.groups.get(i)?;
        }
        Some(node)
    }

    /// Mutable group at `path`.
    ///
    /// # Panics
    /// When any index along `path` is out of range.
    pub fn group_at_mut(&mut self, path: &[usize]) -> &mut FilterGroup {
        let mut node = self;
        for (depth, &i) in path.iter().enumerate() {
            let len = node.groups.len();
            node = node
                .groups
                .get_mut(i)
                .unwrap_or_else(|| panic!("filter path {path:?} invalid at depth {depth}: index {i} of {len}"));
        }
        node
    }
}

/// Default condition for a new row: first column, its first allowed operator
pub fn default_condition(columns: &[ColumnMeta]) -> Option<FilterCondition> {
    let column = columns.first()?;
    let operator = column.operators().first().copied().unwrap_or(Operator::Eq);
    Some(FilterCondition::new(column.name.clone(), operator, None))
}

/// Append a default condition to the group at `path`. Returns false when there are no
/// columns to build one from.
pub fn add_condition_to_group(root: &mut FilterGroup, path: &[usize], columns: &[ColumnMeta]) -> bool {
    match default_condition(columns) {
        Some(condition) => {
            trace!("Adding condition on {} at {:?}", condition.column, path);
            root.group_at_mut(path).conditions.push(condition);
            true
        }
        None => {
            debug!("No columns available; condition not added");
            false
        }
    }
}

/// Append an empty AND sub-group under `path`; returns the new group's path
pub fn add_sub_group(root: &mut FilterGroup, path: &[usize]) -> Vec<usize> {
    let parent = root.group_at_mut(path);
    parent.groups.push(FilterGroup::new());
    let mut child = path.to_vec();
    child.push(parent.groups.len() - 1);
    child
}

/// Replace condition `index` of the group at `path`
pub fn update_condition(root: &mut FilterGroup, path: &[usize], index: usize, condition: FilterCondition) {
    root.group_at_mut(path).conditions[index] = condition;
}

/// Remove condition `index` from the group at `path`
pub fn remove_condition_from_group(root: &mut FilterGroup, path: &[usize], index: usize) -> FilterCondition {
    root.group_at_mut(path).conditions.remove(index)
}

/// Remove the sub-group at `path` from its parent and return the path to select next:
/// previous sibling, else next sibling, else the parent. The root is never removed; an
/// empty path is refused and returns `None`.
pub fn remove_group(root: &mut FilterGroup, path: &[usize]) -> Option<Vec<usize>> {
    let (&idx, parent_path) = path.split_last()?;
    let parent = root.group_at_mut(parent_path);
    parent.groups.remove(idx);
    let next = if idx > 0 {
        let mut p = path.to_vec();
        *p.last_mut()? -= 1;
        p
    } else if !parent.groups.is_empty() {
        path.to_vec()
    } else {
        parent_path_of(path).unwrap_or_default()
    };
    Some(next)
}

pub fn toggle_combinator(root: &mut FilterGroup, path: &[usize]) {
    let group = root.group_at_mut(path);
    group.combinator = group.combinator.toggled();
}

pub fn toggle_group_negate(root: &mut FilterGroup, path: &[usize]) {
    let group = root.group_at_mut(path);
    group.negate = !group.negate;
}

pub fn toggle_condition_negate(root: &mut FilterGroup, path: &[usize], index: usize) {
    let condition = &mut root.group_at_mut(path).conditions[index];
    condition.negate = !condition.negate;
}
