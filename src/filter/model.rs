//! Recursive boolean filter model shared by basic and advanced filter editing
use crate::core::types::Operator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

fn is_false(value: &bool) -> bool {
    !*value
}

/// How a group joins its children
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    pub fn toggled(self) -> Self {
        match self {
            Self::And => Self::Or,
            Self::Or => Self::And,
        }
    }
}

/// Single predicate on one column.
///
/// `value` is shaped by the operator: a scalar, a `[low, high]` pair for ranges, a list for
/// set membership, or absent for nullary operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub struct FilterCondition {
    pub column: String,
    pub operator: Operator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub negate: bool,
}

impl FilterCondition {
    pub fn new(column: impl Into<String>, operator: Operator, value: Option<Value>) -> Self {
        Self {
            column: column.into(),
            operator,
            value,
            negate: false,
        }
    }

    /// Human-readable one-liner, e.g. `NOT year > 2020`
    pub fn summary(&self) -> String {
        let prefix = if self.negate { "NOT " } else { "" };
        match &self.value {
            None => format!("{prefix}{} {}", self.column, self.operator),
            Some(Value::String(s)) => format!("{prefix}{} {} {s}", self.column, self.operator),
            Some(v) => format!("{prefix}{} {} {v}", self.column, self.operator),
        }
    }
}

/// AND/OR group of conditions and nested groups. Children are owned, never shared.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub struct FilterGroup {
    pub combinator: Combinator,
    #[serde(default, skip_serializing_if = "is_false")]
    pub negate: bool,
    #[serde(default)]
    pub conditions: Vec<FilterCondition>,
    #[serde(default)]
    pub groups: Vec<FilterGroup>,
}

impl FilterGroup {
    /// Empty AND group: no predicate
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_combinator(combinator: Combinator) -> Self {
        Self {
            combinator,
            ..Self::default()
        }
    }

    /// True when the group holds no conditions at any depth
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.groups.iter().all(FilterGroup::is_empty)
    }

    /// Number of conditions in the whole tree
    pub fn condition_count(&self) -> usize {
        self.conditions.len() + self.groups.iter().map(FilterGroup::condition_count).sum::<usize>()
    }

    /// Depth of the tree; a flat group has depth 1
    pub fn depth(&self) -> usize {
        1 + self.groups.iter().map(FilterGroup::depth).max().unwrap_or(0)
    }

    /// Recursively render the tree as (indent, label, path) lines
    pub fn render_lines(&self, path: &mut Vec<usize>, indent: usize, lines: &mut Vec<(usize, String, Vec<usize>)>) {
        let label = match (indent == 0, self.negate) {
            (true, false) => format!("Root {}", self.combinator),
            (true, true) => format!("Root NOT {}", self.combinator),
            (false, false) => self.combinator.to_string(),
            (false, true) => format!("NOT {}", self.combinator),
        };
        lines.push((indent, label, path.clone()));
        for condition in &self.conditions {
            lines.push((indent + 1, condition.summary(), path.clone()));
        }
        for (i, group) in self.groups.iter().enumerate() {
            path.push(i);
            group.render_lines(path, indent + 1, lines);
            path.pop();
        }
    }

    /// Multi-line indented summary of the tree
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        self.render_lines(&mut Vec::new(), 0, &mut lines);
        lines
            .into_iter()
            .map(|(indent, label, _)| format!("{}{label}", "  ".repeat(indent)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
