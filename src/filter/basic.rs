//! Basic (flat, one row per column) filter representation and its lossy conversion
//! to and from the full `FilterGroup` tree.
use crate::core::types::Operator;
use crate::filter::model::{Combinator, FilterCondition, FilterGroup};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const ALL_TAG: &str = "ALL";

/// Operator slot of a basic row: a real operator or the `ALL` "no predicate" sentinel
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicOperator {
    #[default]
    All,
    Op(Operator),
}

impl BasicOperator {
    pub fn operator(self) -> Option<Operator> {
        match self {
            Self::All => None,
            Self::Op(op) => Some(op),
        }
    }
}

impl fmt::Display for BasicOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "{ALL_TAG}"),
            Self::Op(op) => write!(f, "{op}"),
        }
    }
}

impl FromStr for BasicOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL_TAG {
            return Ok(Self::All);
        }
        Operator::from_str(s)
            .map(Self::Op)
            .map_err(|_| format!("Unknown filter operator: {s}"))
    }
}

impl Serialize for BasicOperator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for BasicOperator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        BasicOperator::from_str(&raw).map_err(de::Error::custom)
    }
}

impl From<Operator> for BasicOperator {
    fn from(op: Operator) -> Self {
        Self::Op(op)
    }
}

/// One row of the basic filter editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicRow {
    pub column: String,
    pub operator: BasicOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_secondary: Option<Value>,
}

impl BasicRow {
    /// Row with no predicate
    pub fn all(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator: BasicOperator::All,
            value: None,
            value_secondary: None,
        }
    }

    pub fn new(column: impl Into<String>, operator: impl Into<BasicOperator>, value: Option<Value>) -> Self {
        Self {
            column: column.into(),
            operator: operator.into(),
            value,
            value_secondary: None,
        }
    }
}

fn null_to_none(value: Option<&Value>) -> Option<Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.clone()),
    }
}

fn split_list(raw: &str) -> Value {
    Value::Array(
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()))
            .collect(),
    )
}

fn join_list(items: &[Value]) -> Value {
    let parts: Vec<String> = items
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    Value::String(parts.join(", "))
}

/// Shape a basic row's value(s) into the condition value its operator expects
fn condition_value(op: Operator, row: &BasicRow) -> Option<Value> {
    if op.is_nullary() {
        None
    } else if op.is_range() {
        Some(Value::Array(vec![
            row.value.clone().unwrap_or(Value::Null),
            row.value_secondary.clone().unwrap_or(Value::Null),
        ]))
    } else if op.is_set_membership() {
        match &row.value {
            Some(Value::String(s)) => Some(split_list(s)),
            Some(Value::Null) | None => None,
            Some(Value::Array(items)) => Some(Value::Array(items.clone())),
            Some(scalar) => Some(Value::Array(vec![scalar.clone()])),
        }
    } else {
        row.value.clone()
    }
}

/// Build an AND-only group from every row whose operator is not `ALL`
pub fn basic_rows_to_filter_group(rows: &[BasicRow]) -> FilterGroup {
    let conditions = rows
        .iter()
        .filter_map(|row| {
            let op = row.operator.operator()?;
            Some(FilterCondition::new(row.column.clone(), op, condition_value(op, row)))
        })
        .collect();
    FilterGroup {
        combinator: Combinator::And,
        negate: false,
        conditions,
        groups: vec![],
    }
}

fn row_from_condition(condition: &FilterCondition) -> BasicRow {
    let op = condition.operator;
    let mut row = BasicRow::new(condition.column.clone(), op, None);
    if op.is_nullary() {
        return row;
    }
    match (&condition.value, op) {
        (Some(Value::Array(pair)), op) if op.is_range() => {
            row.value = null_to_none(pair.first());
            row.value_secondary = null_to_none(pair.get(1));
        }
        (Some(Value::Array(items)), op) if op.is_set_membership() => {
            row.value = Some(join_list(items));
        }
        (value, _) => row.value = value.clone(),
    }
    row
}

/// One row per known column, in column order. Columns without a condition get `ALL`.
///
/// Only meaningful for groups accepted by [`is_basic_compatible`]; nested groups and
/// negation are not represented.
pub fn filter_group_to_basic_rows<S: AsRef<str>>(group: &FilterGroup, columns: &[S]) -> Vec<BasicRow> {
    columns
        .iter()
        .map(|column| {
            let name = column.as_ref();
            group
                .conditions
                .iter()
                .find(|c| c.column == name)
                .map(row_from_condition)
                .unwrap_or_else(|| BasicRow::all(name))
        })
        .collect()
}

/// A set-membership item survives the trip through a comma-separated row value
fn is_plain_list_item(item: &Value) -> bool {
    match item {
        Value::String(s) => !s.is_empty() && !s.contains(',') && s.trim() == s,
        _ => false,
    }
}

/// Whether a row rebuilds `condition.value` exactly
fn value_fits_row(condition: &FilterCondition) -> bool {
    let op = condition.operator;
    match &condition.value {
        None => !op.is_range(),
        Some(_) if op.is_nullary() => false,
        Some(Value::Array(pair)) if op.is_range() => pair.len() == 2,
        Some(Value::Array(items)) if op.is_set_membership() => items.iter().all(is_plain_list_item),
        Some(_) => !op.is_range() && !op.is_set_membership(),
    }
}

/// Whether basic mode can represent `group` without losing meaning: a flat AND group with
/// no group or condition negation, no sub-groups, at most one condition per column, and
/// values a row gives back unchanged (set lists must be plain strings without commas).
pub fn is_basic_compatible(group: &FilterGroup) -> bool {
    if group.combinator != Combinator::And || group.negate || !group.groups.is_empty() {
        return false;
    }
    let mut seen = HashSet::new();
    group
        .conditions
        .iter()
        .all(|c| !c.negate && seen.insert(c.column.as_str()) && value_fits_row(c))
}

/// [`is_basic_compatible`], and every condition names one of `columns`, so the rows built
/// for `columns` hold the whole group
pub fn is_basic_compatible_for<S: AsRef<str>>(group: &FilterGroup, columns: &[S]) -> bool {
    is_basic_compatible(group)
        && group
            .conditions
            .iter()
            .all(|c| columns.iter().any(|name| name.as_ref() == c.column))
}

/// Every column with the `ALL` sentinel
pub fn default_basic_rows<S: AsRef<str>>(columns: &[S]) -> Vec<BasicRow> {
    columns.iter().map(|c| BasicRow::all(c.as_ref())).collect()
}

/// Convert `group` to basic rows, or fall back to all-`ALL` rows when the rows for
/// `columns` cannot represent it. Incompatible groups are discarded, never partially converted.
pub fn basic_rows_or_default<S: AsRef<str>>(group: &FilterGroup, columns: &[S]) -> Vec<BasicRow> {
    if is_basic_compatible_for(group, columns) {
        filter_group_to_basic_rows(group, columns)
    } else {
        debug!("Filter group is not basic-compatible; resetting basic rows");
        default_basic_rows(columns)
    }
}
