use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Unique identifier for persisted reports
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub struct ReportId(Uuid);

impl ReportId {
    /// Create a new unique report ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the ID as a string
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReportId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s).map_err(|e| e.to_string())?))
    }
}

/// Filter operator tag as it appears on the wire
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Between,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl Operator {
    /// Range operators carry a `[low, high]` value pair
    pub fn is_range(self) -> bool {
        matches!(self, Self::Between)
    }

    /// Set-membership operators carry a list of values
    pub fn is_set_membership(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }

    /// Nullary operators carry no value at all
    pub fn is_nullary(self) -> bool {
        matches!(self, Self::IsNull | Self::IsNotNull)
    }

    /// Operators offered for a column type when the column declares none
    pub fn defaults_for(data_type: ColumnDataType) -> Vec<Operator> {
        match data_type {
            ColumnDataType::String => vec![
                Self::Eq,
                Self::Neq,
                Self::Contains,
                Self::NotContains,
                Self::StartsWith,
                Self::EndsWith,
                Self::In,
                Self::NotIn,
                Self::IsNull,
                Self::IsNotNull,
            ],
            ColumnDataType::Number | ColumnDataType::Date => vec![
                Self::Eq,
                Self::Neq,
                Self::Gt,
                Self::Gte,
                Self::Lt,
                Self::Lte,
                Self::Between,
                Self::In,
                Self::NotIn,
                Self::IsNull,
                Self::IsNotNull,
            ],
            ColumnDataType::Boolean => vec![Self::Eq, Self::Neq, Self::IsNull, Self::IsNotNull],
        }
    }
}

/// Aggregate function applied to a measure placed in the values zone
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub enum AggFunc {
    #[default]
    Sum,
    Avg,
    Min,
    Max,
    Count,
    CountDistinct,
    First,
    Last,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub enum ColumnDataType {
    #[default]
    String,
    Number,
    Date,
    Boolean,
}

/// Column metadata as returned by the data client for a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub struct ColumnMeta {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub data_type: ColumnDataType,
    #[serde(default)]
    pub is_dimension: bool,
    #[serde(default)]
    pub is_measure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_agg_funcs: Option<Vec<AggFunc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_operators: Option<Vec<Operator>>,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, data_type: ColumnDataType) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            data_type,
            is_dimension: false,
            is_measure: false,
            allowed_agg_funcs: None,
            filter_operators: None,
        }
    }

    pub fn dimension(mut self) -> Self {
        self.is_dimension = true;
        self
    }

    pub fn measure(mut self, allowed: Option<Vec<AggFunc>>) -> Self {
        self.is_measure = true;
        self.allowed_agg_funcs = allowed;
        self
    }

    /// Operators usable on this column: its declared list, else the type defaults
    pub fn operators(&self) -> Vec<Operator> {
        match &self.filter_operators {
            Some(ops) if !ops.is_empty() => ops.clone(),
            _ => Operator::defaults_for(self.data_type),
        }
    }

    /// Whether `agg` may be applied to this column. Columns without a list accept anything.
    pub fn allows_agg(&self, agg: AggFunc) -> bool {
        match &self.allowed_agg_funcs {
            Some(list) => list.contains(&agg),
            None => true,
        }
    }
}

/// A column reference placed in a pivot zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub struct ColumnVO {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agg_func: Option<AggFunc>,
}

impl ColumnVO {
    /// Dimension placement: no aggregate
    pub fn dimension(meta: &ColumnMeta) -> Self {
        Self {
            id: meta.name.clone(),
            display_name: meta.display_name.clone(),
            field: Some(meta.name.clone()),
            agg_func: None,
        }
    }
}

/// One column entry of the columns panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub struct ColumnSelectionEntry {
    pub name: String,
    pub selected: bool,
    #[serde(default)]
    pub is_group: bool,
    pub order: i64,
}

/// Selected/grouped/ordered column list. Names are unique; `is_group` implies `selected`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub struct ColumnSelection {
    pub columns: Vec<ColumnSelectionEntry>,
}

impl ColumnSelection {
    /// Fresh selection for a dataset: every column selected, in metadata order
    pub fn from_meta(columns: &[ColumnMeta]) -> Self {
        Self {
            columns: columns
                .iter()
                .enumerate()
                .map(|(i, c)| ColumnSelectionEntry {
                    name: c.name.clone(),
                    selected: true,
                    is_group: false,
                    order: i as i64,
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSelectionEntry> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut ColumnSelectionEntry> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Entries sorted by `order`; ties keep their storage order
    pub fn ordered(&self) -> Vec<&ColumnSelectionEntry> {
        let mut entries: Vec<&ColumnSelectionEntry> = self.columns.iter().collect();
        entries.sort_by_key(|c| c.order);
        entries
    }

    /// Selected column names in display order
    pub fn selected_names(&self) -> Vec<String> {
        self.ordered()
            .into_iter()
            .filter(|c| c.selected)
            .map(|c| c.name.clone())
            .collect()
    }

    /// Flip selection. Deselecting also clears the group flag. Returns false for unknown names.
    pub fn toggle_selected(&mut self, name: &str) -> bool {
        match self.get_mut(name) {
            Some(entry) => {
                entry.selected = !entry.selected;
                if !entry.selected {
                    entry.is_group = false;
                }
                true
            }
            None => false,
        }
    }

    /// Flip the group flag. Grouping a column selects it.
    pub fn toggle_group(&mut self, name: &str) -> bool {
        match self.get_mut(name) {
            Some(entry) => {
                entry.is_group = !entry.is_group;
                if entry.is_group {
                    entry.selected = true;
                }
                true
            }
            None => false,
        }
    }

    pub fn select_all(&mut self) {
        for entry in &mut self.columns {
            entry.selected = true;
        }
    }

    pub fn select_none(&mut self) {
        for entry in &mut self.columns {
            entry.selected = false;
            entry.is_group = false;
        }
    }

    /// Move the entry at display position `from` to display position `to`, renumbering orders
    pub fn move_column(&mut self, from: usize, to: usize) {
        let mut names: Vec<String> = self.ordered().into_iter().map(|c| c.name.clone()).collect();
        if from >= names.len() || from == to {
            return;
        }
        let name = names.remove(from);
        let to = to.min(names.len());
        names.insert(to, name);
        for (pos, name) in names.iter().enumerate() {
            if let Some(entry) = self.get_mut(name) {
                entry.order = pos as i64;
            }
        }
    }

    /// Append `name` unselected at the end of the display order; existing entries are
    /// returned unchanged
    pub fn insert_column(&mut self, name: &str) -> &mut ColumnSelectionEntry {
        let idx = match self.columns.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                let order = self.columns.iter().map(|c| c.order + 1).max().unwrap_or(0);
                self.columns.push(ColumnSelectionEntry {
                    name: name.to_string(),
                    selected: false,
                    is_group: false,
                    order,
                });
                self.columns.len() - 1
            }
        };
        &mut self.columns[idx]
    }
}
