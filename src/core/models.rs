use crate::core::types::{ColumnVO, ReportId};
use crate::filter::FilterGroup;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Persisted form of a report's configuration.
///
/// Pivot lists are omitted from the wire form when empty; consumers treat a present
/// field as "feature configured".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub struct DynamicReportDefinition {
    pub dataset_key: String,
    pub selected_columns: Vec<String>,
    pub filter: FilterGroup,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_group_cols: Option<Vec<ColumnVO>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot_cols: Option<Vec<ColumnVO>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_cols: Option<Vec<ColumnVO>>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub enum ReportStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

/// Server-owned lifecycle action on a persisted report
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub enum LifecycleAction {
    Publish,
    Unpublish,
    Archive,
    Restore,
    Share,
    Duplicate,
    Delete,
}

impl LifecycleAction {
    /// Actions a backend offers for a report in `status`
    pub fn available_for(status: ReportStatus) -> Vec<LifecycleAction> {
        match status {
            ReportStatus::Draft => vec![Self::Publish, Self::Archive, Self::Share, Self::Duplicate, Self::Delete],
            ReportStatus::Published => vec![Self::Unpublish, Self::Archive, Self::Share, Self::Duplicate],
            ReportStatus::Archived => vec![Self::Restore, Self::Delete],
        }
    }

    /// Status after the action, or `None` when the action does not move the status
    pub fn next_status(self) -> Option<ReportStatus> {
        match self {
            Self::Publish => Some(ReportStatus::Published),
            Self::Unpublish | Self::Restore => Some(ReportStatus::Draft),
            Self::Archive => Some(ReportStatus::Archived),
            Self::Share | Self::Duplicate | Self::Delete => None,
        }
    }
}

/// A report as known to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub struct Report {
    pub id: ReportId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<DynamicReportDefinition>,
    /// Raw action tags declared by the server; unknown tags are ignored by the menu
    #[serde(default)]
    pub available_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Report {
    /// Create a draft report record
    pub fn new(name: String, definition: Option<DynamicReportDefinition>) -> Self {
        let status = ReportStatus::Draft;
        Self {
            id: ReportId::new(),
            name,
            description: None,
            status,
            definition,
            available_actions: LifecycleAction::available_for(status)
                .iter()
                .map(|a| a.to_string())
                .collect(),
            updated_at: Some(Utc::now()),
        }
    }

    /// Whether the server declared `action` for this report
    pub fn offers(&self, action: LifecycleAction) -> bool {
        self.lifecycle_actions().contains(&action)
    }

    /// Known lifecycle actions declared by the server, in canonical order
    pub fn lifecycle_actions(&self) -> Vec<LifecycleAction> {
        let declared: Vec<LifecycleAction> = self
            .available_actions
            .iter()
            .filter_map(|tag| LifecycleAction::from_str(tag).ok())
            .collect();
        LifecycleAction::iter().filter(|a| declared.contains(a)).collect()
    }

    /// Apply a status transition and refresh the declared actions
    pub fn transition(&mut self, action: LifecycleAction) {
        if let Some(status) = action.next_status() {
            self.status = status;
            self.available_actions = LifecycleAction::available_for(status)
                .iter()
                .map(|a| a.to_string())
                .collect();
        }
        self.updated_at = Some(Utc::now());
    }
}

/// Body of a create/update call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub struct ReportPayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub definition: DynamicReportDefinition,
}
