//! DataClient trait: the boundary between the report builder and whatever stores
//! datasets and reports.
//!
//! The builder only talks to a backend through this trait. Implementations in this crate
//! are [`MemoryClient`](super::MemoryClient) and [`FileReportStore`](super::FileReportStore).

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::core::models::{LifecycleAction, Report, ReportPayload};
use crate::core::types::{ColumnMeta, ReportId};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("backend unavailable")]
    Unavailable,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// Result type for data client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[async_trait]
pub trait DataClient: Send + Sync {
    /// Column metadata for a dataset.
    async fn get_columns(&self, dataset_key: &str) -> ClientResult<Vec<ColumnMeta>>;

    async fn get_report(&self, id: &ReportId) -> ClientResult<Report>;

    /// Persist a new report; the backend assigns the id.
    async fn create_report(&self, payload: ReportPayload) -> ClientResult<Report>;

    async fn update_report(&self, id: &ReportId, payload: ReportPayload) -> ClientResult<Report>;

    /// Run a server lifecycle action.
    ///
    /// Returns the report after the action, or `None` when the action removed it.
    async fn perform_action(
        &self,
        id: &ReportId,
        action: LifecycleAction,
        payload: Option<Value>,
    ) -> ClientResult<Option<Report>>;
}

/// What a lifecycle action does to the store
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEffect {
    /// The report was changed in place
    Updated(Report),
    /// A new report was created next to the original
    Created(Report),
    Deleted,
}

/// Lifecycle rules shared by the in-crate stores.
///
/// The action must be one the report declares. `duplicate` takes an optional
/// `{"name": ...}` payload for the copy.
pub fn run_lifecycle(report: &Report, action: LifecycleAction, payload: Option<&Value>) -> ClientResult<LifecycleEffect> {
    if !report.offers(action) {
        return Err(ClientError::Rejected(format!(
            "{action} is not available for report {} ({})",
            report.id, report.status
        )));
    }
    match action {
        LifecycleAction::Delete => Ok(LifecycleEffect::Deleted),
        LifecycleAction::Duplicate => {
            let name = payload
                .and_then(|p| p.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} (copy)", report.name));
            let mut copy = Report::new(name, report.definition.clone());
            copy.description = report.description.clone();
            Ok(LifecycleEffect::Created(copy))
        }
        _ => {
            let mut updated = report.clone();
            updated.transition(action);
            Ok(LifecycleEffect::Updated(updated))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ReportStatus;
    use serde_json::json;

    #[test]
    fn test_lifecycle_rules() {
        let report = Report::new("Sales".to_string(), None);

        let Ok(LifecycleEffect::Updated(published)) = run_lifecycle(&report, LifecycleAction::Publish, None) else {
            panic!("publish should update");
        };
        assert_eq!(published.status, ReportStatus::Published);
        assert!(published.offers(LifecycleAction::Unpublish));

        assert!(matches!(
            run_lifecycle(&published, LifecycleAction::Delete, None),
            Err(ClientError::Rejected(_))
        ));
        assert_eq!(run_lifecycle(&report, LifecycleAction::Delete, None).unwrap(), LifecycleEffect::Deleted);

        let payload = json!({ "name": "Sales 2" });
        let Ok(LifecycleEffect::Created(copy)) = run_lifecycle(&report, LifecycleAction::Duplicate, Some(&payload)) else {
            panic!("duplicate should create");
        };
        assert_eq!(copy.name, "Sales 2");
        assert_ne!(copy.id, report.id);
    }
}
