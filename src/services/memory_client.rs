//! In-process DataClient backed by maps. Used by the CLI demo and the tests.
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use super::data_client::{ClientError, ClientResult, DataClient, LifecycleEffect, run_lifecycle};
use crate::core::models::{LifecycleAction, Report, ReportPayload};
use crate::core::types::{ColumnMeta, ReportId};

#[derive(Debug, Default)]
pub struct MemoryClient {
    columns: RwLock<HashMap<String, Vec<ColumnMeta>>>,
    reports: RwLock<HashMap<ReportId, Report>>,
    offline: AtomicBool,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_dataset(&self, dataset_key: impl Into<String>, columns: Vec<ColumnMeta>) {
        self.columns.write().await.insert(dataset_key.into(), columns);
    }

    pub async fn insert_report(&self, report: Report) {
        self.reports.write().await.insert(report.id.clone(), report);
    }

    pub async fn report(&self, id: &ReportId) -> Option<Report> {
        self.reports.read().await.get(id).cloned()
    }

    pub async fn report_count(&self) -> usize {
        self.reports.read().await.len()
    }

    /// While offline every call fails with `ClientError::Unavailable`
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> ClientResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(ClientError::Unavailable)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DataClient for MemoryClient {
    async fn get_columns(&self, dataset_key: &str) -> ClientResult<Vec<ColumnMeta>> {
        self.check_online()?;
        self.columns
            .read()
            .await
            .get(dataset_key)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("dataset {dataset_key}")))
    }

    async fn get_report(&self, id: &ReportId) -> ClientResult<Report> {
        self.check_online()?;
        self.report(id)
            .await
            .ok_or_else(|| ClientError::NotFound(format!("report {id}")))
    }

    async fn create_report(&self, payload: ReportPayload) -> ClientResult<Report> {
        self.check_online()?;
        let mut report = Report::new(payload.name, Some(payload.definition));
        report.description = payload.description;
        debug!("Created report {}", report.id);
        self.insert_report(report.clone()).await;
        Ok(report)
    }

    async fn update_report(&self, id: &ReportId, payload: ReportPayload) -> ClientResult<Report> {
        self.check_online()?;
        let mut reports = self.reports.write().await;
        let report = reports
            .get_mut(id)
            .ok_or_else(|| ClientError::NotFound(format!("report {id}")))?;
        report.name = payload.name;
        report.description = payload.description;
        report.definition = Some(payload.definition);
        report.updated_at = Some(Utc::now());
        Ok(report.clone())
    }

    async fn perform_action(
        &self,
        id: &ReportId,
        action: LifecycleAction,
        payload: Option<Value>,
    ) -> ClientResult<Option<Report>> {
        self.check_online()?;
        let mut reports = self.reports.write().await;
        let report = reports
            .get(id)
            .ok_or_else(|| ClientError::NotFound(format!("report {id}")))?;
        match run_lifecycle(report, action, payload.as_ref())? {
            LifecycleEffect::Updated(updated) => {
                reports.insert(id.clone(), updated.clone());
                Ok(Some(updated))
            }
            LifecycleEffect::Created(copy) => {
                reports.insert(copy.id.clone(), copy.clone());
                Ok(Some(copy))
            }
            LifecycleEffect::Deleted => {
                reports.remove(id);
                Ok(None)
            }
        }
    }
}
