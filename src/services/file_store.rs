//! Directory-backed DataClient.
//!
//! Layout under the store root:
//! - `reports/<id>.json`: one pretty-printed `Report` per file
//! - `columns/<dataset_key>.json`: the column catalog of a dataset
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use color_eyre::eyre::eyre;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, info};

use super::data_client::{ClientError, ClientResult, DataClient, LifecycleEffect, run_lifecycle};
use crate::core::models::{LifecycleAction, Report, ReportPayload};
use crate::core::types::{ColumnMeta, ReportId};

const REPORTS_DIR: &str = "reports";
const COLUMNS_DIR: &str = "columns";

#[derive(Debug, Clone)]
pub struct FileReportStore {
    root: PathBuf,
}

impl FileReportStore {
    /// Open (creating if needed) a store rooted at `root`
    pub async fn open(root: &Path) -> color_eyre::Result<Self> {
        if root.exists() && !root.is_dir() {
            return Err(eyre!("Store path is not a directory: {}", root.display()));
        }
        fs::create_dir_all(root.join(REPORTS_DIR)).await?;
        fs::create_dir_all(root.join(COLUMNS_DIR)).await?;
        info!("Opened report store at {}", root.display());
        Ok(Self {
            root: root.to_owned(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn report_path(&self, id: &ReportId) -> PathBuf {
        self.root.join(REPORTS_DIR).join(format!("{id}.json"))
    }

    /// Catalog file for `dataset_key`; `None` unless the key is a single plain file name
    fn columns_path(&self, dataset_key: &str) -> Option<PathBuf> {
        let mut components = Path::new(dataset_key).components();
        let plain = matches!(components.next(), Some(Component::Normal(_)))
            && components.next().is_none()
            && !dataset_key.contains(['/', '\\']);
        plain.then(|| self.root.join(COLUMNS_DIR).join(format!("{dataset_key}.json")))
    }

    /// Write the column catalog for `dataset_key`
    pub async fn save_columns(&self, dataset_key: &str, columns: &[ColumnMeta]) -> color_eyre::Result<()> {
        let path = self
            .columns_path(dataset_key)
            .ok_or_else(|| eyre!("Invalid dataset key: {dataset_key:?}"))?;
        let json = serde_json::to_string_pretty(columns)?;
        fs::write(path, json).await?;
        Ok(())
    }

    /// Dataset keys with a column catalog, sorted
    pub async fn list_datasets(&self) -> color_eyre::Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut entries = fs::read_dir(self.root.join(COLUMNS_DIR)).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Every stored report, most recently updated first. Unreadable files are skipped.
    pub async fn list_reports(&self) -> color_eyre::Result<Vec<Report>> {
        let mut reports = Vec::new();
        let mut entries = fs::read_dir(self.root.join(REPORTS_DIR)).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let text = fs::read_to_string(&path).await?;
            match serde_json::from_str::<Report>(&text) {
                Ok(report) => reports.push(report),
                Err(e) => debug!("Skipping {}: {e}", path.display()),
            }
        }
        reports.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(reports)
    }

    async fn read_report(&self, id: &ReportId) -> ClientResult<Report> {
        let text = match fs::read_to_string(self.report_path(id)).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ClientError::NotFound(format!("report {id}")));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&text)?)
    }

    async fn write_report(&self, report: &Report) -> ClientResult<()> {
        let json = serde_json::to_string_pretty(report)?;
        fs::write(self.report_path(&report.id), json).await?;
        Ok(())
    }
}

#[async_trait]
impl DataClient for FileReportStore {
    async fn get_columns(&self, dataset_key: &str) -> ClientResult<Vec<ColumnMeta>> {
        let Some(path) = self.columns_path(dataset_key) else {
            return Err(ClientError::Rejected(format!("invalid dataset key {dataset_key:?}")));
        };
        let text = match fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ClientError::NotFound(format!("dataset {dataset_key}")));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&text)?)
    }

    async fn get_report(&self, id: &ReportId) -> ClientResult<Report> {
        self.read_report(id).await
    }

    async fn create_report(&self, payload: ReportPayload) -> ClientResult<Report> {
        let mut report = Report::new(payload.name, Some(payload.definition));
        report.description = payload.description;
        self.write_report(&report).await?;
        Ok(report)
    }

    async fn update_report(&self, id: &ReportId, payload: ReportPayload) -> ClientResult<Report> {
        let mut report = self.read_report(id).await?;
        report.name = payload.name;
        report.description = payload.description;
        report.definition = Some(payload.definition);
        report.updated_at = Some(Utc::now());
        self.write_report(&report).await?;
        Ok(report)
    }

    async fn perform_action(
        &self,
        id: &ReportId,
        action: LifecycleAction,
        payload: Option<Value>,
    ) -> ClientResult<Option<Report>> {
        let report = self.read_report(id).await?;
        match run_lifecycle(&report, action, payload.as_ref())? {
            LifecycleEffect::Updated(updated) | LifecycleEffect::Created(updated) => {
                self.write_report(&updated).await?;
                Ok(Some(updated))
            }
            LifecycleEffect::Deleted => {
                fs::remove_file(self.report_path(id)).await?;
                Ok(None)
            }
        }
    }
}
