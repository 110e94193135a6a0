//! ReportBuilder: folds panel apply events into one state, tracks the saved snapshot and
//! drives the data client.
//!
//! Client failures never escape as errors. Each async operation falls back to a safe state
//! and reports what happened through its outcome value; every failure is logged at warn.
use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::definition::{definition_to_state, state_to_definition};
use super::menu::{MenuAction, MenuEntry, build_action_menu};
use super::state::{ReportBuilderState, is_report_dirty};
use crate::action::Action;
use crate::core::models::{DynamicReportDefinition, LifecycleAction, Report, ReportPayload};
use crate::core::types::{AggFunc, ColumnMeta, ColumnSelection, ReportId};
use crate::panel::{ColumnsPanel, DatasetPanel, FilterMode, FilterPanel, PivotPanel};
use crate::services::{ClientError, ClientResult, DataClient};

const UNTITLED_REPORT: &str = "Untitled report";

/// Builder preferences, usually taken from the loaded [`Config`](crate::config::Config)
#[derive(Debug, Clone, Default)]
pub struct BuilderSettings {
    pub default_agg_func: AggFunc,
    pub filter_mode: FilterMode,
    pub menu_labels: HashMap<MenuAction, String>,
}

/// What `handle_action` did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// The applied value is now part of the state
    Folded,
    /// Produced for another dataset; dropped
    Stale,
    /// The dataset key changed; column metadata must be refreshed
    DatasetChanged,
    /// Nothing to do
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded,
    /// The fetch failed and the builder fell back to an empty value
    FellBack { reason: String },
    /// A newer fetch or a dataset change happened meanwhile; the response was dropped
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(ReportId),
    /// No dataset, or nothing changed since the last save
    NothingToSave,
    Unavailable,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Updated,
    /// The action produced a new report (duplicate); the builder stays on the current one
    Created(ReportId),
    /// The report is gone and the builder was cleared
    Deleted,
    Failed { reason: String },
}

/// Ticket for one column-metadata fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    dataset_key: Option<String>,
}

impl FetchTicket {
    pub fn dataset_key(&self) -> Option<&str> {
        self.dataset_key.as_deref()
    }
}

pub struct ReportBuilder<C: DataClient> {
    client: C,
    settings: BuilderSettings,
    state: ReportBuilderState,
    saved: Option<ReportBuilderState>,
    report: Option<Report>,
    columns: Vec<ColumnMeta>,
    fetch_generation: u64,
    pub dataset_panel: DatasetPanel,
    pub columns_panel: ColumnsPanel,
    pub filter_panel: FilterPanel,
    pub pivot_panel: PivotPanel,
}

impl<C: DataClient> ReportBuilder<C> {
    pub fn new(client: C, settings: BuilderSettings) -> Self {
        Self {
            client,
            state: ReportBuilderState::default(),
            saved: None,
            report: None,
            columns: vec![],
            fetch_generation: 0,
            dataset_panel: DatasetPanel::default(),
            columns_panel: ColumnsPanel::new(),
            filter_panel: FilterPanel::new(settings.filter_mode),
            pivot_panel: PivotPanel::new(settings.default_agg_func),
            settings,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn state(&self) -> &ReportBuilderState {
        &self.state
    }

    pub fn saved(&self) -> Option<&ReportBuilderState> {
        self.saved.as_ref()
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// Column metadata of the current dataset
    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    pub fn is_dirty(&self) -> bool {
        is_report_dirty(&self.state, self.saved.as_ref())
    }

    pub fn definition(&self) -> Option<DynamicReportDefinition> {
        state_to_definition(&self.state)
    }

    /// Pretty JSON of the current definition; `None` without a dataset
    pub fn export(&self) -> Result<Option<String>, serde_json::Error> {
        self.definition().map(|d| serde_json::to_string_pretty(&d)).transpose()
    }

    /// Menu for the current state, with configured label overrides
    pub fn action_menu(&self) -> Vec<MenuEntry> {
        let mut entries = build_action_menu(
            self.report.as_ref(),
            self.is_dirty(),
            self.state.dataset_key.is_some(),
            self.state.has_non_default_state(),
        );
        for entry in &mut entries {
            if let Some(label) = self.settings.menu_labels.get(&entry.action) {
                entry.label = label.clone();
            }
        }
        entries
    }

    /// Fold one panel event into the state.
    ///
    /// Apply events tagged with a dataset other than the current one are dropped.
    pub fn handle_action(&mut self, action: Action) -> Handled {
        if let Some(source) = action.source_dataset() {
            if source != self.state.dataset_key.as_deref() {
                warn!(
                    "Dropping stale {action}: produced for {source:?}, current dataset is {:?}",
                    self.state.dataset_key
                );
                return Handled::Stale;
            }
        }
        match action {
            Action::DatasetApplied(key) => {
                if self.change_dataset(key) {
                    Handled::DatasetChanged
                } else {
                    Handled::Ignored
                }
            }
            Action::ColumnsApplied { selection, .. } => {
                self.state.columns = selection;
                Handled::Folded
            }
            Action::FilterApplied { filter, .. } => {
                self.state.filter = filter;
                Handled::Folded
            }
            Action::PivotApplied { pivot, .. } => {
                self.state.pivot = pivot;
                Handled::Folded
            }
            Action::ClearAll => {
                self.clear_all();
                Handled::Folded
            }
            Action::ResetToSaved => {
                if self.reset_to_saved() {
                    Handled::DatasetChanged
                } else {
                    Handled::Folded
                }
            }
        }
    }

    /// `handle_action`, then refresh column metadata when the dataset changed
    pub async fn dispatch(&mut self, action: Action) -> (Handled, Option<FetchOutcome>) {
        let handled = self.handle_action(action);
        if handled == Handled::DatasetChanged {
            let outcome = self.refresh_columns().await;
            (handled, Some(outcome))
        } else {
            (handled, None)
        }
    }

    /// Switch to another dataset: columns, filter and pivot start over. Returns false when
    /// the key is already current.
    pub fn change_dataset(&mut self, dataset_key: Option<String>) -> bool {
        if dataset_key == self.state.dataset_key {
            return false;
        }
        info!("Dataset changed to {dataset_key:?}");
        self.state = ReportBuilderState::for_dataset(dataset_key);
        self.invalidate_columns();
        self.hydrate_panels();
        true
    }

    /// Drop the state, the saved snapshot and the loaded report
    pub fn clear_all(&mut self) {
        debug!("Clearing report builder");
        self.state = ReportBuilderState::default();
        self.saved = None;
        self.report = None;
        self.invalidate_columns();
        self.hydrate_panels();
    }

    /// Return to the saved snapshot, or the empty state when nothing was saved.
    /// Returns whether the dataset changed.
    pub fn reset_to_saved(&mut self) -> bool {
        let target = self.saved.clone().unwrap_or_default();
        let dataset_changed = target.dataset_key != self.state.dataset_key;
        self.state = target;
        if dataset_changed {
            self.invalidate_columns();
        }
        self.hydrate_panels();
        dataset_changed
    }

    /// Adopt an already fetched report: its definition becomes both the state and the
    /// saved snapshot. Returns whether it names a dataset.
    pub fn load_report_value(&mut self, report: Report) -> bool {
        let state = report
            .definition
            .as_ref()
            .map(definition_to_state)
            .unwrap_or_default();
        info!("Loaded report {} ({})", report.name, report.id);
        self.saved = Some(state.clone());
        self.state = state;
        self.report = Some(report);
        self.invalidate_columns();
        self.hydrate_panels();
        self.state.dataset_key.is_some()
    }

    /// Fetch and adopt a report, then its column metadata. A failed report fetch leaves an
    /// empty builder.
    pub async fn load_report(&mut self, id: &ReportId) -> FetchOutcome {
        match self.client.get_report(id).await {
            Ok(report) => {
                self.load_report_value(report);
                self.refresh_columns().await
            }
            Err(e) => {
                warn!("Failed to load report {id}: {e}");
                self.clear_all();
                FetchOutcome::FellBack { reason: e.to_string() }
            }
        }
    }

    /// Start a column fetch for the current dataset. Starting another fetch, or changing
    /// the dataset, supersedes this ticket.
    pub fn begin_column_fetch(&mut self) -> FetchTicket {
        self.fetch_generation += 1;
        FetchTicket {
            generation: self.fetch_generation,
            dataset_key: self.state.dataset_key.clone(),
        }
    }

    /// Complete a fetch started with `begin_column_fetch`
    pub fn finish_column_fetch(&mut self, ticket: FetchTicket, result: ClientResult<Vec<ColumnMeta>>) -> FetchOutcome {
        if ticket.generation != self.fetch_generation || ticket.dataset_key != self.state.dataset_key {
            debug!(
                "Discarding columns for {:?} (generation {} of {})",
                ticket.dataset_key, ticket.generation, self.fetch_generation
            );
            return FetchOutcome::Superseded;
        }
        let outcome = match result {
            Ok(columns) => {
                debug!("Got {} columns for {:?}", columns.len(), ticket.dataset_key);
                self.columns = columns;
                FetchOutcome::Loaded
            }
            Err(e) => {
                warn!("Failed to fetch columns for {:?}: {e}", ticket.dataset_key);
                self.columns.clear();
                FetchOutcome::FellBack { reason: e.to_string() }
            }
        };
        self.sync_panel_columns();
        if self.needs_default_selection() {
            self.state.columns = ColumnSelection::from_meta(&self.columns);
            self.columns_panel.reset(self.state.dataset_key.clone(), self.state.columns.clone());
        }
        outcome
    }

    /// Fetch column metadata for the current dataset
    pub async fn refresh_columns(&mut self) -> FetchOutcome {
        let ticket = self.begin_column_fetch();
        let result = match ticket.dataset_key() {
            Some(key) => self.client.get_columns(key).await,
            None => Ok(vec![]),
        };
        self.finish_column_fetch(ticket, result)
    }

    /// Save over the loaded report, or create one when none is loaded
    pub async fn save(&mut self) -> SaveOutcome {
        if !self.is_dirty() {
            return SaveOutcome::NothingToSave;
        }
        let Some(definition) = self.definition() else {
            return SaveOutcome::NothingToSave;
        };
        let (name, description) = match &self.report {
            Some(report) => (report.name.clone(), report.description.clone()),
            None => (UNTITLED_REPORT.to_string(), None),
        };
        let payload = ReportPayload {
            name,
            description,
            definition,
        };
        let result = match self.report.as_ref().map(|r| r.id.clone()) {
            Some(id) => self.client.update_report(&id, payload).await,
            None => self.client.create_report(payload).await,
        };
        self.finish_save(result)
    }

    /// Save the current state as a new report named `name`
    pub async fn save_as(&mut self, name: impl Into<String>) -> SaveOutcome {
        let Some(definition) = self.definition() else {
            return SaveOutcome::NothingToSave;
        };
        let payload = ReportPayload {
            name: name.into(),
            description: self.report.as_ref().and_then(|r| r.description.clone()),
            definition,
        };
        let result = self.client.create_report(payload).await;
        self.finish_save(result)
    }

    fn finish_save(&mut self, result: ClientResult<Report>) -> SaveOutcome {
        match result {
            Ok(report) => {
                info!("Saved report {} ({})", report.name, report.id);
                let id = report.id.clone();
                self.report = Some(report);
                self.saved = Some(self.state.clone());
                SaveOutcome::Saved(id)
            }
            Err(ClientError::Unavailable) => {
                warn!("Save failed: backend unavailable");
                SaveOutcome::Unavailable
            }
            Err(e) => {
                warn!("Save failed: {e}");
                SaveOutcome::Failed { reason: e.to_string() }
            }
        }
    }

    /// Run a server lifecycle action on the loaded report
    pub async fn perform_action(&mut self, action: LifecycleAction, payload: Option<Value>) -> ActionOutcome {
        let Some(report) = &self.report else {
            return ActionOutcome::Failed {
                reason: "no report loaded".to_string(),
            };
        };
        if !report.offers(action) {
            warn!("Report {} does not offer {action}", report.id);
            return ActionOutcome::Failed {
                reason: format!("{action} is not available"),
            };
        }
        let id = report.id.clone();
        match self.client.perform_action(&id, action, payload).await {
            Ok(Some(updated)) if updated.id == id => {
                info!("{action} on report {id}: now {}", updated.status);
                self.report = Some(updated);
                ActionOutcome::Updated
            }
            Ok(Some(created)) => ActionOutcome::Created(created.id),
            Ok(None) => {
                info!("Report {id} removed by {action}");
                self.clear_all();
                ActionOutcome::Deleted
            }
            Err(e) => {
                warn!("{action} on report {id} failed: {e}");
                ActionOutcome::Failed { reason: e.to_string() }
            }
        }
    }

    fn invalidate_columns(&mut self) {
        self.fetch_generation += 1;
        self.columns.clear();
    }

    /// A fresh dataset starts with every column selected; a loaded report keeps its list
    fn needs_default_selection(&self) -> bool {
        self.state.dataset_key.is_some()
            && self.state.columns.is_empty()
            && self.saved.as_ref().map(|s| &s.dataset_key) != Some(&self.state.dataset_key)
    }

    /// Hand the current column metadata to the panels, keeping their drafts
    fn sync_panel_columns(&mut self) {
        self.columns_panel.set_available(self.columns.clone());
        self.filter_panel.set_columns(self.columns.clone());
        self.pivot_panel.set_columns(self.columns.clone());
    }

    /// Re-baseline every panel on the current state. Only for a load, a clear, a reset or
    /// a dataset change; drafts are dropped.
    fn hydrate_panels(&mut self) {
        self.sync_panel_columns();
        let key = self.state.dataset_key.clone();
        self.dataset_panel.reset(key.clone());
        self.columns_panel.reset(key.clone(), self.state.columns.clone());
        self.filter_panel.reset(key.clone(), self.state.filter.clone());
        self.pivot_panel.reset(key, self.state.pivot.clone());
    }
}
