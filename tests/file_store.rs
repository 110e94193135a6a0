use pretty_assertions::assert_eq;
use reportbuilder::builder::{BuilderSettings, FetchOutcome, ReportBuilder, SaveOutcome};
use reportbuilder::core::models::{LifecycleAction, ReportPayload, ReportStatus};
use reportbuilder::core::types::{ColumnDataType, ColumnMeta, ReportId};
use reportbuilder::services::{ClientError, DataClient, FileReportStore};
use reportbuilder::{Action, DynamicReportDefinition};

fn definition(dataset: &str) -> DynamicReportDefinition {
    DynamicReportDefinition {
        dataset_key: dataset.to_string(),
        selected_columns: vec!["region".to_string()],
        filter: Default::default(),
        row_group_cols: None,
        pivot_cols: None,
        value_cols: None,
    }
}

async fn store() -> (tempfile::TempDir, FileReportStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = FileReportStore::open(&dir.path().join("store")).await.unwrap();
    store
        .save_columns("sales", &[ColumnMeta::new("region", ColumnDataType::String).dimension()])
        .await
        .unwrap();
    (dir, store)
}

#[tokio::test]
async fn reports_persist_as_json_files() {
    let (_dir, store) = store().await;
    let payload = ReportPayload {
        name: "Sales".to_string(),
        description: Some("by region".to_string()),
        definition: definition("sales"),
    };
    let created = store.create_report(payload).await.unwrap();

    let path = store.root().join("reports").join(format!("{}.json", created.id));
    assert!(path.exists());

    let reopened = FileReportStore::open(store.root()).await.unwrap();
    let loaded = reopened.get_report(&created.id).await.unwrap();
    assert_eq!(loaded, created);
    assert_eq!(reopened.list_reports().await.unwrap().len(), 1);
    assert_eq!(reopened.list_datasets().await.unwrap(), vec!["sales"]);
}

#[tokio::test]
async fn missing_entries_are_not_found() {
    let (_dir, store) = store().await;
    assert!(matches!(store.get_report(&ReportId::new()).await, Err(ClientError::NotFound(_))));
    assert!(matches!(store.get_columns("inventory").await, Err(ClientError::NotFound(_))));
}

#[tokio::test]
async fn dataset_keys_stay_inside_the_store() {
    let (dir, store) = store().await;
    let columns = [ColumnMeta::new("region", ColumnDataType::String)];

    for key in ["../../escaped", "../escaped", "/tmp/escaped", "a/b", "a\\b", "..", ""] {
        assert!(store.save_columns(key, &columns).await.is_err(), "{key:?} was accepted");
        assert!(
            matches!(store.get_columns(key).await, Err(ClientError::Rejected(_))),
            "{key:?} was read"
        );
    }
    assert!(!dir.path().join("escaped.json").exists());
    assert!(!store.root().join("escaped.json").exists());
    assert_eq!(store.list_datasets().await.unwrap(), vec!["sales"]);
}

#[tokio::test]
async fn lifecycle_updates_and_deletes_files() {
    let (_dir, store) = store().await;
    let payload = ReportPayload {
        name: "Sales".to_string(),
        description: None,
        definition: definition("sales"),
    };
    let report = store.create_report(payload).await.unwrap();

    let published = store
        .perform_action(&report.id, LifecycleAction::Publish, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(published.status, ReportStatus::Published);
    assert_eq!(store.get_report(&report.id).await.unwrap().status, ReportStatus::Published);

    assert!(matches!(
        store.perform_action(&report.id, LifecycleAction::Delete, None).await,
        Err(ClientError::Rejected(_))
    ));
    store.perform_action(&report.id, LifecycleAction::Archive, None).await.unwrap();
    assert_eq!(store.perform_action(&report.id, LifecycleAction::Delete, None).await.unwrap(), None);
    assert!(store.list_reports().await.unwrap().is_empty());
}

#[tokio::test]
async fn builder_round_trips_through_the_store() {
    let (_dir, store) = store().await;
    let mut builder = ReportBuilder::new(store, BuilderSettings::default());

    let (_, fetched) = builder.dispatch(Action::DatasetApplied(Some("sales".to_string()))).await;
    assert_eq!(fetched, Some(FetchOutcome::Loaded));
    let SaveOutcome::Saved(id) = builder.save_as("Regions").await else {
        panic!("save_as should succeed");
    };

    let store = FileReportStore::open(builder.client().root()).await.unwrap();
    let mut reopened = ReportBuilder::new(store, BuilderSettings::default());
    assert_eq!(reopened.load_report(&id).await, FetchOutcome::Loaded);
    assert_eq!(reopened.state(), builder.state());
    assert!(!reopened.is_dirty());
}
