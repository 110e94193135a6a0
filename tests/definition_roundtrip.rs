use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use reportbuilder::builder::{ReportBuilderState, definition_to_state, is_report_dirty, state_to_definition};
use reportbuilder::core::models::DynamicReportDefinition;
use reportbuilder::core::types::{AggFunc, ColumnMeta};
use reportbuilder::filter::{BasicOperator, filter_group_to_basic_rows, is_basic_compatible};
use reportbuilder::pivot::validate_pivot;
use serde_json::json;

fn sample_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("sample-data").join(name)
}

fn sample_definition() -> DynamicReportDefinition {
    let path = sample_path("sales-report.json");
    let text = fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    serde_json::from_str(&text).expect("sales-report.json should deserialize")
}

fn sample_columns() -> Vec<ColumnMeta> {
    let path = sample_path("sales-columns.json");
    let text = fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    serde_json::from_str(&text).expect("sales-columns.json should deserialize")
}

#[test]
fn sample_definition_loads_into_state() {
    let state = definition_to_state(&sample_definition());

    assert_eq!(state.dataset_key.as_deref(), Some("sales"));
    assert_eq!(state.columns.selected_names(), vec!["region", "year", "revenue", "units"]);
    assert_eq!(state.pivot.value_cols[0].agg_func, Some(AggFunc::Sum));
    assert_eq!(validate_pivot(&state.pivot, &sample_columns()), Ok(()));
}

#[test]
fn definition_survives_state_roundtrip() {
    let definition = sample_definition();
    let state = definition_to_state(&definition);
    let restored = state_to_definition(&state).expect("state has a dataset");

    assert_eq!(restored, definition);
    assert_eq!(
        serde_json::to_value(&restored).unwrap(),
        serde_json::to_value(&definition).unwrap()
    );
}

#[test]
fn sample_filter_shows_in_basic_mode() {
    let definition = sample_definition();
    assert!(is_basic_compatible(&definition.filter));

    let columns: Vec<String> = sample_columns().into_iter().map(|c| c.name).collect();
    let rows = filter_group_to_basic_rows(&definition.filter, &columns);

    assert_eq!(rows.len(), columns.len());
    let year = rows.iter().find(|r| r.column == "year").unwrap();
    assert_eq!(year.value, Some(json!("2021")));
    assert_eq!(year.value_secondary, Some(json!("2023")));
    let region = rows.iter().find(|r| r.column == "region").unwrap();
    assert_eq!(region.value, Some(json!("EMEA, APAC")));
    let channel = rows.iter().find(|r| r.column == "channel").unwrap();
    assert_eq!(channel.operator, BasicOperator::All);
}

#[test]
fn empty_pivot_lists_are_omitted() {
    let mut definition = sample_definition();
    definition.row_group_cols = None;
    definition.pivot_cols = None;
    definition.value_cols = None;

    let state = definition_to_state(&definition);
    assert!(state.pivot.is_empty());

    let json = serde_json::to_value(state_to_definition(&state).unwrap()).unwrap();
    assert!(json.get("rowGroupCols").is_none());
    assert!(json.get("valueCols").is_none());
}

#[test]
fn state_without_dataset_has_no_definition() {
    assert_eq!(state_to_definition(&ReportBuilderState::default()), None);
}

#[test]
fn report_dirtiness_without_snapshot() {
    let with_dataset = ReportBuilderState::for_dataset(Some("sales".to_string()));
    assert!(is_report_dirty(&with_dataset, None));
    assert!(!is_report_dirty(&ReportBuilderState::default(), None));
}
