//! Pivot layout: three zones of column placements.
//!
//! Every function here returns a new config and leaves its input untouched. Rows and
//! columns are dimension zones and exclude each other; the values zone holds measures,
//! each paired with an aggregate.
use crate::core::types::{AggFunc, ColumnMeta, ColumnVO};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use strum::Display;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub enum PivotZone {
    Rows,
    Columns,
    Values,
}

impl PivotZone {
    /// The dimension zone a column must leave when placed in this one
    fn opposite_dimension(self) -> Option<PivotZone> {
        match self {
            Self::Rows => Some(Self::Columns),
            Self::Columns => Some(Self::Rows),
            Self::Values => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "json_schema", derive(schemars::JsonSchema))]
pub struct PivotConfig {
    #[serde(default)]
    pub row_group_cols: Vec<ColumnVO>,
    #[serde(default)]
    pub pivot_cols: Vec<ColumnVO>,
    #[serde(default)]
    pub value_cols: Vec<ColumnVO>,
}

impl PivotConfig {
    pub fn zone(&self, zone: PivotZone) -> &Vec<ColumnVO> {
        match zone {
            PivotZone::Rows => &self.row_group_cols,
            PivotZone::Columns => &self.pivot_cols,
            PivotZone::Values => &self.value_cols,
        }
    }

    fn zone_mut(&mut self, zone: PivotZone) -> &mut Vec<ColumnVO> {
        match zone {
            PivotZone::Rows => &mut self.row_group_cols,
            PivotZone::Columns => &mut self.pivot_cols,
            PivotZone::Values => &mut self.value_cols,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_group_cols.is_empty() && self.pivot_cols.is_empty() && self.value_cols.is_empty()
    }

    pub fn contains(&self, zone: PivotZone, col_id: &str) -> bool {
        self.zone(zone).iter().any(|c| c.id == col_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PivotError {
    #[error("column '{0}' is placed in both rows and columns")]
    DimensionInBothZones(String),
    #[error("value column '{0}' has no aggregate function")]
    MissingAggFunc(String),
    #[error("aggregate '{agg}' is not allowed for column '{column}'")]
    AggNotAllowed { column: String, agg: AggFunc },
}

/// Place `column` in `zone`. Placing into rows or columns first removes the column from
/// the other dimension zone; a column already present in `zone` is not duplicated.
pub fn add_to_zone(config: &PivotConfig, zone: PivotZone, column: ColumnVO) -> PivotConfig {
    let mut next = config.clone();
    if let Some(other) = zone.opposite_dimension() {
        next.zone_mut(other).retain(|c| c.id != column.id);
    }
    if !next.contains(zone, &column.id) {
        next.zone_mut(zone).push(column);
    }
    next
}

pub fn remove_from_zone(config: &PivotConfig, zone: PivotZone, col_id: &str) -> PivotConfig {
    let mut next = config.clone();
    next.zone_mut(zone).retain(|c| c.id != col_id);
    next
}

/// Move the entry at `from` to `to` within `zone`.
///
/// Returns the input itself (`Cow::Borrowed`) when nothing moves: `from == to` or `from`
/// out of range. `to` is clamped to the end of the zone.
pub fn reorder_in_zone(config: &PivotConfig, zone: PivotZone, from: usize, to: usize) -> Cow<'_, PivotConfig> {
    if from == to || from >= config.zone(zone).len() {
        return Cow::Borrowed(config);
    }
    let mut next = config.clone();
    let cols = next.zone_mut(zone);
    let moved = cols.remove(from);
    let to = to.min(cols.len());
    cols.insert(to, moved);
    Cow::Owned(next)
}

/// Change the aggregate of a placed measure. Only the values zone carries aggregates.
pub fn update_agg_func(config: &PivotConfig, col_id: &str, agg_func: AggFunc) -> PivotConfig {
    let mut next = config.clone();
    if let Some(col) = next.value_cols.iter_mut().find(|c| c.id == col_id) {
        col.agg_func = Some(agg_func);
    }
    next
}

/// Measure placement for `meta` with the global default aggregate
pub fn column_vo_from_meta(meta: &ColumnMeta, agg_override: Option<AggFunc>) -> ColumnVO {
    column_vo_from_meta_or(meta, agg_override, AggFunc::default())
}

/// Measure placement: explicit override, else the column's first allowed aggregate, else
/// `fallback` when the column declares no allowed list.
pub fn column_vo_from_meta_or(meta: &ColumnMeta, agg_override: Option<AggFunc>, fallback: AggFunc) -> ColumnVO {
    let agg = agg_override
        .or_else(|| meta.allowed_agg_funcs.as_ref().and_then(|list| list.first().copied()))
        .unwrap_or(fallback);
    ColumnVO {
        id: meta.name.clone(),
        display_name: meta.display_name.clone(),
        field: Some(meta.name.clone()),
        agg_func: Some(agg),
    }
}

/// Dimensions not yet placed in rows or columns
pub fn unplaced_dimensions<'a>(columns: &'a [ColumnMeta], config: &PivotConfig) -> Vec<&'a ColumnMeta> {
    let placed: HashSet<&str> = config
        .row_group_cols
        .iter()
        .chain(config.pivot_cols.iter())
        .map(|c| c.id.as_str())
        .collect();
    columns
        .iter()
        .filter(|c| c.is_dimension && !placed.contains(c.name.as_str()))
        .collect()
}

/// Measures not yet placed in values
pub fn unplaced_measures<'a>(columns: &'a [ColumnMeta], config: &PivotConfig) -> Vec<&'a ColumnMeta> {
    let placed: HashSet<&str> = config.value_cols.iter().map(|c| c.id.as_str()).collect();
    columns
        .iter()
        .filter(|c| c.is_measure && !placed.contains(c.name.as_str()))
        .collect()
}

/// Check dimension exclusivity and that every measure carries an allowed aggregate.
/// Columns missing from `columns` only get the presence check.
pub fn validate_pivot(config: &PivotConfig, columns: &[ColumnMeta]) -> Result<(), PivotError> {
    for col in &config.row_group_cols {
        if config.contains(PivotZone::Columns, &col.id) {
            return Err(PivotError::DimensionInBothZones(col.id.clone()));
        }
    }
    for col in &config.value_cols {
        let agg = col
            .agg_func
            .ok_or_else(|| PivotError::MissingAggFunc(col.id.clone()))?;
        if let Some(meta) = columns.iter().find(|m| m.name == col.id) {
            if !meta.allows_agg(agg) {
                return Err(PivotError::AggNotAllowed {
                    column: col.id.clone(),
                    agg,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ColumnDataType;
    use pretty_assertions::assert_eq;

    fn region() -> ColumnMeta {
        ColumnMeta::new("region", ColumnDataType::String).dimension()
    }

    fn year() -> ColumnMeta {
        ColumnMeta::new("year", ColumnDataType::Number).dimension()
    }

    fn revenue() -> ColumnMeta {
        ColumnMeta::new("revenue", ColumnDataType::Number).measure(Some(vec![AggFunc::Avg, AggFunc::Max]))
    }

    fn units() -> ColumnMeta {
        ColumnMeta::new("units", ColumnDataType::Number).measure(None)
    }

    #[test]
    fn test_dimension_moves_between_zones() {
        let col_a = ColumnVO::dimension(&region());
        let cfg = add_to_zone(&PivotConfig::default(), PivotZone::Columns, col_a.clone());
        let cfg = add_to_zone(&cfg, PivotZone::Rows, col_a.clone());

        assert_eq!(cfg.row_group_cols, vec![col_a]);
        assert!(cfg.pivot_cols.is_empty());
    }

    #[test]
    fn test_no_duplicates_in_zone() {
        let cfg = add_to_zone(&PivotConfig::default(), PivotZone::Rows, ColumnVO::dimension(&region()));
        let cfg = add_to_zone(&cfg, PivotZone::Rows, ColumnVO::dimension(&region()));
        assert_eq!(cfg.row_group_cols.len(), 1);
    }

    #[test]
    fn test_exclusivity_holds_over_any_sequence() {
        let dims = [region(), year()];
        let zones = [PivotZone::Rows, PivotZone::Columns, PivotZone::Rows, PivotZone::Columns, PivotZone::Values];
        let mut cfg = PivotConfig::default();
        for step in 0..20 {
            let meta = &dims[step % dims.len()];
            let zone = zones[(step * 3 + step / 2) % zones.len()];
            cfg = add_to_zone(&cfg, zone, ColumnVO::dimension(meta));
            for col in &cfg.row_group_cols {
                assert!(!cfg.contains(PivotZone::Columns, &col.id), "step {step}: {:?}", cfg);
            }
        }
    }

    #[test]
    fn test_add_does_not_mutate_input() {
        let original = PivotConfig::default();
        let _ = add_to_zone(&original, PivotZone::Rows, ColumnVO::dimension(&year()));
        assert!(original.is_empty());
    }

    #[test]
    fn test_remove_from_zone() {
        let cfg = add_to_zone(&PivotConfig::default(), PivotZone::Rows, ColumnVO::dimension(&year()));
        let removed = remove_from_zone(&cfg, PivotZone::Rows, "year");
        assert!(removed.row_group_cols.is_empty());

        let untouched = remove_from_zone(&cfg, PivotZone::Columns, "year");
        assert_eq!(untouched, cfg);
    }

    #[test]
    fn test_reorder_same_index_returns_same_config() {
        let cfg = add_to_zone(&PivotConfig::default(), PivotZone::Rows, ColumnVO::dimension(&year()));
        let cfg = add_to_zone(&cfg, PivotZone::Rows, ColumnVO::dimension(&region()));

        let same = reorder_in_zone(&cfg, PivotZone::Rows, 1, 1);
        assert!(matches!(same, Cow::Borrowed(_)));
        assert!(std::ptr::eq(same.as_ref(), &cfg));

        let moved = reorder_in_zone(&cfg, PivotZone::Rows, 1, 0);
        let ids: Vec<&str> = moved.row_group_cols.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["region", "year"]);

        assert!(matches!(reorder_in_zone(&cfg, PivotZone::Rows, 5, 0), Cow::Borrowed(_)));
    }

    #[test]
    fn test_update_agg_func_values_only() {
        let cfg = add_to_zone(&PivotConfig::default(), PivotZone::Values, column_vo_from_meta(&units(), None));
        let cfg = add_to_zone(&cfg, PivotZone::Rows, ColumnVO::dimension(&year()));

        let updated = update_agg_func(&cfg, "units", AggFunc::Max);
        assert_eq!(updated.value_cols[0].agg_func, Some(AggFunc::Max));

        let ignored = update_agg_func(&cfg, "year", AggFunc::Max);
        assert_eq!(ignored, cfg);
        assert_eq!(ignored.row_group_cols[0].agg_func, None);
    }

    #[test]
    fn test_measure_defaulting_policy() {
        assert_eq!(column_vo_from_meta(&revenue(), Some(AggFunc::Max)).agg_func, Some(AggFunc::Max));
        assert_eq!(column_vo_from_meta(&revenue(), None).agg_func, Some(AggFunc::Avg));
        assert_eq!(column_vo_from_meta(&units(), None).agg_func, Some(AggFunc::Sum));
        assert_eq!(column_vo_from_meta_or(&units(), None, AggFunc::Count).agg_func, Some(AggFunc::Count));
    }

    #[test]
    fn test_unplaced_candidates() {
        let columns = vec![region(), year(), revenue(), units()];
        let cfg = add_to_zone(&PivotConfig::default(), PivotZone::Columns, ColumnVO::dimension(&year()));
        let cfg = add_to_zone(&cfg, PivotZone::Values, column_vo_from_meta(&units(), None));

        let dims: Vec<&str> = unplaced_dimensions(&columns, &cfg).iter().map(|c| c.name.as_str()).collect();
        let measures: Vec<&str> = unplaced_measures(&columns, &cfg).iter().map(|c| c.name.as_str()).collect();
        assert_eq!(dims, vec!["region"]);
        assert_eq!(measures, vec!["revenue"]);
    }

    #[test]
    fn test_validate_pivot() {
        let columns = vec![region(), revenue()];
        let mut cfg = add_to_zone(&PivotConfig::default(), PivotZone::Values, column_vo_from_meta(&revenue(), None));
        assert_eq!(validate_pivot(&cfg, &columns), Ok(()));

        cfg.value_cols[0].agg_func = Some(AggFunc::Sum);
        assert_eq!(
            validate_pivot(&cfg, &columns),
            Err(PivotError::AggNotAllowed { column: "revenue".to_string(), agg: AggFunc::Sum })
        );

        cfg.value_cols[0].agg_func = None;
        assert_eq!(validate_pivot(&cfg, &columns), Err(PivotError::MissingAggFunc("revenue".to_string())));

        let mut both = PivotConfig::default();
        both.row_group_cols.push(ColumnVO::dimension(&region()));
        both.pivot_cols.push(ColumnVO::dimension(&region()));
        assert_eq!(validate_pivot(&both, &columns), Err(PivotError::DimensionInBothZones("region".to_string())));
    }
}
