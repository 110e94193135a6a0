pub mod zone;

pub use zone::{
    PivotConfig, PivotError, PivotZone, add_to_zone, column_vo_from_meta, column_vo_from_meta_or,
    remove_from_zone, reorder_in_zone, unplaced_dimensions, unplaced_measures, update_agg_func,
    validate_pivot,
};
