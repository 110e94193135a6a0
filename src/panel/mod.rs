pub mod columns_panel;
pub mod dataset_panel;
pub mod filter_panel;
pub mod pivot_panel;

pub use columns_panel::ColumnsPanel;
pub use dataset_panel::DatasetPanel;
pub use filter_panel::{FilterMode, FilterPanel};
pub use pivot_panel::PivotPanel;
