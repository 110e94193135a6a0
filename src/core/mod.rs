pub mod dirty_tracker;
pub mod models;
pub mod types;

pub use dirty_tracker::DirtyTracker;
pub use models::*;
pub use types::*;
