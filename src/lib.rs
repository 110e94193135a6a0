#![allow(clippy::collapsible_if)]

pub mod action;
pub mod builder;
pub mod config;
pub mod core;
pub mod filter;
pub mod logging;
pub mod panel;
pub mod pivot;
pub mod services;

// Re-export commonly used types
pub use crate::action::Action;
pub use builder::{ReportBuilder, ReportBuilderState};
pub use crate::core::{DirtyTracker, DynamicReportDefinition, Report, ReportId};
pub use services::{DataClient, FileReportStore, MemoryClient};
