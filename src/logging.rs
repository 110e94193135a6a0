use std::path::PathBuf;

use color_eyre::Result;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

lazy_static::lazy_static! {
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Append to a file; `None` means `reportbuilder.log` in the working directory
    File(Option<PathBuf>),
    Stderr,
}

impl Default for LogTarget {
    fn default() -> Self {
        LogTarget::File(None)
    }
}

fn resolve_log_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Ok(path)
        }
        None => Ok(std::env::current_dir()?.join(LOG_FILE.clone())),
    }
}

/// Initialize logging to `target`. `level` is the default directive (WARN when `None`);
/// RUST_LOG directives still apply on top.
pub fn init_with(target: LogTarget, level: Option<tracing::Level>) -> Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.unwrap_or(tracing::Level::WARN).into())
        .from_env_lossy();

    match target {
        LogTarget::File(custom) => {
            let writer_path = resolve_log_path(custom)?;
            let file_layer = fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_writer(move || {
                    std::fs::OpenOptions::new()
                        .create(true)
                        .append(true)
                        .open(&writer_path)
                        .expect("failed to open log file")
                })
                .with_target(false)
                .with_ansi(false)
                .with_filter(env_filter);
            tracing_subscriber::registry()
                .with(file_layer)
                .with(ErrorLayer::default())
                .try_init()?;
        }
        LogTarget::Stderr => {
            let stderr_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(env_filter);
            tracing_subscriber::registry()
                .with(stderr_layer)
                .with(ErrorLayer::default())
                .try_init()?;
        }
    }

    Ok(())
}
