// src/logging.rs

//! Global logger for the tester: one line per record, to stdout and,
//! when enabled, to a log file.

use crate::config::model::{ConfigError, LoggingConfig};
use chrono::Local;
use fern::Dispatch;
use std::{path::Path, process, thread};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SetLogger(#[from] log::SetLoggerError),
}

/// Build the dispatcher described by `cfg`; the log file, if any, is
/// resolved against `base_dir`.
pub fn build_dispatch(base_dir: &Path, cfg: &LoggingConfig) -> Result<Dispatch, LoggingError> {
    let level = cfg.level_filter()?;

    let log_path = cfg
        .enable
        .then(|| base_dir.join(cfg.file.as_deref().unwrap_or("tester.log")));

    let mut dispatch = Dispatch::new()
        .format(|out, msg, record| {
            out.finish(format_args!(
                "[{}][{:5}][{}][pid={}][tid={:?}] {}",
                Local::now().to_rfc3339(),
                record.level(),
                record.target(),
                process::id(),
                thread::current().id(),
                msg
            ))
        })
        .level(level)
        .chain(std::io::stdout());

    if let Some(path) = log_path {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    Ok(dispatch)
}

/// Install the logger described by `cfg` as the global one.
pub fn setup_logging(base_dir: &Path, cfg: &LoggingConfig) -> Result<(), LoggingError> {
    build_dispatch(base_dir, cfg)?.apply()?;
    Ok(())
}
