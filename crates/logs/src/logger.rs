use crate::Result;
use std::path::{Path, PathBuf};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_LEVEL: &str = "solwatch=info";

const LOG_FILE_NAME: &str = "solwatch";
const LOG_FILE_SUFFIX: &str = "log";

/// Application logger.
///
/// Writes human readable output to stderr and, when a logs
/// directory is configured, JSON lines to a daily log file.
#[derive(Debug, Clone)]
pub struct Logger {
    logs_dir: Option<PathBuf>,
    name: String,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Logger {
    /// Create a logger.
    pub fn new(logs_dir: Option<PathBuf>) -> Self {
        Self {
            logs_dir,
            name: LOG_FILE_NAME.to_owned(),
        }
    }

    /// Directory for log files.
    pub fn logs_dir(&self) -> Option<&Path> {
        self.logs_dir.as_deref()
    }

    /// Install the global tracing subscriber.
    ///
    /// The returned guard must be kept alive for buffered
    /// file output to be flushed.
    pub fn init_subscriber(
        &self,
        default_log_level: Option<String>,
    ) -> Result<Option<WorkerGuard>> {
        let filter = EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(
            |_| default_log_level.unwrap_or_else(|| DEFAULT_LOG_LEVEL.into()),
        ));

        let (file_layer, guard) = if let Some(logs_dir) = &self.logs_dir {
            std::fs::create_dir_all(logs_dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(&self.name)
                .filename_suffix(LOG_FILE_SUFFIX)
                .build(logs_dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        } else {
            (None, None)
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .with(file_layer)
            .try_init()?;

        Ok(guard)
    }

    /// Log files in the logs directory, oldest first.
    pub fn log_files(&self) -> Result<Vec<PathBuf>> {
        let Some(logs_dir) = &self.logs_dir else {
            return Ok(Vec::new());
        };
        let mut files = Vec::new();
        for entry in std::fs::read_dir(logs_dir)? {
            let path = entry?.path();
            let is_log = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| {
                    name.starts_with(&self.name)
                        && name.ends_with(LOG_FILE_SUFFIX)
                })
                .unwrap_or(false);
            if path.is_file() && is_log {
                files.push(path);
            }
        }
        // File names carry the date so lexical order is chronological
        files.sort();
        Ok(files)
    }
}
