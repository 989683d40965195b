//! Tracing setup. The terminal belongs to the dashboard, so log output goes
//! to a file only.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Log path {0} has no file name")]
    NoFileName(PathBuf),
    #[error("Failed to create log file at {path}: {source}")]
    CreateLogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(tracing::subscriber::SetGlobalDefaultError),
}

/// Install the global subscriber. Keep the returned guard alive until exit,
/// dropping it flushes buffered lines.
pub fn init(path: &Path) -> Result<WorkerGuard, LoggingError> {
    let (dir, file_name) = split_log_path(path)?;
    ensure_file_exists(path)?;

    let file_appender = rolling::never(dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(file_writer);

    let subscriber = Registry::default()
        .with(build_env_filter())
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::SetGlobal)?;

    tracing::info!("Logging initialized; log file at {}", path.display());
    Ok(guard)
}

/// A bare file name logs into the working directory.
fn split_log_path(path: &Path) -> Result<(PathBuf, OsString), LoggingError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::NoFileName(path.to_path_buf()))?
        .to_os_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, file_name))
}

fn ensure_file_exists(path: &Path) -> Result<(), LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(|_| ())
        .map_err(|source| LoggingError::CreateLogFile {
            path: path.to_path_buf(),
            source,
        })
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_file_name_logs_into_the_working_directory() {
        let (dir, name) = split_log_path(Path::new("feedback-dashboard.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, "feedback-dashboard.log");

        let (dir, _) = split_log_path(Path::new("/var/log/fd.log")).unwrap();
        assert_eq!(dir, PathBuf::from("/var/log"));
    }

    #[test]
    fn directory_only_paths_are_rejected() {
        assert!(matches!(
            split_log_path(Path::new("/")),
            Err(LoggingError::NoFileName(_))
        ));
    }

    #[test]
    fn missing_log_file_is_created() {
        let path = std::env::temp_dir().join(format!("feedback-dashboard-{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);

        ensure_file_exists(&path).unwrap();
        assert!(path.exists());
        std::fs::remove_file(&path).unwrap();
    }
}
