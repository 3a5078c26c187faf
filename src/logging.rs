//! Tracing subscriber setup for hosts embedding the renderers.
//!
//! [`init`] installs a process-wide subscriber that always writes to stdout and, when given a
//! directory, also to a timestamped `wavestrip_*.log` file there. Only the newest
//! [`MAX_LOG_FILES`] log files in that directory are kept.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::OnceLock,
    time::SystemTime,
};

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

/// Log files retained per directory, including the current one.
pub const MAX_LOG_FILES: usize = 10;
const LOG_FILE_PREFIX: &str = "wavestrip";
const LOG_FILE_EXTENSION: &str = "log";

static INSTALLED: OnceLock<Installed> = OnceLock::new();

/// The subscriber installed by the first successful [`init`].
struct Installed {
    log_dir: Option<PathBuf>,
    _guard: Option<WorkerGuard>,
}

impl Installed {
    /// Repeating the first request is a no-op; asking for a different log directory is not.
    fn accept(&self, log_dir: Option<&Path>) -> Result<(), LoggingError> {
        match log_dir {
            Some(requested) if self.log_dir.as_deref() != Some(requested) => {
                Err(LoggingError::AlreadyInitialized {
                    requested: requested.to_path_buf(),
                    active: self.log_dir.clone(),
                })
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to prepare log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read log directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to remove old log file {path}: {source}")]
    RemoveFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to create log file at {path}: {source}")]
    CreateLogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to format log filename time: {0}")]
    FormatTime(time::error::Format),
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(tracing::subscriber::SetGlobalDefaultError),
    /// Logging is already running and cannot start writing to `requested`.
    #[error("Logging already initialized (log directory {active:?}); cannot log to {requested}")]
    AlreadyInitialized {
        requested: PathBuf,
        active: Option<PathBuf>,
    },
}

/// Install the global subscriber, logging to stdout and optionally to a file in `log_dir`.
///
/// Calling again with the same `log_dir`, or with `None`, returns `Ok(())` without changes.
/// A call naming a different directory than the active one fails with
/// [`LoggingError::AlreadyInitialized`], since the global subscriber cannot be replaced.
pub fn init(log_dir: Option<&Path>) -> Result<(), LoggingError> {
    if let Some(installed) = INSTALLED.get() {
        return installed.accept(log_dir);
    }

    let timer = local_timer();
    let stdout_layer = fmt::layer()
        .with_timer(timer.clone())
        .with_writer(std::io::stdout);
    let registry = Registry::default().with(env_filter()).with(stdout_layer);

    let installed = match log_dir {
        None => {
            tracing::subscriber::set_global_default(registry).map_err(LoggingError::SetGlobal)?;
            Installed {
                log_dir: None,
                _guard: None,
            }
        }
        Some(dir) => {
            let (writer, guard, log_path) = open_log_file(dir)?;
            let file_layer = fmt::layer()
                .with_ansi(false)
                .with_timer(timer)
                .with_writer(writer);
            tracing::subscriber::set_global_default(registry.with(file_layer))
                .map_err(LoggingError::SetGlobal)?;
            tracing::info!(path = %log_path.display(), "Logging to file");
            Installed {
                log_dir: Some(dir.to_path_buf()),
                _guard: Some(guard),
            }
        }
    };
    // A racing `init` lost `set_global_default` above and returned its error already.
    let _ = INSTALLED.set(installed);
    Ok(())
}

/// Create this launch's log file in `dir`, prune older ones and wrap it in a background writer.
fn open_log_file(dir: &Path) -> Result<(NonBlocking, WorkerGuard, PathBuf), LoggingError> {
    fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let name = log_file_name(now_local_or_utc())?;
    let path = dir.join(&name);
    touch(&path)?;
    prune_old_logs(dir, MAX_LOG_FILES)?;
    let appender = tracing_appender::rolling::never(dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    Ok((writer, guard, path))
}

fn touch(path: &Path) -> Result<(), LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(drop)
        .map_err(|source| LoggingError::CreateLogFile {
            path: path.to_path_buf(),
            source,
        })
}

/// Delete the oldest `.log` files in `dir` until at most `keep` remain.
fn prune_old_logs(dir: &Path, keep: usize) -> Result<(), LoggingError> {
    let read_dir = fs::read_dir(dir).map_err(|source| LoggingError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut logs: Vec<(SystemTime, PathBuf)> = read_dir
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == LOG_FILE_EXTENSION))
        .map(|path| {
            let modified = fs::metadata(&path)
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, path)
        })
        .collect();
    if logs.len() <= keep {
        return Ok(());
    }
    logs.sort_by_key(|(modified, _)| *modified);
    let excess = logs.len() - keep;
    for (_, path) in logs.drain(..excess) {
        fs::remove_file(&path).map_err(|source| LoggingError::RemoveFile { path, source })?;
    }
    Ok(())
}

fn log_file_name(now: OffsetDateTime) -> Result<String, LoggingError> {
    const STAMP: &[FormatItem<'_>] =
        format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    let stamp = now.format(STAMP).map_err(LoggingError::FormatTime)?;
    Ok(format!("{LOG_FILE_PREFIX}_{stamp}.{LOG_FILE_EXTENSION}"))
}

fn local_timer() -> fmt::time::OffsetTime<time::format_description::BorrowedFormatItem<'static>> {
    const DISPLAY: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, DISPLAY.into())
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{thread, time::Duration};
    use tempfile::tempdir;

    fn log_count(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .flatten()
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext == LOG_FILE_EXTENSION)
            })
            .count()
    }

    #[test]
    fn log_filename_has_timestamp_and_prefix() {
        let fixed = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let name = log_file_name(fixed).unwrap();
        assert_eq!(name, "wavestrip_2023-11-14_22-13-20.log");
    }

    #[test]
    fn prune_removes_oldest_files_beyond_limit() {
        let dir = tempdir().unwrap();
        for idx in 0..12 {
            touch(&dir.path().join(format!("wavestrip_{idx}.log"))).unwrap();
            thread::sleep(Duration::from_millis(10));
        }

        prune_old_logs(dir.path(), 10).unwrap();
        assert_eq!(log_count(dir.path()), 10);
        assert!(!dir.path().join("wavestrip_0.log").exists());
        assert!(!dir.path().join("wavestrip_1.log").exists());
        assert!(dir.path().join("wavestrip_11.log").exists());
    }

    #[test]
    fn prune_ignores_other_files() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("wavestrip_a.log")).unwrap();
        touch(&dir.path().join("render.toml")).unwrap();

        prune_old_logs(dir.path(), 0).unwrap();
        assert!(!dir.path().join("wavestrip_a.log").exists());
        assert!(dir.path().join("render.toml").exists());
    }

    #[test]
    fn stdout_only_logging_rejects_a_later_log_directory() {
        let dir = tempdir().unwrap();
        let installed = Installed {
            log_dir: None,
            _guard: None,
        };
        assert!(installed.accept(None).is_ok());
        let err = installed.accept(Some(dir.path())).unwrap_err();
        let LoggingError::AlreadyInitialized { requested, active } = err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(requested, dir.path());
        assert_eq!(active, None);
    }

    #[test]
    fn repeating_the_active_log_directory_is_accepted() {
        let dir = tempdir().unwrap();
        let other = tempdir().unwrap();
        let installed = Installed {
            log_dir: Some(dir.path().to_path_buf()),
            _guard: None,
        };
        assert!(installed.accept(Some(dir.path())).is_ok());
        assert!(installed.accept(None).is_ok());
        assert!(installed.accept(Some(other.path())).is_err());
    }
}
