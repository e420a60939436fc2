// Logging module - tracing subscriber setup
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::domain::error::{XtuiError, XtuiResult};

/// How the subscriber should be configured for this process
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Base level from configuration, e.g. "info"
    pub level: String,
    pub verbose: bool,
    pub quiet: bool,
    /// Destination file; screens own the terminal so logs never go to stderr
    pub file: Option<PathBuf>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            verbose: false,
            quiet: false,
            file: None,
        }
    }
}

impl LogOptions {
    /// Directive used when `RUST_LOG` is not set
    pub fn default_directive(&self) -> String {
        let level = if self.verbose { "debug" } else { self.level.as_str() };
        format!("xtui={}", level)
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.file.clone().or_else(default_log_path)
    }
}

/// `<cache_dir>/xtui/xtui.log`
pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("xtui").join("xtui.log"))
}

/// Initialize logging system
pub fn init_logging(options: &LogOptions) -> XtuiResult<()> {
    if options.quiet {
        return Ok(());
    }

    let Some(path) = options.log_path() else {
        return Ok(());
    };
    let file = open_log_file(&path)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.default_directive()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true),
        )
        .try_init()
        .map_err(|e| XtuiError::Config {
            message: format!("Failed to initialize logging: {}", e),
        })?;

    tracing::info!(path = %path.display(), "xtui logging system initialized");
    Ok(())
}

fn open_log_file(path: &Path) -> XtuiResult<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_directive() {
        let options = LogOptions::default();
        assert_eq!(options.default_directive(), "xtui=info");

        let verbose = LogOptions {
            verbose: true,
            ..LogOptions::default()
        };
        assert_eq!(verbose.default_directive(), "xtui=debug");
    }

    #[test]
    fn test_quiet_skips_subscriber() {
        let options = LogOptions {
            quiet: true,
            ..LogOptions::default()
        };
        assert!(init_logging(&options).is_ok());
    }

    #[test]
    fn test_log_file_is_created() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logs").join("xtui.log");
        let file = open_log_file(&path).unwrap();
        drop(file);
        assert!(path.exists());
    }
}
