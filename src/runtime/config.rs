//! Worker scheduler configuration.
//!
//! Settings can be built in code or, with the `config-file` feature, loaded
//! from TOML:
//!
//! ```toml
//! thread_name = "pledge-worker"
//! stack_size = 262144
//! ```

use serde::{Deserialize, Serialize};

#[cfg(feature = "config-file")]
use crate::error::SchedulerError;
#[cfg(feature = "config-file")]
use std::path::Path;

/// Default worker thread name.
pub const DEFAULT_THREAD_NAME: &str = "pledge-worker";

/// Settings for a [`WorkerScheduler`](crate::runtime::WorkerScheduler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Name given to the worker thread.
    pub thread_name: String,
    /// Stack size for the worker thread, in bytes. `None` uses the platform default.
    pub stack_size: Option<usize>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            stack_size: None,
        }
    }
}

impl WorkerConfig {
    /// Sets the worker thread name.
    #[must_use]
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Sets the worker thread stack size.
    #[must_use]
    pub const fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Parses a configuration from TOML text.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(text: &str) -> Result<Self, SchedulerError> {
        toml::from_str(text).map_err(|e| SchedulerError::Config(e.to_string()))
    }

    /// Loads a configuration from a TOML file.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, SchedulerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SchedulerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = WorkerConfig::default();
        assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);
        assert_eq!(config.stack_size, None);
    }

    #[test]
    fn builder_methods() {
        let config = WorkerConfig::default()
            .thread_name("reactions")
            .stack_size(128 * 1024);
        assert_eq!(config.thread_name, "reactions");
        assert_eq!(config.stack_size, Some(128 * 1024));
    }

    #[test]
    fn deserialize_fills_missing_fields_with_defaults() {
        let config: WorkerConfig = toml::from_str("stack_size = 65536").expect("valid toml");
        assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);
        assert_eq!(config.stack_size, Some(65536));

        let text = toml::to_string(&config).expect("serialize");
        let parsed: WorkerConfig = toml::from_str(&text).expect("round trip");
        assert_eq!(parsed, config);
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn from_toml_file_reports_bad_input() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "thread_name = 5").expect("write");
        let err = WorkerConfig::from_toml_file(file.path()).expect_err("type mismatch");
        assert!(matches!(err, SchedulerError::Config(_)), "{err}");

        let missing = WorkerConfig::from_toml_file("/definitely/not/here.toml");
        assert!(missing.is_err());
    }
}
