use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// xtui configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XtuiConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Table screen settings
    #[serde(default)]
    pub table: TableConfig,
    /// Loader screen settings
    #[serde(default)]
    pub loader: LoaderConfig,
    /// Style overrides, keyed by theme slot (`focused`, `header`, `cell.<value>`, ...)
    #[serde(default)]
    pub styles: HashMap<String, String>,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Render loop tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Directory for table exports (current directory when unset)
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
}

/// Table screen configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableConfig {
    /// Rows per page; derived from the terminal when unset
    #[serde(default)]
    pub page_size: Option<usize>,
}

/// Loader screen configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Message queue capacity
    #[serde(default = "default_loader_capacity")]
    pub capacity: usize,
    /// Maximum number of messages kept on screen
    #[serde(default = "default_loader_max_messages")]
    pub max_messages: usize,
    /// Delay between scripted messages in milliseconds
    #[serde(default = "default_loader_delay")]
    pub delay_ms: u64,
    /// Spinner frame set
    #[serde(default = "default_spinner")]
    pub spinner: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_tick_rate() -> u64 {
    100
}

fn default_loader_capacity() -> usize {
    64
}

fn default_loader_max_messages() -> usize {
    100
}

fn default_loader_delay() -> u64 {
    500
}

fn default_spinner() -> String {
    "dots".to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            tick_rate_ms: default_tick_rate(),
            export_dir: None,
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            capacity: default_loader_capacity(),
            max_messages: default_loader_max_messages(),
            delay_ms: default_loader_delay(),
            spinner: default_spinner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = XtuiConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: XtuiConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized.global.tick_rate_ms, 100);
        assert_eq!(deserialized.loader.max_messages, 100);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: XtuiConfig = toml::from_str(
            r##"
            [table]
            page_size = 5

            [styles]
            header = "#01BE85"
            "##,
        )
        .unwrap();

        assert_eq!(config.table.page_size, Some(5));
        assert_eq!(config.global.log_level, "info");
        assert_eq!(config.loader.spinner, "dots");
        assert_eq!(config.styles.get("header").map(String::as_str), Some("#01BE85"));
    }

    #[test]
    fn test_empty_config() {
        let config: XtuiConfig = toml::from_str("").unwrap();
        assert!(config.styles.is_empty());
        assert!(config.global.export_dir.is_none());
        assert_eq!(config.loader.capacity, 64);
    }
}
