use crate::core::loader::SpinnerKind;
use crate::domain::{
    config::XtuiConfig,
    error::{XtuiError, XtuiResult},
};
use ratatui::style::Color;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const PROJECT_DIR: &str = ".xtui";
const CONFIG_FILE: &str = "config.toml";

const EXAMPLE_PROJECT_CONFIG: &str = r##"# xtui project configuration

[global]
log_level = "info"
tick_rate_ms = 100

[table]
# Rows per page; derived from the terminal when unset
# page_size = 20

[loader]
capacity = 64
max_messages = 100
delay_ms = 500
spinner = "dots"

[styles]
focused = "#01BE85"
header = "#01BE85"
selected = "#00432F"
"cell.residual" = "yellow"
"##;

/// Configuration manager
pub struct ConfigManager {
    global_config_path: PathBuf,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Global file under the user's config dir plus the nearest `.xtui/config.toml`
    pub fn new() -> XtuiResult<Self> {
        Ok(Self {
            global_config_path: Self::default_global_config_path()?,
            project_config_path: Self::find_project_config_path(),
        })
    }

    /// Use one explicit file and skip discovery
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: path.into(),
            project_config_path: None,
        }
    }

    pub fn from_paths(global: PathBuf, project: Option<PathBuf>) -> Self {
        Self {
            global_config_path: global,
            project_config_path: project,
        }
    }

    /// Defaults, then the global file, then the project file on top.
    pub fn load_config(&self) -> XtuiResult<XtuiConfig> {
        let mut merged = toml::Table::new();

        if self.global_config_path.exists() {
            merged = Self::read_table(&self.global_config_path)?;
            debug!(path = %self.global_config_path.display(), "Loaded global config");
        }

        if let Some(project_path) = &self.project_config_path {
            if project_path.exists() {
                let project = Self::read_table(project_path)?;
                merge_tables(&mut merged, project);
                debug!(path = %project_path.display(), "Merged project config");
            }
        }

        toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| XtuiError::Config {
                message: format!("Invalid configuration: {}", e),
            })
    }

    /// Problems that would make a setting fall back to its default
    pub fn validate(config: &XtuiConfig) -> Vec<String> {
        let mut issues = Vec::new();

        if SpinnerKind::from_str(&config.loader.spinner).is_err() {
            issues.push(format!("loader.spinner: unknown spinner '{}'", config.loader.spinner));
        }
        if config.loader.capacity == 0 {
            issues.push("loader.capacity: must be at least 1".to_string());
        }
        if config.loader.max_messages == 0 {
            issues.push("loader.max_messages: must be at least 1".to_string());
        }
        if config.table.page_size == Some(0) {
            issues.push("table.page_size: must be at least 1".to_string());
        }
        if config.global.tick_rate_ms == 0 {
            issues.push("global.tick_rate_ms: must be at least 1".to_string());
        }

        let mut keys: Vec<&String> = config.styles.keys().collect();
        keys.sort();
        for key in keys {
            let value = &config.styles[key];
            if Color::from_str(value).is_err() {
                issues.push(format!("styles.{}: invalid color '{}'", key, value));
            }
        }
        issues
    }

    fn default_global_config_path() -> XtuiResult<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| XtuiError::Config {
            message: "Could not determine home directory".to_string(),
        })?;

        Ok(home.join(".config").join("xtui").join(CONFIG_FILE))
    }

    /// Walk up from the working directory looking for `.xtui/config.toml`
    fn find_project_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut path = current_dir.as_path();

        loop {
            let config_path = path.join(PROJECT_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }

    fn read_table(path: &Path) -> XtuiResult<toml::Table> {
        let content = fs::read_to_string(path).map_err(|e| XtuiError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        content.parse::<toml::Table>().map_err(|e| XtuiError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    pub fn save_config_to_path(&self, path: &Path, config: &XtuiConfig) -> XtuiResult<()> {
        let content = toml::to_string_pretty(config).map_err(|e| XtuiError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| XtuiError::Config {
                message: format!("Failed to create config directory: {}", e),
            })?;
        }

        fs::write(path, content).map_err(|e| XtuiError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Write an example `.xtui/config.toml` under `path`
    pub fn init_project_config(&self, path: &Path) -> XtuiResult<PathBuf> {
        let config_dir = path.join(PROJECT_DIR);
        let config_file = config_dir.join(CONFIG_FILE);

        if config_file.exists() {
            return Err(XtuiError::Config {
                message: "Project configuration already exists".to_string(),
            });
        }

        fs::create_dir_all(&config_dir).map_err(|e| XtuiError::Config {
            message: format!("Failed to create {} directory: {}", PROJECT_DIR, e),
        })?;

        fs::write(&config_file, EXAMPLE_PROJECT_CONFIG).map_err(|e| XtuiError::Config {
            message: format!("Failed to write config file {}: {}", config_file.display(), e),
        })?;

        Ok(config_file)
    }

    pub fn project_config_path(&self) -> Option<&PathBuf> {
        self.project_config_path.as_ref()
    }

    pub fn global_config_path(&self) -> &PathBuf {
        &self.global_config_path
    }
}

/// Nested tables merge key by key; any other value in `overlay` replaces the base.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_files_give_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::from_paths(temp_dir.path().join("none.toml"), None);
        let config = manager.load_config().unwrap();

        assert_eq!(config.global.log_level, "info");
        assert_eq!(config.loader.max_messages, 100);
        assert!(config.styles.is_empty());
    }

    #[test]
    fn test_project_styles_merge_over_global() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        let project = temp_dir.path().join("project.toml");
        fs::write(
            &global,
            "[global]\nlog_level = \"debug\"\n[styles]\nheader = \"red\"\nborder = \"blue\"\n",
        )
        .unwrap();
        fs::write(&project, "[styles]\nheader = \"green\"\n[table]\npage_size = 7\n").unwrap();

        let manager = ConfigManager::from_paths(global, Some(project));
        let config = manager.load_config().unwrap();

        assert_eq!(config.global.log_level, "debug");
        assert_eq!(config.table.page_size, Some(7));
        assert_eq!(config.styles["header"], "green");
        assert_eq!(config.styles["border"], "blue");
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "[table\npage_size = ").unwrap();

        let err = ConfigManager::with_path(path).load_config().unwrap_err();
        assert!(matches!(err, XtuiError::Config { .. }));
    }

    #[test]
    fn test_init_project_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::from_paths(temp_dir.path().join("global.toml"), None);

        let config_file = manager.init_project_config(temp_dir.path()).unwrap();
        assert_eq!(config_file, temp_dir.path().join(".xtui").join("config.toml"));

        let config = ConfigManager::with_path(&config_file).load_config().unwrap();
        assert_eq!(config.loader.spinner, "dots");
        assert!(ConfigManager::validate(&config).is_empty());

        assert!(manager.init_project_config(temp_dir.path()).is_err());
    }

    #[test]
    fn test_validate_reports_bad_values() {
        let mut config = XtuiConfig::default();
        config.loader.spinner = "sparkle".to_string();
        config.styles.insert("header".to_string(), "not-a-color".to_string());
        config.table.page_size = Some(0);

        let issues = ConfigManager::validate(&config);
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().any(|i| i.starts_with("styles.header")));
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let manager = ConfigManager::with_path(&path);

        let mut config = XtuiConfig::default();
        config.table.page_size = Some(15);
        manager.save_config_to_path(&path, &config).unwrap();

        assert_eq!(manager.load_config().unwrap().table.page_size, Some(15));
    }
}
