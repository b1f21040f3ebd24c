use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const CONFIG_FILE_NAME: &str = "config.json";
const DEFAULT_EXECUTABLE: &str = "p4";
const DEFAULT_GRAPHICAL_DIFF: &str = "p4diff -l %depofile_name -e %file_path %depofile_path";

/// Settings shared by every component. Built once per process and passed
/// down explicitly; nothing reads process-wide state after `load`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub p4_executable: String,
    pub warnings_enabled: bool,
    pub log_warnings_to_status: bool,
    pub end_line_separator: String,
    pub auto_checkout: bool,
    pub auto_checkout_on_modified: bool,
    pub auto_checkout_on_save: bool,
    pub auto_add: bool,
    pub graphical_diff_command: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            p4_executable: DEFAULT_EXECUTABLE.to_string(),
            warnings_enabled: true,
            log_warnings_to_status: false,
            end_line_separator: "\n".to_string(),
            auto_checkout: true,
            auto_checkout_on_modified: true,
            auto_checkout_on_save: true,
            auto_add: true,
            graphical_diff_command: DEFAULT_GRAPHICAL_DIFF.to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        let stored = StoredConfig::load()?;
        let mut config = Self::from_stored(&stored);

        if let Ok(executable) = env::var("P4EDIT_P4") {
            if !executable.trim().is_empty() {
                config.p4_executable = executable.trim().to_string();
            }
        }
        if let Ok(flag) = env::var("P4EDIT_WARNINGS") {
            config.warnings_enabled = parse_flag(&flag).unwrap_or(config.warnings_enabled);
        }

        Ok(config)
    }

    pub fn from_stored(stored: &StoredConfig) -> Self {
        let defaults = Self::default();
        Self {
            p4_executable: stored
                .p4_executable
                .clone()
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(defaults.p4_executable),
            warnings_enabled: stored.warnings_enabled.unwrap_or(defaults.warnings_enabled),
            log_warnings_to_status: stored
                .log_warnings_to_status
                .unwrap_or(defaults.log_warnings_to_status),
            end_line_separator: stored
                .end_line_separator
                .as_deref()
                .map(unescape_separator)
                .unwrap_or(defaults.end_line_separator),
            auto_checkout: stored.auto_checkout.unwrap_or(defaults.auto_checkout),
            auto_checkout_on_modified: stored
                .auto_checkout_on_modified
                .unwrap_or(defaults.auto_checkout_on_modified),
            auto_checkout_on_save: stored
                .auto_checkout_on_save
                .unwrap_or(defaults.auto_checkout_on_save),
            auto_add: stored.auto_add.unwrap_or(defaults.auto_add),
            graphical_diff_command: stored
                .graphical_diff_command
                .clone()
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(defaults.graphical_diff_command),
        }
    }
}

/// On-disk form of the configuration. Every field is optional so a partial
/// file falls back to defaults field by field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredConfig {
    pub p4_executable: Option<String>,
    pub warnings_enabled: Option<bool>,
    pub log_warnings_to_status: Option<bool>,
    pub end_line_separator: Option<String>,
    pub auto_checkout: Option<bool>,
    pub auto_checkout_on_modified: Option<bool>,
    pub auto_checkout_on_save: Option<bool>,
    pub auto_add: Option<bool>,
    pub graphical_diff_command: Option<String>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        let path = config_file_path()?;
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|err| AppError::Configuration(format!("invalid config file: {err}"))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        let path = config_file_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(&path, data)?;
        Ok(())
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    if let Ok(dir) = env::var("P4EDIT_CONFIG_DIR") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    if let Ok(appdata) = env::var("APPDATA") {
        return Ok(PathBuf::from(appdata).join("p4edit"));
    }
    let home = env::var("HOME").map_err(|_| {
        AppError::Configuration("cannot locate a config directory: HOME is not set".to_string())
    })?;
    Ok(PathBuf::from(home).join(".config").join("p4edit"))
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}

pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// The separator is typed by hand in the wizard, so `\r\n` arrives as four
/// literal characters.
fn unescape_separator(raw: &str) -> String {
    raw.replace("\\r", "\r").replace("\\n", "\n")
}
