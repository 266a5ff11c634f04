use crate::error::AppError;
use crate::task_api::Timings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TASKLIST_CONFIG_PATH";
const APP_DIR_NAME: &str = "tasklist";

pub const DEFAULT_REMOVAL_DELAY_MS: u64 = 300;
pub const DEFAULT_ERROR_VISIBLE_MS: u64 = 1500;

#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub strike: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn accentize(&self, text: &str) -> String {
        wrap(self.accent, text, self.reset)
    }

    pub fn mutedize(&self, text: &str) -> String {
        wrap(self.muted, text, self.reset)
    }

    /// Finished tasks are drawn struck through.
    pub fn strike(&self, text: &str) -> String {
        wrap(self.strike, text, self.reset)
    }
}

fn wrap(style: &str, text: &str, reset: &str) -> String {
    if style.is_empty() {
        text.to_string()
    } else {
        format!("{style}{text}{reset}")
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.and_then(canonical_theme_name).as_deref() {
        Some("noir") => Palette {
            accent: "\x1b[38;5;208m",
            muted: "\x1b[38;5;250m",
            strike: "\x1b[9;38;5;244m",
            reset: "\x1b[0m",
        },
        Some("solarized") => Palette {
            accent: "\x1b[38;5;108m",
            muted: "\x1b[38;5;250m",
            strike: "\x1b[9;38;5;246m",
            reset: "\x1b[0m",
        },
        _ => Palette {
            accent: "",
            muted: "",
            strike: "",
            reset: "",
        },
    }
}

pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let cleaned = canonicalize_name(raw);
    if cleaned.is_empty() {
        return Some("default".into());
    }

    match cleaned.as_str() {
        "vanilla" | "light" => Some("default".to_string()),
        "dark" | "dark_mode" | "darkmode" => Some("noir".to_string()),
        other => Some(other.to_string()),
    }
}

/// Lowercases ASCII alphanumerics and collapses every other run of
/// characters into a single underscore.
pub fn canonicalize_name(raw: &str) -> String {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    cleaned.trim_matches('_').to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default = "default_removal_delay_ms")]
    pub removal_delay_ms: u64,
    #[serde(default = "default_error_visible_ms")]
    pub error_visible_ms: u64,
    #[serde(default)]
    pub desktop_notifications: bool,
}

fn default_removal_delay_ms() -> u64 {
    DEFAULT_REMOVAL_DELAY_MS
}

fn default_error_visible_ms() -> u64 {
    DEFAULT_ERROR_VISIBLE_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: None,
            removal_delay_ms: DEFAULT_REMOVAL_DELAY_MS,
            error_visible_ms: DEFAULT_ERROR_VISIBLE_MS,
            desktop_notifications: false,
        }
    }
}

impl Config {
    pub fn timings(&self) -> Timings {
        Timings {
            removal_delay: Duration::from_millis(self.removal_delay_ms),
            error_visible: Duration::from_millis(self.error_visible_ms),
        }
    }

    pub fn palette(&self) -> Palette {
        palette_for_theme(self.theme.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub removal_delay_ms: Option<u64>,
    pub error_visible_ms: Option<u64>,
    pub desktop_notifications: Option<bool>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    app_file(CONFIG_ENV_VAR, CONFIG_FILE_NAME)
}

/// Resolves a file in the per-user application directory. A non-blank
/// `env_var` replaces the whole path.
pub(crate) fn app_file(env_var: &str, file_name: &str) -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(env_var)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    let base = if cfg!(windows) {
        std::env::var("APPDATA")
            .map(PathBuf::from)
            .map_err(|_| AppError::invalid_data("APPDATA is not set"))?
    } else {
        std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".config"))
            .map_err(|_| AppError::invalid_data("HOME is not set"))?
    };
    Ok(base.join(APP_DIR_NAME).join(file_name))
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let mut config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config.theme = config.theme.and_then(|name| canonical_theme_name(&name));
    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(normalized) = overrides.theme.as_deref().and_then(canonical_theme_name) {
        merged.theme = Some(normalized);
    }
    if let Some(delay) = overrides.removal_delay_ms {
        merged.removal_delay_ms = delay;
    }
    if let Some(visible) = overrides.error_visible_ms {
        merged.error_visible_ms = visible;
    }
    if let Some(enabled) = overrides.desktop_notifications {
        merged.desktop_notifications = enabled;
    }

    merged
}
