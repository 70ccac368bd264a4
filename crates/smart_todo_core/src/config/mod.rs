use crate::error::AppError;
use crate::storage::kv::app_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "SMART_TODO_CONFIG_PATH";

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Default,
    Noir,
    Solarized,
}

impl Theme {
    /// Loose name matching: case, punctuation and a few aliases are accepted.
    /// Unknown names fall back to the default theme.
    pub fn from_name(raw: &str) -> Self {
        let cleaned: String = raw
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .map(|ch| ch.to_ascii_lowercase())
            .collect();

        match cleaned.as_str() {
            "noir" | "dark" | "darkmode" => Self::Noir,
            "solarized" => Self::Solarized,
            _ => Self::Default,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Noir => "noir",
            Self::Solarized => "solarized",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Self::Noir => Palette {
                accent: "\x1b[38;5;141m",
                muted: "\x1b[38;5;244m",
                reset: "\x1b[0m",
            },
            Self::Solarized => Palette {
                accent: "\x1b[38;5;125m",
                muted: "\x1b[38;5;108m",
                reset: "\x1b[0m",
            },
            Self::Default => Palette {
                accent: "",
                muted: "",
                reset: "",
            },
        }
    }
}

/// ANSI colours for list output: accent marks assistant-added tasks, muted
/// marks completed ones.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn accentize(&self, text: &str) -> String {
        self.paint(self.accent, text)
    }

    pub fn mutedize(&self, text: &str) -> String {
        self.paint(self.muted, text)
    }

    fn paint(&self, colour: &str, text: &str) -> String {
        if colour.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", colour, text, self.reset)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Number of conversation messages forwarded with each request.
    pub history_limit: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl AssistantConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.endpoint.trim().is_empty() {
            return Err(AppError::invalid_data("assistant.endpoint must not be empty"));
        }
        if self.model.trim().is_empty() {
            return Err(AppError::invalid_data("assistant.model must not be empty"));
        }
        if self.max_tokens == 0 {
            return Err(AppError::invalid_data("assistant.max_tokens must be positive"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::invalid_data(
                "assistant.temperature must be between 0 and 2",
            ));
        }
        if self.history_limit == 0 {
            return Err(AppError::invalid_data(
                "assistant.history_limit must be positive",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

impl Config {
    pub fn theme(&self) -> Theme {
        self.theme.as_deref().map(Theme::from_name).unwrap_or(Theme::Default)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub history_limit: Option<usize>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    Ok(app_dir()?.join(CONFIG_FILE_NAME))
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
    let config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config.assistant.validate()?;
    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Result<Config, AppError> {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_ref() {
        merged.theme = Some(Theme::from_name(theme).name().to_string());
    }
    if let Some(endpoint) = overrides.endpoint.as_ref() {
        merged.assistant.endpoint = endpoint.clone();
    }
    if let Some(model) = overrides.model.as_ref() {
        merged.assistant.model = model.clone();
    }
    if let Some(max_tokens) = overrides.max_tokens {
        merged.assistant.max_tokens = max_tokens;
    }
    if let Some(temperature) = overrides.temperature {
        merged.assistant.temperature = temperature;
    }
    if let Some(history_limit) = overrides.history_limit {
        merged.assistant.history_limit = history_limit;
    }

    merged.assistant.validate()?;
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::{
        Config, ConfigOverrides, DEFAULT_HISTORY_LIMIT, DEFAULT_MODEL, Theme,
        load_config_from_path, load_config_with_fallback_from_path, merge_overrides,
    };
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("smart-todo-{nanos}-{file_name}"))
    }

    #[test]
    fn load_config_missing_returns_defaults_without_error() {
        let path = temp_path("missing-config.json");
        let result = load_config_with_fallback_from_path(&path);

        assert_eq!(result.config, Config::default());
        assert!(result.error.is_none());
        assert_eq!(result.config.assistant.model, DEFAULT_MODEL);
        assert_eq!(result.config.assistant.history_limit, DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn load_config_invalid_returns_defaults_and_error() {
        let path = temp_path("invalid-config.json");
        fs::write(&path, "{ invalid json ").unwrap();

        let result = load_config_with_fallback_from_path(&path);
        fs::remove_file(&path).ok();

        assert_eq!(result.config, Config::default());
        assert_eq!(result.error.map(|err| err.code()), Some("invalid_data"));
    }

    #[test]
    fn load_config_reads_partial_assistant_section() {
        let path = temp_path("valid-config.json");
        let content = serde_json::json!({
            "theme": "noir",
            "assistant": {
                "model": "gpt-4o-mini",
                "max_tokens": 256
            }
        });
        fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();

        let loaded = load_config_from_path(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.theme(), Theme::Noir);
        assert_eq!(loaded.assistant.model, "gpt-4o-mini");
        assert_eq!(loaded.assistant.max_tokens, 256);
        assert_eq!(loaded.assistant.history_limit, DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn load_config_rejects_out_of_range_temperature() {
        let path = temp_path("hot-config.json");
        fs::write(&path, r#"{"assistant":{"temperature":3.5}}"#).unwrap();

        let err = load_config_from_path(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert!(err.message().contains("temperature"));
    }

    #[test]
    fn merge_overrides_updates_only_given_fields() {
        let base = Config {
            theme: Some("default".into()),
            ..Config::default()
        };
        let overrides = ConfigOverrides {
            theme: Some("Dark-Mode".into()),
            model: Some("gpt-4o".into()),
            history_limit: Some(4),
            ..ConfigOverrides::default()
        };

        let merged = merge_overrides(&base, &overrides).unwrap();

        assert_eq!(merged.theme.as_deref(), Some("noir"));
        assert_eq!(merged.assistant.model, "gpt-4o");
        assert_eq!(merged.assistant.history_limit, 4);
        assert_eq!(merged.assistant.endpoint, base.assistant.endpoint);
        assert_eq!(base.assistant.model, DEFAULT_MODEL);
    }

    #[test]
    fn merge_overrides_with_empty_overrides_returns_clone() {
        let base = Config::default();
        let merged = merge_overrides(&base, &ConfigOverrides::default()).unwrap();

        assert_eq!(merged, base);
    }

    #[test]
    fn merge_overrides_rejects_zero_max_tokens() {
        let overrides = ConfigOverrides {
            max_tokens: Some(0),
            ..ConfigOverrides::default()
        };

        let err = merge_overrides(&Config::default(), &overrides).unwrap_err();
        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn theme_names_map_to_palettes() {
        assert_eq!(Theme::from_name("Vanilla"), Theme::Default);
        assert_eq!(Theme::from_name("NOIR"), Theme::Noir);
        assert_eq!(Theme::from_name("dark mode"), Theme::Noir);
        assert_eq!(Theme::from_name("Solarized"), Theme::Solarized);

        let plain = Theme::Default.palette();
        assert_eq!(plain.accentize("x"), "x");

        let noir = Theme::Noir.palette();
        assert_eq!(noir.mutedize("x"), "\x1b[38;5;244mx\x1b[0m");
    }
}
