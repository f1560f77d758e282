use serde::Deserialize;
use std::{fs, path::Path};

use crate::errors::AppError;

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct LlmConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct OutputConfig {
    pub sheet_name: String,
    pub code_header: String,
    pub description_header: String,
    /// Written in place of the translation when a row fails.
    pub placeholder: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sheet_name: "TranslateToTurkishFromEnglish".to_string(),
            code_header: "Urun Kodu".to_string(),
            description_header: "Turkce Urun Aciklamasi".to_string(),
            placeholder: "Error".to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&content).map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Picks the key from the flag/env value first, then the config file.
    pub fn resolve_api_key(&self, cli_key: Option<String>) -> Option<String> {
        cli_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.llm.api_key.clone())
    }
}
