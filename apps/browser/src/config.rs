use std::{
    fs, io,
    path::{Path, PathBuf},
};

use catalog_core::DEFAULT_API_ROOT;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const SETTINGS_FILE: &str = "browser.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserSettings {
    pub api_root: String,
    /// Pages requested after the first one before any search runs.
    pub page_budget: u32,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.into(),
            page_budget: 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid settings file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid api root '{value}': {reason}")]
    InvalidApiRoot { value: String, reason: String },
    #[error("invalid page budget '{value}'")]
    InvalidPageBudget { value: String },
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_root: Option<String>,
    page_budget: Option<u32>,
}

pub fn load_settings() -> Result<BrowserSettings, SettingsError> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Layers defaults, the optional settings file, then environment variables.
/// A missing file is not an error; an unreadable or malformed one is.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<BrowserSettings, SettingsError> {
    let mut settings = BrowserSettings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings =
                toml::from_str(&raw).map_err(|source| SettingsError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
            if let Some(v) = file_cfg.api_root {
                settings.api_root = v;
            }
            if let Some(v) = file_cfg.page_budget {
                settings.page_budget = v;
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    if let Some(v) = env("CATALOG_API_ROOT") {
        settings.api_root = v;
    }
    if let Some(v) = env("APP__API_ROOT") {
        settings.api_root = v;
    }

    if let Some(v) = env("APP__PAGE_BUDGET") {
        settings.page_budget = v
            .trim()
            .parse()
            .map_err(|_| SettingsError::InvalidPageBudget { value: v.clone() })?;
    }

    settings.api_root = normalize_api_root(&settings.api_root)?;
    Ok(settings)
}

pub fn normalize_api_root(raw: &str) -> Result<String, SettingsError> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|err| SettingsError::InvalidApiRoot {
        value: raw.to_string(),
        reason: err.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SettingsError::InvalidApiRoot {
            value: raw.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
