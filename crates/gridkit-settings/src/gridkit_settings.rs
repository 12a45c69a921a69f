//! gridkit Settings System
//!
//! Provides host settings with persistence, including:
//! - Column-definition service endpoint and request timeout
//! - Grid defaults (page sizes, double-click window, record dialog mode,
//!   row-number and checkbox columns)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod settings_file;

pub use settings_file::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GridSettings {
    pub service: ServiceSettings,
    pub grid: GridDefaults,
}

impl GridSettings {
    /// Load from the user config dir; a missing file yields defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = ?path, "No settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        serde_json::from_str(&content).with_context(|| "Failed to parse settings JSON")
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn settings_path() -> Result<PathBuf> {
        Ok(config_dir()?.join("settings.json"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// API root; the column-definition resource lives at `<base_url>/col-def`
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ServiceSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridDefaults {
    pub double_click_window_ms: u64,
    pub default_page_size: usize,
    pub page_size_options: Vec<usize>,
    /// Double-click opens the record dialog instead of inline editing
    pub record_dialog_mode: bool,
    pub show_row_number: bool,
    pub show_checkbox: bool,
}

impl Default for GridDefaults {
    fn default() -> Self {
        Self {
            double_click_window_ms: 200,
            default_page_size: 20,
            page_size_options: vec![10, 20, 50, 100],
            record_dialog_mode: false,
            show_row_number: true,
            show_checkbox: false,
        }
    }
}

impl GridDefaults {
    pub fn double_click_window(&self) -> Duration {
        Duration::from_millis(self.double_click_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = GridSettings::load_from(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, GridSettings::default());
        assert_eq!(settings.grid.double_click_window(), Duration::from_millis(200));
    }

    #[test]
    fn test_save_creates_parent_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = GridSettings::default();
        settings.service.base_url = "https://example.test/api".to_string();
        settings.grid.record_dialog_mode = true;
        settings.save_to(&path).unwrap();

        assert_eq!(GridSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_fills_missing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"grid": {"default_page_size": 50}}"#).unwrap();

        let settings = GridSettings::load_from(&path).unwrap();
        assert_eq!(settings.grid.default_page_size, 50);
        assert_eq!(settings.grid.page_size_options, vec![10, 20, 50, 100]);
        assert_eq!(settings.service, ServiceSettings::default());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(GridSettings::load_from(&path).is_err());
    }
}
