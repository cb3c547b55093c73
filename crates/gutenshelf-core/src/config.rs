use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GutenshelfError, Result};

/// Root application configuration, loaded from `~/.config/gutenshelf/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub core: CoreConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Directory holding the catalog database.
    pub data_dir: String,
}

/// Settings for the remote catalog client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for CoreConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("gutenshelf");

        Self {
            data_dir: data_dir.to_string_lossy().to_string(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://gutendex.com".to_string(),
            timeout_secs: 30,
            user_agent: format!("gutenshelf/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/gutenshelf/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("GUTENSHELF_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("gutenshelf")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.catalog.base_url.trim().is_empty() {
            return Err(GutenshelfError::Config("catalog.base_url is empty".to_string()));
        }
        if self.catalog.timeout_secs == 0 {
            return Err(GutenshelfError::Config("catalog.timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Point the store somewhere else, e.g. from `GUTENSHELF_DATA_DIR`.
    pub fn set_data_dir(&mut self, dir: impl Into<String>) {
        self.core.data_dir = dir.into();
    }

    // ─── Derived paths ─────────────────────────────────────

    /// Path to the SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.core.data_dir).join("gutenshelf.db")
    }
}
