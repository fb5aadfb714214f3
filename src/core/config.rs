use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CategoryConfig {
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExpenseConfig {
    pub category: String,
    pub amount: f64,
    pub currency: Option<String>,
    pub month: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IncomeConfig {
    pub name: String,
    pub category: Option<String>,
    pub amount: f64,
    pub currency: Option<String>,
    pub month: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
}

impl ProviderConfig {
    fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    #[serde(default = "default_exchangerate_host")]
    pub exchangerate_host: ProviderConfig,
    #[serde(default = "default_open_er_api")]
    pub open_er_api: ProviderConfig,
    #[serde(default = "default_frankfurter")]
    pub frankfurter: ProviderConfig,
}

fn default_exchangerate_host() -> ProviderConfig {
    ProviderConfig::new("https://api.exchangerate.host")
}

fn default_open_er_api() -> ProviderConfig {
    ProviderConfig::new("https://open.er-api.com")
}

fn default_frankfurter() -> ProviderConfig {
    ProviderConfig::new("https://api.frankfurter.app")
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            exchangerate_host: default_exchangerate_host(),
            open_er_api: default_open_er_api(),
            frankfurter: default_frankfurter(),
        }
    }
}

fn default_currency() -> String {
    crate::core::currency::DEFAULT_BASE_CODE.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Base currency used until one is chosen with `brational base`.
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub data_path: Option<String>,
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
    #[serde(default)]
    pub expenses: Vec<ExpenseConfig>,
    #[serde(default)]
    pub incomes: Vec<IncomeConfig>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("app", "brational", "brational")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("app", "brational", "brational")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
