use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub logbook: LogbookConfig,
    #[serde(default)]
    pub policies: PoliciesConfig,
}

impl CoreConfig {
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join("config.toml");
        let mut cfg = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            toml::from_str::<CoreConfig>(&text)
                .with_context(|| format!("parsing config file {}", path.display()))?
        } else {
            tracing::info!(
                "No config file found at {}. Using CoreConfig::default().",
                path.display()
            );
            CoreConfig::default()
        };
        cfg.resolve_paths(root);
        Ok(cfg)
    }

    fn resolve_paths(&mut self, root: &Path) {
        self.filter.path = absolutize(root, &self.filter.path);
        self.logbook.path = absolutize(root, &self.logbook.path);
        self.logbook.moderation = absolutize(root, &self.logbook.moderation);
    }

    /// Absolute path of the active catalog file.
    pub fn catalog_file(&self) -> PathBuf {
        self.filter.path.join(&self.filter.catalog)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "SystemConfig::default_name")]
    pub name: String,
    #[serde(default = "SystemConfig::default_version")]
    pub version: String,
}

impl SystemConfig {
    fn default_name() -> String {
        "serverdir".to_string()
    }

    fn default_version() -> String {
        "0.1.0".to_string()
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            version: Self::default_version(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "FilterConfig::default_path")]
    pub path: PathBuf,
    #[serde(default = "FilterConfig::default_catalog")]
    pub catalog: String,
    /// Restore the embedded catalog when the on-disk copy differs.
    #[serde(default = "FilterConfig::default_locked")]
    pub locked: bool,
}

impl FilterConfig {
    fn default_path() -> PathBuf {
        PathBuf::from("filter")
    }

    fn default_catalog() -> String {
        content_filter::assets::BANNED_TERMS_TOML_NAME.to_string()
    }

    fn default_locked() -> bool {
        true
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            catalog: Self::default_catalog(),
            locked: Self::default_locked(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogbookConfig {
    #[serde(default = "LogbookConfig::default_path")]
    pub path: PathBuf,
    #[serde(default = "LogbookConfig::default_moderation")]
    pub moderation: PathBuf,
}

impl LogbookConfig {
    fn default_path() -> PathBuf {
        PathBuf::from("logbook")
    }

    fn default_moderation() -> PathBuf {
        PathBuf::from("logbook/moderation.jsonl")
    }
}

impl Default for LogbookConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            moderation: Self::default_moderation(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoliciesConfig {
    #[serde(default = "PoliciesConfig::default_log_preview_len")]
    pub log_preview_len: usize,
    /// Also log accepted submissions, not just rejections.
    #[serde(default)]
    pub audit_accepted: bool,
}

impl PoliciesConfig {
    fn default_log_preview_len() -> usize {
        160
    }
}

impl Default for PoliciesConfig {
    fn default() -> Self {
        Self {
            log_preview_len: Self::default_log_preview_len(),
            audit_accepted: false,
        }
    }
}

fn absolutize(root: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        root.join(value)
    }
}
