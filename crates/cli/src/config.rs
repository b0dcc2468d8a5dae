//! Settings file support.
//!
//! Values are merged from, highest precedence first: command-line flags,
//! environment variables (both handled by clap), the TOML settings file.
//! Anything still unset falls back to the built-in defaults in the core.

use std::path::{Path, PathBuf};

use sbxctl_types::APP_NAME;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::GlobalOpts;

const SETTINGS_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub auth_url: Option<String>,
    pub api_url: Option<String>,
    pub cache_dir: Option<PathBuf>,
}

impl Settings {
    /// Merge flags and environment over the settings file.
    ///
    /// An explicit `--config` path must exist; the default location is
    /// optional.
    pub fn resolve(opts: &GlobalOpts) -> Result<Self, String> {
        let file = match &opts.config {
            Some(path) => Self::load(path)?,
            None => match default_path() {
                Some(path) if path.exists() => Self::load(&path)?,
                _ => Settings::default(),
            },
        };
        Ok(file.overlay(Self::from_opts(opts)))
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings file {}: {}", path.display(), e))?;
        let settings = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse settings file {}: {}", path.display(), e))?;
        debug!(path = %path.display(), "Loaded settings file");
        Ok(settings)
    }

    fn from_opts(opts: &GlobalOpts) -> Self {
        Settings {
            client_id: opts.client_id.clone(),
            client_secret: opts.client_secret.clone(),
            auth_url: opts.auth_url.clone(),
            api_url: opts.api_url.clone(),
            cache_dir: opts.cache_dir.clone(),
        }
    }

    /// Values set in `higher` win over ours
    pub fn overlay(self, higher: Settings) -> Settings {
        Settings {
            client_id: higher.client_id.or(self.client_id),
            client_secret: higher.client_secret.or(self.client_secret),
            auth_url: higher.auth_url.or(self.auth_url),
            api_url: higher.api_url.or(self.api_url),
            cache_dir: higher.cache_dir.or(self.cache_dir),
        }
    }
}

/// `<config dir>/sbxctl/config.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(SETTINGS_FILE))
}
