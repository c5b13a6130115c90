// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{MmError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const HOME_ENV_VAR: &str = "MMFETCH_HOME";
const ENV_PREFIX: &str = "MMFETCH";

const DEFAULT_BASE_URL: &str = "https://download.micro-manager.org";
const DEFAULT_CHANNEL_PATH: &str = "nightly/2.0";
const DEFAULT_PREVIEW_COUNT: usize = 30;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MmConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub download: DownloadConfig,

    #[serde(default)]
    pub install: InstallConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_channel_path")]
    pub channel_path: String,

    /// How many identifiers a "release not found" error shows.
    #[serde(default = "default_preview_count")]
    pub preview_count: usize,

    #[serde(default)]
    pub latest_source: LatestSource,
}

/// Where the `latest` release token is resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LatestSource {
    /// Newest identifier in the nightly listing.
    #[default]
    Catalog,
    /// Fixed always-current installer URL; no listing fetch.
    Direct,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DownloadConfig {
    /// Unset means requests never time out.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub no_progress: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    #[serde(default)]
    pub destination: Option<PathBuf>,

    #[serde(default)]
    pub windows_layout: WindowsLayout,

    #[serde(default = "default_true")]
    pub probe_version: bool,
}

/// How the Windows installer output is reduced to the library set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WindowsLayout {
    /// Install straight into the destination, then delete everything else.
    #[default]
    Prune,
    /// Install into scratch space and copy the curated subset across.
    Copy,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            channel_path: default_channel_path(),
            preview_count: DEFAULT_PREVIEW_COUNT,
            latest_source: LatestSource::default(),
        }
    }
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            destination: None,
            windows_layout: WindowsLayout::default(),
            probe_version: true,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_channel_path() -> String {
    DEFAULT_CHANNEL_PATH.to_string()
}

fn default_preview_count() -> usize {
    DEFAULT_PREVIEW_COUNT
}

fn default_true() -> bool {
    true
}

impl CatalogConfig {
    pub fn base_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            MmError::InvalidConfig(format!("catalog.base_url '{}': {e}", self.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(MmError::InvalidConfig(format!(
                "catalog.base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        // Ensure joins append instead of replacing the last segment
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

impl DownloadConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl MmConfig {
    /// Load configuration from `home/config.toml` and `MMFETCH_*` variables.
    pub fn load(mmfetch_home: &Path) -> Result<Self> {
        let config_path = mmfetch_home.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            log::debug!("Loading config from {config_path:?}");
        } else {
            log::debug!("Config file not found at {config_path:?}, using defaults");
        }

        let settings = Config::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| MmError::ConfigError(format!("Failed to load configuration: {e}")))?;

        let config: MmConfig = settings
            .try_deserialize()
            .map_err(|e| MmError::ConfigError(format!("Failed to parse configuration: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.catalog.base_url()?;

        if self.catalog.preview_count == 0 {
            return Err(MmError::InvalidConfig(
                "catalog.preview_count must be at least 1".to_string(),
            ));
        }

        if self.catalog.channel_path.trim_matches('/').is_empty() {
            return Err(MmError::InvalidConfig(
                "catalog.channel_path must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Destination used when the caller does not name one.
    pub fn default_destination(&self) -> Result<PathBuf> {
        if let Some(destination) = &self.install.destination {
            return Ok(destination.clone());
        }

        dirs::data_local_dir()
            .map(|dir| dir.join("mmfetch").join("libs"))
            .ok_or_else(|| {
                MmError::ConfigError(
                    "Could not determine a default destination; pass one explicitly".to_string(),
                )
            })
    }
}

/// Directory holding `config.toml`: `$MMFETCH_HOME`, else `~/.mmfetch`.
pub fn mmfetch_home() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV_VAR) {
        return Ok(PathBuf::from(home));
    }

    dirs::home_dir()
        .map(|home| home.join(".mmfetch"))
        .ok_or_else(|| MmError::ConfigError("Could not determine home directory".to_string()))
}

/// Load the configuration for this process.
pub fn new_mm_config() -> Result<MmConfig> {
    MmConfig::load(&mmfetch_home()?)
}
