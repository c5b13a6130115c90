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

//! Resolve, download, install and probe: one installation run end to end.

pub mod macos;
pub mod windows;

use crate::catalog::{CatalogCache, LATEST, ReleaseResolver, ResolvedRelease};
use crate::config::MmConfig;
use crate::download::{DownloadOptions, fetch_artifact};
use crate::error::{MmError, Result};
use crate::platform::{CommandRunner, SystemCommandRunner, TargetPlatform, detect_host_platform};
use crate::probe::{EntryPointLoader, NativeLoader, probe_interface_version};
use crate::version::VersionLabel;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// What an installation run produced.
#[derive(Debug, Clone, Serialize)]
pub struct InstallOutcome {
    pub destination: PathBuf,
    /// Concrete release installed; `latest` only for direct downloads.
    pub release: String,
    pub url: String,
    /// `None` when probing was disabled.
    pub version: Option<VersionLabel>,
}

impl InstallOutcome {
    /// Version label as text, empty when probing was disabled.
    pub fn version_string(&self) -> String {
        self.version.map(|v| v.to_string()).unwrap_or_default()
    }
}

pub struct Installer {
    config: MmConfig,
    platform: TargetPlatform,
    resolver: ReleaseResolver,
    runner: Box<dyn CommandRunner>,
    loader: Box<dyn EntryPointLoader>,
}

impl Installer {
    /// Installer for the platform this process runs on.
    pub fn for_host(config: MmConfig) -> Result<Self> {
        let platform = detect_host_platform()?;
        Self::new(config, platform)
    }

    pub fn new(config: MmConfig, platform: TargetPlatform) -> Result<Self> {
        let resolver = ReleaseResolver::new(&config.catalog, platform)?;
        Ok(Self {
            config,
            platform,
            resolver,
            runner: Box::new(SystemCommandRunner),
            loader: Box::new(NativeLoader),
        })
    }

    pub fn with_runner(mut self, runner: Box<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_loader(mut self, loader: Box<dyn EntryPointLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn platform(&self) -> TargetPlatform {
        self.platform
    }

    /// Resolve releases through `cache` instead of the process-wide one.
    pub fn with_catalog_cache(mut self, cache: CatalogCache) -> Self {
        self.resolver = self.resolver.with_cache(cache);
        self
    }

    /// Install `release` into `destination`, or into the configured default.
    pub fn install(&self, destination: Option<&Path>, release: &str) -> Result<InstallOutcome> {
        let ResolvedRelease { token, url } = self.resolver.resolve(release)?;
        let destination = self.resolve_destination(destination)?;
        log::info!(
            "Installing {} release {token} into {}",
            self.platform,
            destination.display()
        );

        let options = DownloadOptions {
            no_progress: self.config.download.no_progress,
            timeout: self.config.download.timeout(),
        };
        let download = fetch_artifact(&url, &options)?;

        match self.platform {
            TargetPlatform::Windows => windows::install_windows(
                self.runner.as_ref(),
                download.path(),
                &destination,
                self.config.install.windows_layout,
            )?,
            TargetPlatform::MacOs => {
                macos::install_macos(self.runner.as_ref(), download.path(), &destination)?
            }
        }
        // The installer is no longer needed once its contents are in place
        drop(download);

        let version = if self.config.install.probe_version {
            let interface = probe_interface_version(self.loader.as_ref(), &destination)?;
            Some(VersionLabel::new(interface, &token))
        } else {
            None
        };

        Ok(InstallOutcome {
            destination,
            release: token,
            url,
            version,
        })
    }

    fn resolve_destination(&self, destination: Option<&Path>) -> Result<PathBuf> {
        let destination = match destination {
            Some(path) => path.to_path_buf(),
            None => self.config.default_destination()?,
        };
        normalize_destination(&destination)
    }
}

/// Expand a leading `~` and make the path absolute.
pub fn normalize_destination(path: &Path) -> Result<PathBuf> {
    let expanded = match path.components().next() {
        Some(Component::Normal(first)) if first == "~" => {
            let home = dirs::home_dir().ok_or_else(|| {
                MmError::ConfigError("Could not determine home directory".to_string())
            })?;
            home.join(path.components().skip(1).collect::<PathBuf>())
        }
        _ => path.to_path_buf(),
    };

    Ok(std::path::absolute(expanded)?)
}

/// Install `release` for the host platform with the process configuration.
///
/// Returns the version label and the release that was installed.
pub fn install(destination: Option<&Path>, release: &str) -> Result<(String, String)> {
    let config = crate::config::new_mm_config()?;
    let outcome = Installer::for_host(config)?.install(destination, release)?;
    Ok((outcome.version_string(), outcome.release))
}

/// [`install`] of the most recent release.
pub fn install_latest(destination: Option<&Path>) -> Result<(String, String)> {
    install(destination, LATEST)
}
