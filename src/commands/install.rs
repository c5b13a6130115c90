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

use crate::config::MmConfig;
use crate::error::Result;
use crate::installer::Installer;
use colored::Colorize;
use log::{debug, info};
use std::path::Path;

pub struct InstallCommand<'a> {
    config: &'a MmConfig,
}

impl<'a> InstallCommand<'a> {
    pub fn new(config: &'a MmConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(
        &self,
        destination: Option<&Path>,
        release: &str,
        no_progress: bool,
        no_probe: bool,
    ) -> Result<()> {
        debug!(
            "Install options: destination={destination:?}, release={release}, \
             no_progress={no_progress}, no_probe={no_probe}"
        );

        let mut config = self.config.clone();
        config.download.no_progress |= no_progress;
        config.install.probe_version &= !no_probe;

        let installer = Installer::for_host(config)?;
        info!("Target platform: {}", installer.platform());

        let outcome = installer.install(destination, release)?;

        println!(
            "{} Installed Micro-Manager release {} into {}",
            "✓".green().bold(),
            outcome.release.bold(),
            outcome.destination.display()
        );
        if let Some(version) = outcome.version {
            println!("  Device interface version: {}", version.interface);
            println!("  Package version: {version}");
        }
        Ok(())
    }
}
