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
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operating systems for which upstream publishes installers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetPlatform {
    Windows,
    #[serde(alias = "mac", alias = "darwin")]
    MacOs,
}

impl TargetPlatform {
    /// Map an (os, arch) pair as reported by `std::env::consts` to a target.
    ///
    /// Apple Silicon is rejected: upstream nightlies ship x86_64 adapters only.
    pub fn from_os_arch(os: &str, arch: &str) -> Result<Self> {
        match (os, arch) {
            ("windows", _) => Ok(TargetPlatform::Windows),
            ("macos", "aarch64") => Err(unsupported(os, arch)),
            ("macos", _) => Ok(TargetPlatform::MacOs),
            _ => Err(unsupported(os, arch)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TargetPlatform::Windows => "windows",
            TargetPlatform::MacOs => "macos",
        }
    }

    /// Directory name of this platform's listing under the nightly channel.
    pub fn listing_dir(&self) -> &'static str {
        match self {
            TargetPlatform::Windows => "Windows",
            TargetPlatform::MacOs => "Mac",
        }
    }

    /// Separator preceding the release identifier in installer file names.
    ///
    /// `MMSetup_64bit_2.0.3_20240501.exe` vs `Micro-Manager-2.0.3-20240501.dmg`.
    pub fn identifier_delimiter(&self) -> char {
        match self {
            TargetPlatform::Windows => '_',
            TargetPlatform::MacOs => '-',
        }
    }

    /// Path of the always-current installer, relative to the download host.
    pub fn direct_latest_path(&self) -> &'static str {
        match self {
            TargetPlatform::Windows => "latest/windows/MMSetup_x64_latest.exe",
            TargetPlatform::MacOs => "latest/macos/Micro-Manager-x86_64-latest.dmg",
        }
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetPlatform {
    type Err = MmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "windows" | "win" => Ok(TargetPlatform::Windows),
            "macos" | "mac" | "darwin" => Ok(TargetPlatform::MacOs),
            other => Err(MmError::ValidationError(format!(
                "Unknown platform '{other}'. Expected 'windows' or 'macos'"
            ))),
        }
    }
}

/// Detect the platform this process runs on.
pub fn detect_host_platform() -> Result<TargetPlatform> {
    let platform = TargetPlatform::from_os_arch(std::env::consts::OS, std::env::consts::ARCH)?;
    log::debug!(
        "Detected host platform {platform} ({}/{})",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    Ok(platform)
}

fn unsupported(os: &str, arch: &str) -> MmError {
    MmError::UnsupportedPlatform {
        os: os.to_string(),
        arch: arch.to_string(),
    }
}
