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

use crate::error::MmError;
use std::fmt;

pub const ISSUE_TRACKER_URL: &str = "https://github.com/pymmcore-plus/pymmcore-plus/issues/new";

pub struct ErrorContext<'a> {
    pub error: &'a MmError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl<'a> ErrorContext<'a> {
    pub fn new(error: &'a MmError) -> Self {
        let (suggestion, details) = match error {
            MmError::UnsupportedPlatform { .. } => {
                let suggestion = Some(
                    "Micro-Manager nightly builds are only published for Windows and Intel \
                     macOS. Use 'mmfetch releases --platform <windows|macos>' to browse other \
                     platforms' catalogs."
                        .to_string(),
                );
                (suggestion, None)
            }
            MmError::CatalogFetch(msg) => {
                let suggestion = Some(
                    "Check your internet connection and the 'catalog.base_url' setting, then try \
                     again."
                        .to_string(),
                );
                let details = Some(format!("Catalog retrieval failed: {msg}"));
                (suggestion, details)
            }
            MmError::ReleaseNotFound { .. } => {
                let suggestion = Some(
                    "Run 'mmfetch releases' to see every available release, or pass \
                     '--release latest'."
                        .to_string(),
                );
                (suggestion, None)
            }
            MmError::Download(msg) => {
                let suggestion = Some(
                    "Check your internet connection and try again. Set \
                     MMFETCH_DOWNLOAD__TIMEOUT_SECS to bound slow transfers."
                        .to_string(),
                );
                let details = Some(format!("Download failed: {msg}"));
                (suggestion, details)
            }
            MmError::Subprocess { stderr, .. } => {
                let details = if stderr.trim().is_empty() {
                    None
                } else {
                    Some(stderr.trim().to_string())
                };
                (None, details)
            }
            MmError::CommandSpawn { command, .. } => {
                let suggestion = Some(format!(
                    "Ensure '{command}' is installed and available on PATH."
                ));
                (suggestion, None)
            }
            MmError::Mount { .. } => {
                let suggestion = Some(
                    "The disk image may be corrupt or already mounted. Eject any mounted \
                     Micro-Manager volume and try again."
                        .to_string(),
                );
                (suggestion, None)
            }
            MmError::VendorBundleNotFound(_) => {
                let suggestion = Some(format!("Please report this at {ISSUE_TRACKER_URL}"));
                (suggestion, None)
            }
            MmError::NoInterfaceLibrary { directory, .. } => {
                let suggestion = Some(
                    "Make sure the directory is an mmfetch destination containing the installed \
                     device adapters."
                        .to_string(),
                );
                let details = Some(format!("Searched: {directory}"));
                (suggestion, details)
            }
            MmError::LibraryLoad { .. } | MmError::EntryPointMissing { .. } => {
                let suggestion = Some(format!(
                    "The installed adapters may not match this architecture. If the problem \
                     persists, please report it at {ISSUE_TRACKER_URL}"
                ));
                (suggestion, None)
            }
            MmError::InvalidConfig(_) | MmError::ConfigError(_) => {
                let suggestion = Some(
                    "Check ~/.mmfetch/config.toml and any MMFETCH_* environment variables."
                        .to_string(),
                );
                (suggestion, None)
            }
            MmError::Io(e) => {
                let suggestion = match e.kind() {
                    std::io::ErrorKind::PermissionDenied => Some(if cfg!(windows) {
                        "Run the command from an Administrator prompt or choose a writable \
                         destination."
                            .to_string()
                    } else {
                        "Choose a writable destination or fix the directory permissions."
                            .to_string()
                    }),
                    _ => None,
                };
                (suggestion, None)
            }
            _ => (None, None),
        };

        Self {
            error,
            suggestion,
            details,
        }
    }
}

impl fmt::Display for ErrorContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\n\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}
