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

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Options for configuring download behavior
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// Suppress the progress bar
    pub no_progress: bool,

    /// Overall request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

/// A downloaded installer and the temporary directory that holds it
pub struct DownloadResult {
    path: PathBuf,

    /// Removed, together with the installer, when the result is dropped
    _temp_dir: tempfile::TempDir,
}

impl DownloadResult {
    /// Get the path to the downloaded file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn new(path: PathBuf, temp_dir: tempfile::TempDir) -> Self {
        Self {
            path,
            _temp_dir: temp_dir,
        }
    }
}
