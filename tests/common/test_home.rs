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

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch mmfetch home under `target/home`, removed when dropped.
pub struct TestHomeGuard {
    dir: TempDir,
}

impl TestHomeGuard {
    pub fn new() -> Self {
        fs::create_dir_all("target/home").expect("Failed to create target/home");
        let dir = tempfile::Builder::new()
            .prefix("mmfetch-")
            .tempdir_in("target/home")
            .expect("Failed to create test home directory");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path, for handing to child processes.
    pub fn mmfetch_home(&self) -> PathBuf {
        std::path::absolute(self.dir.path()).expect("Failed to absolutise test home")
    }

    pub fn write_config(&self, contents: &str) -> &Self {
        fs::write(self.path().join("config.toml"), contents).expect("Failed to write config.toml");
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_and_cleans_up_directory() {
        let test_path = {
            let guard = TestHomeGuard::new();
            let path = guard.path().to_path_buf();
            assert!(path.exists());
            assert!(path.starts_with("target/home"));
            path
        };
        assert!(!test_path.exists());
    }
}
