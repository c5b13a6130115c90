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

//! Device interface version of an installed adapter set.
//!
//! Every adapter library exports `GetDeviceInterfaceVersion`, a
//! zero-argument function returning the interface revision it was built
//! against. All adapters from one build share it, so probing one suffices.

mod native;

pub use native::NativeLoader;

use crate::error::{MmError, Result};
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};

/// Exported function reporting the interface version.
pub const ENTRY_POINT: &str = "GetDeviceInterfaceVersion";

/// File names of device adapter libraries.
pub const INTERFACE_LIBRARY_PATTERN: &str = "*_dal_*";

/// Adapter with no hardware dependencies, loaded in preference to others.
const PREFERRED_ADAPTER: &str = "_dal_DemoCamera";

/// Calls the interface version entry point of a library.
pub trait EntryPointLoader {
    fn interface_version(&self, library: &Path) -> Result<i64>;
}

/// Pick the adapter library in `directory` to probe.
pub fn find_interface_library(directory: &Path) -> Result<PathBuf> {
    let pattern = Pattern::new(INTERFACE_LIBRARY_PATTERN).map_err(|e| {
        MmError::ValidationError(format!("invalid pattern '{INTERFACE_LIBRARY_PATTERN}': {e}"))
    })?;

    let mut candidates = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        // Symlinked libraries count; dangling links do not
        if !fs::metadata(entry.path()).is_ok_and(|m| m.is_file()) {
            continue;
        }
        if let Some(name) = entry.file_name().to_str()
            && pattern.matches(name)
        {
            candidates.push(name.to_string());
        }
    }
    candidates.sort();

    let chosen = candidates
        .iter()
        .find(|name| name.contains(PREFERRED_ADAPTER))
        .or_else(|| candidates.first())
        .ok_or_else(|| MmError::NoInterfaceLibrary {
            pattern: INTERFACE_LIBRARY_PATTERN.to_string(),
            directory: directory.display().to_string(),
        })?;

    log::debug!(
        "Probing {chosen} (one of {} adapter libraries)",
        candidates.len()
    );
    Ok(directory.join(chosen))
}

/// Interface version of the adapters installed in `directory`.
pub fn probe_interface_version(loader: &dyn EntryPointLoader, directory: &Path) -> Result<i64> {
    let library = find_interface_library(directory)?;
    let version = loader.interface_version(&library)?;
    log::info!("Device interface version {version} ({})", library.display());
    Ok(version)
}

/// [`probe_interface_version`] using the platform's dynamic loader.
pub fn get_device_interface_version(directory: &Path) -> Result<i64> {
    probe_interface_version(&NativeLoader, directory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    struct FixedLoader {
        version: i64,
        loaded: RefCell<Vec<PathBuf>>,
    }

    impl EntryPointLoader for FixedLoader {
        fn interface_version(&self, library: &Path) -> Result<i64> {
            self.loaded.borrow_mut().push(library.to_path_buf());
            Ok(self.version)
        }
    }

    fn dir_with(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            fs::write(dir.path().join(file), b"").unwrap();
        }
        dir
    }

    #[test]
    fn test_prefers_demo_camera() {
        let dir = dir_with(&[
            "mmgr_dal_Andor.dll",
            "mmgr_dal_DemoCamera.dll",
            "MMCoreJ_wrap.dll",
        ]);

        let library = find_interface_library(dir.path()).unwrap();
        assert_eq!(library, dir.path().join("mmgr_dal_DemoCamera.dll"));
    }

    #[test]
    fn test_falls_back_to_first_match() {
        let dir = dir_with(&["libmmgr_dal_Zaber", "libmmgr_dal_Arduino", "libother"]);

        let library = find_interface_library(dir.path()).unwrap();
        assert_eq!(library, dir.path().join("libmmgr_dal_Arduino"));
    }

    #[test]
    fn test_no_adapter_library() {
        let dir = dir_with(&["MMCoreJ_wrap.dll"]);
        fs::create_dir(dir.path().join("mmgr_dal_dir")).unwrap();

        match find_interface_library(dir.path()).unwrap_err() {
            MmError::NoInterfaceLibrary { pattern, .. } => assert_eq!(pattern, "*_dal_*"),
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_adapter_is_candidate() {
        let dir = dir_with(&["libmmgr_dal_DemoCamera.so.0", "libmmgr_dal_Arduino"]);
        std::os::unix::fs::symlink(
            dir.path().join("libmmgr_dal_DemoCamera.so.0"),
            dir.path().join("libmmgr_dal_DemoCamera"),
        )
        .unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("missing"),
            dir.path().join("libmmgr_dal_Andor"),
        )
        .unwrap();

        let library = find_interface_library(dir.path()).unwrap();
        assert_eq!(library, dir.path().join("libmmgr_dal_DemoCamera"));
    }

    #[cfg(unix)]
    #[test]
    fn test_only_symlinked_adapter() {
        let target = dir_with(&["libmmgr_dal_Zaber.so"]);
        let dir = dir_with(&[]);
        std::os::unix::fs::symlink(
            target.path().join("libmmgr_dal_Zaber.so"),
            dir.path().join("libmmgr_dal_Zaber"),
        )
        .unwrap();

        let library = find_interface_library(dir.path()).unwrap();
        assert_eq!(library, dir.path().join("libmmgr_dal_Zaber"));
    }

    #[test]
    fn test_probe_with_loader() {
        let dir = dir_with(&["libmmgr_dal_DemoCamera"]);
        let loader = FixedLoader {
            version: 71,
            loaded: RefCell::new(Vec::new()),
        };

        assert_eq!(probe_interface_version(&loader, dir.path()).unwrap(), 71);
        assert_eq!(
            loader.loaded.borrow().as_slice(),
            [dir.path().join("libmmgr_dal_DemoCamera")]
        );
    }
}
