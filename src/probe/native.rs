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
use crate::probe::{ENTRY_POINT, EntryPointLoader};
use libloading::{Library, Symbol};
use std::os::raw::c_long;
use std::path::Path;

// Adapters export the entry point with WINAPI linkage on Windows.
#[cfg(windows)]
type InterfaceVersionFn = unsafe extern "system" fn() -> c_long;
#[cfg(not(windows))]
type InterfaceVersionFn = unsafe extern "C" fn() -> c_long;

/// Loads adapter libraries with the platform's dynamic loader.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLoader;

impl EntryPointLoader for NativeLoader {
    fn interface_version(&self, library: &Path) -> Result<i64> {
        let handle = open(library)?;

        let symbol = format!("{ENTRY_POINT}\0");
        // SAFETY: every adapter exports the entry point with this signature.
        let entry: Symbol<InterfaceVersionFn> =
            unsafe { handle.get(symbol.as_bytes()) }.map_err(|_| MmError::EntryPointMissing {
                symbol: ENTRY_POINT.to_string(),
                library: library.display().to_string(),
            })?;

        // SAFETY: takes no arguments and only returns a constant.
        let version = unsafe { entry() };
        Ok(i64::from(version))
    }
}

#[cfg(windows)]
fn open(path: &Path) -> Result<Library> {
    use libloading::os::windows::{
        LOAD_LIBRARY_SEARCH_DEFAULT_DIRS, LOAD_LIBRARY_SEARCH_DLL_LOAD_DIR,
        Library as WindowsLibrary,
    };

    // Resolve the adapter's own dependencies next to it.
    // SAFETY: adapter initialisers are trusted vendor code.
    unsafe {
        WindowsLibrary::load_with_flags(
            path,
            LOAD_LIBRARY_SEARCH_DLL_LOAD_DIR | LOAD_LIBRARY_SEARCH_DEFAULT_DIRS,
        )
    }
    .map(Library::from)
    .map_err(|e| load_error(path, e))
}

#[cfg(not(windows))]
fn open(path: &Path) -> Result<Library> {
    // SAFETY: adapter initialisers are trusted vendor code.
    unsafe { Library::new(path) }.map_err(|e| load_error(path, e))
}

fn load_error(path: &Path, error: libloading::Error) -> MmError {
    MmError::LibraryLoad {
        library: path.display().to_string(),
        reason: error.to_string(),
    }
}
