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

//! Windows: run the vendor setup program unattended and keep only the
//! device adapter libraries it lays down.

use crate::config::WindowsLayout;
use crate::error::Result;
use crate::platform::{CommandRunner, Invocation, run_checked};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Flags making the setup program run without any interaction.
pub const UNATTENDED_FLAGS: [&str; 3] = ["/SILENT", "/SUPPRESSMSGBOXES", "/NORESTART"];

/// Extensions that survive an in-place prune.
const KEPT_EXTENSIONS: [&str; 3] = ["dll", "exe", "cfg"];

/// Files removed by a prune even though their extension is allowed.
const EXCLUDED_FILES: [&str; 2] = ["ImageJ.exe", "unins000.exe"];

/// Extensions picked up by the copy layout.
const COPIED_EXTENSIONS: [&str; 2] = ["dll", "exe"];

/// Path fragments marking the bundled JRE and ImageJ, skipped by the copy layout.
const BUNDLED_RUNTIME_MARKERS: [&str; 3] = ["jre", "ImageJ", "java"];

/// Files and directories a prune deleted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PruneSummary {
    pub removed_files: usize,
    pub removed_dirs: usize,
}

/// `<installer> /SILENT /SUPPRESSMSGBOXES /NORESTART /DIR=<target>`
pub fn installer_invocation(installer: &Path, target: &Path) -> Invocation {
    let mut dir_flag = OsString::from("/DIR=");
    dir_flag.push(target.as_os_str());

    Invocation::new(installer.as_os_str())
        .args(UNATTENDED_FLAGS)
        .arg(dir_flag)
}

/// Install the libraries shipped by `installer` into `destination`.
pub fn install_windows(
    runner: &dyn CommandRunner,
    installer: &Path,
    destination: &Path,
    layout: WindowsLayout,
) -> Result<()> {
    match layout {
        WindowsLayout::Prune => {
            fs::create_dir_all(destination)?;
            run_checked(runner, &installer_invocation(installer, destination))?;

            let summary = prune_in_place(destination)?;
            log::info!(
                "Removed {} files and {} directories not needed at runtime",
                summary.removed_files,
                summary.removed_dirs
            );
        }
        WindowsLayout::Copy => {
            let scratch = tempfile::tempdir()?;
            run_checked(runner, &installer_invocation(installer, scratch.path()))?;

            fs::create_dir_all(destination)?;
            let copied = copy_selected(scratch.path(), destination)?;
            log::info!("Copied {copied} libraries to {}", destination.display());
        }
    }
    Ok(())
}

/// Whether a file left by the installer stays in a pruned tree.
pub fn is_kept_in_place(file_name: &str) -> bool {
    if EXCLUDED_FILES.contains(&file_name) {
        return false;
    }
    has_extension(file_name, &KEPT_EXTENSIONS)
}

/// Whether a file at `relative` (below the scratch root) is copied across.
pub fn is_copied(relative: &Path) -> bool {
    let Some(file_name) = relative.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if !has_extension(file_name, &COPIED_EXTENSIONS) {
        return false;
    }

    let relative = relative.to_string_lossy();
    !BUNDLED_RUNTIME_MARKERS
        .iter()
        .any(|marker| relative.contains(marker))
}

/// Delete every file [`is_kept_in_place`] rejects, then every directory left
/// empty, deepest first. `root` itself is never removed.
pub fn prune_in_place(root: &Path) -> Result<PruneSummary> {
    let mut summary = PruneSummary::default();

    let mut doomed: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        let keep = entry
            .file_name()
            .to_str()
            .is_some_and(is_kept_in_place);
        if !keep {
            doomed.push(entry.into_path());
        }
    }

    for path in doomed {
        log::trace!("Removing {}", path.display());
        fs::remove_file(&path)?;
        summary.removed_files += 1;
    }

    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if fs::read_dir(entry.path())?.next().is_none() {
            log::trace!("Removing empty directory {}", entry.path().display());
            fs::remove_dir(entry.path())?;
            summary.removed_dirs += 1;
        }
    }

    Ok(summary)
}

/// Copy every file [`is_copied`] accepts from `source` into `destination`,
/// keeping its relative location. Returns the number of files copied.
pub fn copy_selected(source: &Path, destination: &Path) -> Result<usize> {
    let mut copied = 0;

    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        if !is_copied(relative) {
            continue;
        }

        let target = destination.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)?;
        copied += 1;
    }

    Ok(copied)
}

fn has_extension(file_name: &str, allowed: &[&str]) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| allowed.iter().any(|a| ext.eq_ignore_ascii_case(a)))
}
