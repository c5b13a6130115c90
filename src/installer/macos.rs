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

//! macOS: mount the disk image, copy the adapter libraries out of the
//! bundle and strip the download quarantine.

use crate::error::{MmError, Result};
use crate::platform::{CommandRunner, Invocation, clear_quarantine, run_checked};
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level folder of the vendor bundle inside the image.
pub const BUNDLE_PATTERN: &str = "Micro-Manager*";

/// Adapter libraries inside the bundle.
pub const LIBRARY_PATTERN: &str = "libmmgr*";

/// An attached disk image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedVolume {
    /// Device node handed back to `hdiutil detach`.
    pub disk_id: String,
    pub mount_point: PathBuf,
}

pub trait DiskImageTool {
    fn attach(&self, image: &Path) -> Result<MountedVolume>;

    fn detach(&self, volume: &MountedVolume) -> Result<()>;
}

/// [`DiskImageTool`] backed by `hdiutil`.
pub struct Hdiutil<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Hdiutil<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }
}

impl DiskImageTool for Hdiutil<'_> {
    fn attach(&self, image: &Path) -> Result<MountedVolume> {
        let invocation = Invocation::new("hdiutil")
            .args(["attach", "-nobrowse"])
            .arg(image)
            .captured();
        let output = self.runner.run(&invocation)?;

        let image_name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| image.display().to_string());

        if !output.success() {
            return Err(MmError::Mount {
                image: image_name,
                stderr: output.stderr,
            });
        }

        let volume = parse_attach_output(&output.stdout).ok_or_else(|| MmError::Mount {
            image: image_name,
            stderr: format!("no mount point in hdiutil output:\n{}", output.stdout),
        })?;
        log::debug!(
            "Attached {} as {} at {}",
            image.display(),
            volume.disk_id,
            volume.mount_point.display()
        );
        Ok(volume)
    }

    fn detach(&self, volume: &MountedVolume) -> Result<()> {
        let invocation = Invocation::new("hdiutil")
            .args(["detach", volume.disk_id.as_str()])
            .captured();
        run_checked(self.runner, &invocation)?;
        log::debug!("Detached {}", volume.disk_id);
        Ok(())
    }
}

/// Read the device and mount point from `hdiutil attach` output.
///
/// The last line describes the mounted partition as tab separated fields;
/// the first is the device node and the last the mount point.
pub fn parse_attach_output(stdout: &str) -> Option<MountedVolume> {
    let line = stdout.lines().rev().find(|l| !l.trim().is_empty())?;
    let mut fields = line.split('\t');
    let disk_id = fields.next()?.trim();
    let mount_point = fields.next_back()?.trim();

    if disk_id.is_empty() || mount_point.is_empty() {
        return None;
    }
    Some(MountedVolume {
        disk_id: disk_id.to_string(),
        mount_point: PathBuf::from(mount_point),
    })
}

/// Detaches its volume when dropped unless [`MountGuard::detach`] ran first.
pub struct MountGuard<'a> {
    tool: &'a dyn DiskImageTool,
    volume: MountedVolume,
    attached: bool,
}

impl<'a> MountGuard<'a> {
    pub fn attach(tool: &'a dyn DiskImageTool, image: &Path) -> Result<Self> {
        let volume = tool.attach(image)?;
        Ok(Self {
            tool,
            volume,
            attached: true,
        })
    }

    pub fn volume(&self) -> &MountedVolume {
        &self.volume
    }

    pub fn detach(mut self) -> Result<()> {
        self.attached = false;
        self.tool.detach(&self.volume)
    }
}

impl Drop for MountGuard<'_> {
    fn drop(&mut self) {
        if self.attached
            && let Err(err) = self.tool.detach(&self.volume)
        {
            log::warn!("Failed to detach {}: {err}", self.volume.disk_id);
        }
    }
}

/// Attach `image`, run `body` against the volume, then detach.
///
/// Detach happens whether `body` succeeds, fails or panics. An error from
/// `body` wins over a detach error; a detach error alone fails the call.
pub fn with_mounted<T>(
    tool: &dyn DiskImageTool,
    image: &Path,
    body: impl FnOnce(&MountedVolume) -> Result<T>,
) -> Result<T> {
    let guard = MountGuard::attach(tool, image)?;
    let result = body(guard.volume());
    let disk_id = guard.volume().disk_id.clone();
    let detached = guard.detach();

    match (result, detached) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), detached) => {
            if let Err(detach_error) = detached {
                log::warn!("Also failed to detach {disk_id}: {detach_error}");
            }
            Err(e)
        }
    }
}

/// Locate the vendor bundle directly below the volume root.
pub fn find_vendor_bundle(volume_root: &Path) -> Result<PathBuf> {
    let pattern = compile(BUNDLE_PATTERN)?;
    first_match(volume_root, &pattern)?
        .ok_or_else(|| MmError::VendorBundleNotFound(volume_root.display().to_string()))
}

/// Copy the adapter libraries of the bundle in `volume_root` into
/// `destination`. Returns the number of files copied.
pub fn copy_vendor_libraries(volume_root: &Path, destination: &Path) -> Result<usize> {
    let bundle = find_vendor_bundle(volume_root)?;
    log::debug!("Found vendor bundle {}", bundle.display());

    let pattern = compile(LIBRARY_PATTERN)?;
    let mut copied = 0;
    for entry in fs::read_dir(&bundle)? {
        let entry = entry?;
        let name = entry.file_name();
        if !name.to_str().is_some_and(|n| pattern.matches(n)) {
            continue;
        }
        // Follows symlinks, which the bundle uses for versioned library names
        if !fs::metadata(entry.path())?.is_file() {
            continue;
        }
        fs::copy(entry.path(), destination.join(&name))?;
        copied += 1;
    }
    Ok(copied)
}

/// Install the libraries in disk image `image` into `destination`.
pub fn install_macos(runner: &dyn CommandRunner, image: &Path, destination: &Path) -> Result<()> {
    install_macos_with(&Hdiutil::new(runner), runner, image, destination)
}

pub fn install_macos_with(
    tool: &dyn DiskImageTool,
    runner: &dyn CommandRunner,
    image: &Path,
    destination: &Path,
) -> Result<()> {
    let copied = with_mounted(tool, image, |volume| {
        fs::create_dir_all(destination)?;
        copy_vendor_libraries(&volume.mount_point, destination)
    })?;
    log::info!("Copied {copied} libraries to {}", destination.display());

    if !clear_quarantine(runner, destination) {
        log::warn!(
            "Libraries in {} may be blocked by Gatekeeper until the quarantine attribute is removed",
            destination.display()
        );
    }
    Ok(())
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern)
        .map_err(|e| MmError::ValidationError(format!("invalid pattern '{pattern}': {e}")))
}

fn first_match(dir: &Path, pattern: &Pattern) -> Result<Option<PathBuf>> {
    let mut matches: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|n| pattern.matches(n))
        })
        .map(|entry| entry.path())
        .collect();
    matches.sort();
    Ok(matches.into_iter().next())
}
