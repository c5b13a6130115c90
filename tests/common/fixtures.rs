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

//! Synthetic download host listings and process doubles.

use mmfetch::error::Result;
use mmfetch::platform::{CommandOutput, CommandRunner, Invocation};
use mmfetch::probe::EntryPointLoader;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub const MAC_LISTING_PATH: &str = "/nightly/2.0/Mac/";
pub const WINDOWS_LISTING_PATH: &str = "/nightly/2.0/Windows/";

/// Directory listing of macOS nightlies for the given dates.
pub fn mac_listing(dates: &[&str]) -> String {
    let mut html = String::from("<html><body><pre>\n<a href=\"/\">[To Parent Directory]</a>\n");
    for date in dates {
        html.push_str(&format!(
            "<a href=\"/nightly/2.0/Mac/Micro-Manager-2.0.3-{date}.dmg\">Micro-Manager-2.0.3-{date}.dmg</a>\n"
        ));
    }
    html.push_str("</pre></body></html>\n");
    html
}

/// Directory listing of Windows nightlies, including the 32-bit builds
/// the catalog must ignore.
pub fn windows_listing(dates: &[&str]) -> String {
    let mut html = String::from("<html><body><pre>\n<a href=\"/\">[To Parent Directory]</a>\n");
    for date in dates {
        html.push_str(&format!(
            "<a href=\"/nightly/2.0/Windows/MMSetup_64bit_2.0.3_{date}.exe\">64</a>\n\
             <a href=\"/nightly/2.0/Windows/MMSetup_32bit_2.0.3_{date}.exe\">32</a>\n"
        ));
    }
    html.push_str("</pre></body></html>\n");
    html
}

pub fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, relative).unwrap();
}

/// Shared log of command lines a fake runner saw.
pub type CommandLog = Rc<RefCell<Vec<String>>>;

fn exit(status: i32) -> CommandOutput {
    CommandOutput {
        status: Some(status),
        ..Default::default()
    }
}

/// Plays the Windows setup program: populates the `/DIR=` target.
pub struct FakeWindowsSetup {
    pub log: CommandLog,
    pub status: i32,
}

impl FakeWindowsSetup {
    pub fn new() -> (Self, CommandLog) {
        let log = CommandLog::default();
        (
            Self {
                log: Rc::clone(&log),
                status: 0,
            },
            log,
        )
    }
}

impl CommandRunner for FakeWindowsSetup {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        self.log.borrow_mut().push(invocation.display());

        let target = invocation
            .arguments()
            .iter()
            .find_map(|a| a.to_str()?.strip_prefix("/DIR=").map(PathBuf::from))
            .expect("installer invoked without /DIR=");
        for file in [
            "mmgr_dal_DemoCamera.dll",
            "mmgr_dal_Arduino.dll",
            "MMCoreJ_wrap.dll",
            "MMConfig_demo.cfg",
            "ImageJ.exe",
            "ImageJ.cfg",
            "unins000.exe",
            "unins000.dat",
            "ij.jar",
            "jre/lib/rt.jar",
            "plugins/Micro-Manager/MMJ_.jar",
        ] {
            touch(&target, file);
        }
        Ok(exit(self.status))
    }
}

/// Plays `hdiutil` and `xattr` against a directory standing in for the
/// mounted volume.
pub struct FakeMacTools {
    pub log: CommandLog,
    pub volume: PathBuf,
    pub attach_fails: bool,
    pub xattr_status: i32,
}

impl FakeMacTools {
    pub fn new(volume: &Path) -> (Self, CommandLog) {
        let log = CommandLog::default();
        (
            Self {
                log: Rc::clone(&log),
                volume: volume.to_path_buf(),
                attach_fails: false,
                xattr_status: 0,
            },
            log,
        )
    }
}

impl CommandRunner for FakeMacTools {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        self.log.borrow_mut().push(invocation.display());

        let program = invocation.program().to_string_lossy();
        let subcommand = invocation
            .arguments()
            .first()
            .map(|a| a.to_string_lossy().into_owned())
            .unwrap_or_default();

        match (program.as_ref(), subcommand.as_str()) {
            ("hdiutil", "attach") if self.attach_fails => Ok(CommandOutput {
                status: Some(1),
                stdout: String::new(),
                stderr: "hdiutil: attach failed - corrupt image".to_string(),
            }),
            ("hdiutil", "attach") => Ok(CommandOutput {
                status: Some(0),
                stdout: format!(
                    "/dev/disk4          \tGUID_partition_scheme          \t\n\
                     /dev/disk4s1        \tApple_HFS                      \t{}\n",
                    self.volume.display()
                ),
                stderr: String::new(),
            }),
            ("hdiutil", "detach") => Ok(exit(0)),
            ("xattr", _) => Ok(exit(self.xattr_status)),
            _ => panic!("unexpected command: {}", invocation.display()),
        }
    }
}

/// Lays out the vendor bundle of a macOS disk image below `volume`.
pub fn populate_mac_volume(volume: &Path) {
    let bundle = volume.join("Micro-Manager-2.0.3-20240501");
    for file in [
        "libmmgr_dal_DemoCamera",
        "libmmgr_dal_Arduino",
        "MMConfig_demo.cfg",
        "ImageJ.app/Contents/Info.plist",
    ] {
        touch(&bundle, file);
    }
}

/// Reports a fixed interface version for any library.
pub struct FixedLoader(pub i64);

impl EntryPointLoader for FixedLoader {
    fn interface_version(&self, _library: &Path) -> Result<i64> {
        Ok(self.0)
    }
}
