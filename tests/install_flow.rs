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

mod common;

use common::fixtures::{
    FakeMacTools, FakeWindowsSetup, FixedLoader, MAC_LISTING_PATH, WINDOWS_LISTING_PATH,
    mac_listing, populate_mac_volume, windows_listing,
};
use mmfetch::config::{LatestSource, MmConfig, WindowsLayout};
use mmfetch::error::MmError;
use mmfetch::platform::TargetPlatform;
use mmfetch::Installer;
use mmfetch::catalog::CatalogCache;
use tempfile::TempDir;

fn config_for(server: &mockito::Server) -> MmConfig {
    let mut config = MmConfig::default();
    config.catalog.base_url = server.url();
    config.download.no_progress = true;
    config
}

// Pooled mockito servers reuse URLs, so each installer gets its own cache
fn installer_for(config: MmConfig, platform: TargetPlatform) -> Installer {
    Installer::new(config, platform)
        .unwrap()
        .with_catalog_cache(CatalogCache::new())
}

#[test]
fn test_windows_install_latest() {
    let mut server = mockito::Server::new();
    let listing = server
        .mock("GET", WINDOWS_LISTING_PATH)
        .with_body(windows_listing(&["20240430", "20240501"]))
        .create();
    let download = server
        .mock("GET", "/nightly/2.0/Windows/MMSetup_64bit_2.0.3_20240501.exe")
        .with_body(b"MZ fake setup")
        .create();

    let (setup, log) = FakeWindowsSetup::new();
    let installer = installer_for(config_for(&server), TargetPlatform::Windows)
        .with_runner(Box::new(setup))
        .with_loader(Box::new(FixedLoader(71)));

    let dest = TempDir::new().unwrap();
    let destination = dest.path().join("libs");
    let outcome = installer.install(Some(&destination), "latest").unwrap();

    listing.assert();
    download.assert();
    assert_eq!(outcome.release, "20240501");
    assert_eq!(outcome.version_string(), "71.2024.5.1");
    assert_eq!(outcome.destination, destination);

    let calls = log.borrow();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains("MMSetup_64bit_2.0.3_20240501.exe /SILENT /SUPPRESSMSGBOXES /NORESTART /DIR="));

    assert!(destination.join("mmgr_dal_DemoCamera.dll").exists());
    assert!(destination.join("MMCoreJ_wrap.dll").exists());
    assert!(destination.join("MMConfig_demo.cfg").exists());
    assert!(!destination.join("ImageJ.exe").exists());
    assert!(!destination.join("unins000.exe").exists());
    assert!(!destination.join("ij.jar").exists());
    assert!(!destination.join("jre").exists());
    assert!(!destination.join("plugins").exists());
}

#[test]
fn test_repeated_installs_fetch_listing_once() {
    let mut server = mockito::Server::new();
    let listing = server
        .mock("GET", WINDOWS_LISTING_PATH)
        .with_body(windows_listing(&["20240430", "20240501"]))
        .expect(1)
        .create();
    let download = server
        .mock("GET", "/nightly/2.0/Windows/MMSetup_64bit_2.0.3_20240501.exe")
        .with_body(b"MZ fake setup")
        .expect(2)
        .create();

    let cache = CatalogCache::new();
    for _ in 0..2 {
        let (setup, _log) = FakeWindowsSetup::new();
        let installer = Installer::new(config_for(&server), TargetPlatform::Windows)
            .unwrap()
            .with_catalog_cache(cache.clone())
            .with_runner(Box::new(setup))
            .with_loader(Box::new(FixedLoader(71)));

        let dest = TempDir::new().unwrap();
        let outcome = installer.install(Some(dest.path()), "latest").unwrap();
        assert_eq!(outcome.release, "20240501");
    }

    listing.assert();
    download.assert();
}

#[test]
fn test_windows_copy_layout_without_probe() {
    let mut server = mockito::Server::new();
    let _listing = server
        .mock("GET", WINDOWS_LISTING_PATH)
        .with_body(windows_listing(&["20240430", "20240501"]))
        .create();
    let _download = server
        .mock("GET", "/nightly/2.0/Windows/MMSetup_64bit_2.0.3_20240430.exe")
        .with_body(b"MZ fake setup")
        .create();

    let mut config = config_for(&server);
    config.install.windows_layout = WindowsLayout::Copy;
    config.install.probe_version = false;

    let (setup, _log) = FakeWindowsSetup::new();
    let installer = installer_for(config, TargetPlatform::Windows)
        .with_runner(Box::new(setup));

    let dest = TempDir::new().unwrap();
    let outcome = installer.install(Some(dest.path()), "20240430").unwrap();

    assert_eq!(outcome.release, "20240430");
    assert_eq!(outcome.version, None);
    assert_eq!(outcome.version_string(), "");
    assert!(dest.path().join("mmgr_dal_Arduino.dll").exists());
    assert!(!dest.path().join("MMConfig_demo.cfg").exists());
    assert!(!dest.path().join("ImageJ.exe").exists());
}

#[test]
fn test_unknown_release_never_downloads() {
    let mut server = mockito::Server::new();
    let _listing = server
        .mock("GET", MAC_LISTING_PATH)
        .with_body(mac_listing(&["20240429", "20240430", "20240501"]))
        .create();
    let download = server
        .mock("GET", mockito::Matcher::Regex(r"\.dmg$".to_string()))
        .expect(0)
        .create();

    let volume = TempDir::new().unwrap();
    let (tools, log) = FakeMacTools::new(volume.path());
    let installer = installer_for(config_for(&server), TargetPlatform::MacOs)
        .with_runner(Box::new(tools));

    let dest = TempDir::new().unwrap();
    let err = installer.install(Some(dest.path()), "19990101").unwrap_err();

    match err {
        MmError::ReleaseNotFound { release, preview } => {
            assert_eq!(release, "19990101");
            assert_eq!(preview, ["20240429", "20240430", "20240501"]);
        }
        other => panic!("unexpected error variant: {other:?}"),
    }
    download.assert();
    assert!(log.borrow().is_empty());
}

#[test]
fn test_macos_install_tolerates_quarantine_failure() {
    let mut server = mockito::Server::new();
    let _listing = server
        .mock("GET", MAC_LISTING_PATH)
        .with_body(mac_listing(&["20240430", "20240501"]))
        .create();
    let _download = server
        .mock("GET", "/nightly/2.0/Mac/Micro-Manager-2.0.3-20240501.dmg")
        .with_body(b"koly fake image")
        .create();

    let volume = TempDir::new().unwrap();
    populate_mac_volume(volume.path());
    let (mut tools, log) = FakeMacTools::new(volume.path());
    tools.xattr_status = 1;

    let installer = installer_for(config_for(&server), TargetPlatform::MacOs)
        .with_runner(Box::new(tools))
        .with_loader(Box::new(FixedLoader(73)));

    let dest = TempDir::new().unwrap();
    let destination = dest.path().join("libs");
    let outcome = installer.install(Some(&destination), "latest").unwrap();

    assert_eq!(outcome.version_string(), "73.2024.5.1");
    assert!(destination.join("libmmgr_dal_DemoCamera").exists());
    assert!(destination.join("libmmgr_dal_Arduino").exists());
    assert!(!destination.join("MMConfig_demo.cfg").exists());

    let calls = log.borrow();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].starts_with("hdiutil attach -nobrowse "));
    assert!(calls[0].ends_with("Micro-Manager-2.0.3-20240501.dmg"));
    assert_eq!(calls[1], "hdiutil detach /dev/disk4s1");
    assert_eq!(
        calls[2],
        format!(
            "xattr -r -d com.apple.quarantine {}",
            destination.display()
        )
    );
}

#[test]
fn test_macos_missing_bundle_detaches() {
    let mut server = mockito::Server::new();
    let _listing = server
        .mock("GET", MAC_LISTING_PATH)
        .with_body(mac_listing(&["20240501"]))
        .create();
    let _download = server
        .mock("GET", "/nightly/2.0/Mac/Micro-Manager-2.0.3-20240501.dmg")
        .with_body(b"koly fake image")
        .create();

    let volume = TempDir::new().unwrap();
    let (tools, log) = FakeMacTools::new(volume.path());
    let installer = installer_for(config_for(&server), TargetPlatform::MacOs)
        .with_runner(Box::new(tools));

    let dest = TempDir::new().unwrap();
    let err = installer.install(Some(dest.path()), "20240501").unwrap_err();

    assert!(matches!(err, MmError::VendorBundleNotFound(_)));
    let calls = log.borrow();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1], "hdiutil detach /dev/disk4s1");
}

#[test]
fn test_macos_mount_failure() {
    let mut server = mockito::Server::new();
    let _download = server
        .mock("GET", "/latest/macos/Micro-Manager-x86_64-latest.dmg")
        .with_body(b"not an image")
        .create();

    let mut config = config_for(&server);
    config.catalog.latest_source = LatestSource::Direct;

    let volume = TempDir::new().unwrap();
    let (mut tools, log) = FakeMacTools::new(volume.path());
    tools.attach_fails = true;
    let installer = installer_for(config, TargetPlatform::MacOs)
        .with_runner(Box::new(tools));

    let dest = TempDir::new().unwrap();
    let err = installer.install(Some(dest.path()), "latest").unwrap_err();

    match err {
        MmError::Mount { image, stderr } => {
            assert_eq!(image, "Micro-Manager-x86_64-latest.dmg");
            assert!(stderr.contains("corrupt image"));
        }
        other => panic!("unexpected error variant: {other:?}"),
    }
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn test_download_failure_is_fatal() {
    let mut server = mockito::Server::new();
    let _listing = server
        .mock("GET", WINDOWS_LISTING_PATH)
        .with_body(windows_listing(&["20240501"]))
        .create();
    let _download = server
        .mock("GET", "/nightly/2.0/Windows/MMSetup_64bit_2.0.3_20240501.exe")
        .with_status(404)
        .create();

    let (setup, log) = FakeWindowsSetup::new();
    let installer = installer_for(config_for(&server), TargetPlatform::Windows)
        .with_runner(Box::new(setup));

    let dest = TempDir::new().unwrap();
    let err = installer.install(Some(dest.path()), "latest").unwrap_err();

    assert!(matches!(err, MmError::Download(_)));
    assert!(log.borrow().is_empty());
}
