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

//! Installer downloads.
//!
//! A download is a single blocking GET streamed to a file inside a
//! temporary directory owned by the returned [`DownloadResult`]; dropping the
//! result removes the directory and the artifact with it. There is no resume
//! and no retry.
mod client;
mod http_file_downloader;
mod options;
mod progress;

pub use client::{AttohttpcClient, HttpClient, HttpResponse};
pub use http_file_downloader::{HttpFileDownloader, ProgressReporter};
pub use options::{DownloadOptions, DownloadResult};
pub use progress::DownloadProgressAdapter;

use crate::error::Result;
use crate::user_agent;

const FALLBACK_FILE_NAME: &str = "installer.bin";

/// Download the artifact at `url` into a fresh temporary directory
pub fn fetch_artifact(url: &str, options: &DownloadOptions) -> Result<DownloadResult> {
    let client = AttohttpcClient::new(user_agent::download_client()).with_timeout(options.timeout);
    fetch_artifact_with(Box::new(client), url, options)
}

/// Same as [`fetch_artifact`] with a caller-supplied HTTP client
pub fn fetch_artifact_with(
    client: Box<dyn HttpClient>,
    url: &str,
    options: &DownloadOptions,
) -> Result<DownloadResult> {
    if !url.starts_with("https://") {
        log::warn!("Downloading over an unencrypted connection: {url}");
    }

    let file_name = artifact_file_name(url);
    let temp_dir = tempfile::tempdir()?;
    let download_path = temp_dir.path().join(file_name);

    let mut downloader = HttpFileDownloader::with_client(client);
    downloader = downloader.with_progress_reporter(Box::new(DownloadProgressAdapter::new(
        options.no_progress,
        file_name,
    )));

    log::info!("Downloading {url}");
    let path = downloader.download(url, &download_path)?;
    log::debug!("Downloaded installer to {}", path.display());

    Ok(DownloadResult::new(path, temp_dir))
}

/// Last path segment of `url`, ignoring any query or fragment.
pub(crate) fn artifact_file_name(url: &str) -> &str {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    match without_query.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => FALLBACK_FILE_NAME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_file_name() {
        assert_eq!(
            artifact_file_name(
                "https://download.micro-manager.org/nightly/2.0/Mac/Micro-Manager-2.0.3-20240501.dmg"
            ),
            "Micro-Manager-2.0.3-20240501.dmg"
        );
        assert_eq!(
            artifact_file_name("https://host/latest/windows/MMSetup_x64_latest.exe?token=1"),
            "MMSetup_x64_latest.exe"
        );
        assert_eq!(artifact_file_name("https://host/dir/"), FALLBACK_FILE_NAME);
    }
}
