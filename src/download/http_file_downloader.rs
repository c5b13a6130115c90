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

use crate::download::client::{HttpClient, HttpResponse};
use crate::error::{MmError, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const DOWNLOAD_CHUNK_SIZE: usize = 64 * 1024;

pub trait ProgressReporter: Send + Sync {
    fn on_start(&mut self, total_bytes: u64);

    fn on_progress(&mut self, bytes_downloaded: u64);

    fn on_complete(&mut self);

    fn on_error(&mut self, _message: &str) {}
}

pub struct HttpFileDownloader {
    pub(crate) http_client: Box<dyn HttpClient>,
    progress_reporter: Option<Box<dyn ProgressReporter>>,
}

impl HttpFileDownloader {
    pub fn with_client(http_client: Box<dyn HttpClient>) -> Self {
        Self {
            http_client,
            progress_reporter: None,
        }
    }

    pub fn with_progress_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Download `url` to `destination`.
    ///
    /// Bytes are streamed to a sibling temporary file that is renamed into
    /// place only once the body has been read completely.
    pub fn download(&mut self, url: &str, destination: &Path) -> Result<PathBuf> {
        let result = self.download_inner(url, destination);
        if let Err(e) = &result
            && let Some(reporter) = &mut self.progress_reporter
        {
            reporter.on_error(&e.to_string());
        }
        result
    }

    fn download_inner(&mut self, url: &str, destination: &Path) -> Result<PathBuf> {
        let parent = destination.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let response = self.http_client.get(url)?;
        validate_response(response.as_ref(), url)?;

        if let Some(final_url) = response.final_url()
            && final_url != url
        {
            log::debug!("Redirected to {final_url}");
        }

        let total_size = total_size(response.as_ref());
        // Content-Length counts encoded bytes when the body is compressed
        let length_is_exact = response.header("Content-Encoding").is_none();
        if let Some(reporter) = &mut self.progress_reporter {
            reporter.on_start(total_size);
        }

        let temp_file = NamedTempFile::new_in(parent)?;
        let written = self.stream_to_file(response, temp_file.as_file())?;

        if length_is_exact && total_size > 0 && written != total_size {
            return Err(MmError::Download(format!(
                "Connection closed after {written} of {total_size} bytes from {url}"
            )));
        }

        temp_file
            .persist(destination)
            .map_err(|e| MmError::Io(e.error))?;

        if let Some(reporter) = &mut self.progress_reporter {
            reporter.on_complete();
        }

        log::debug!("Wrote {written} bytes to {}", destination.display());
        Ok(destination.to_path_buf())
    }

    fn stream_to_file(&mut self, mut response: Box<dyn HttpResponse>, file: &File) -> Result<u64> {
        let mut writer = BufWriter::new(file);
        let mut downloaded = 0u64;
        let mut buffer = vec![0; DOWNLOAD_CHUNK_SIZE];

        loop {
            match response.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    writer.write_all(&buffer[..n])?;
                    downloaded += n as u64;

                    if let Some(reporter) = &mut self.progress_reporter {
                        reporter.on_progress(downloaded);
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(MmError::Download(format!(
                        "Failed reading response body: {e}"
                    )));
                }
            }
        }

        writer.flush()?;
        Ok(downloaded)
    }
}

fn validate_response(response: &dyn HttpResponse, url: &str) -> Result<()> {
    let status = response.status();

    if !(200..300).contains(&status) {
        return Err(MmError::Download(format!(
            "Server returned HTTP {status} for {url}"
        )));
    }

    Ok(())
}

fn total_size(response: &dyn HttpResponse) -> u64 {
    response
        .header("Content-Length")
        .and_then(|length| length.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "http_file_downloader_tests.rs"]
mod http_file_downloader_tests;
