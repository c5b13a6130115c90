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

mod context;
mod exit_codes;
mod format;

pub use context::ErrorContext;
pub use exit_codes::get_exit_code;
pub use format::{format_error_chain, format_error_with_color};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MmError {
    #[error("Unsupported platform/architecture: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Failed to retrieve release catalog: {0}")]
    CatalogFetch(String),

    #[error("Release '{release}' not found. {}", describe_preview(.preview))]
    ReleaseNotFound {
        release: String,
        preview: Vec<String>,
    },

    #[error("Failed to download installer: {0}")]
    Download(String),

    #[error("Failed to launch '{command}': {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{command}' exited with {}", describe_status(.status))]
    Subprocess {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Error mounting {image}:\n{stderr}")]
    Mount { image: String, stderr: String },

    #[error("Could not find Micro-Manager in {0}")]
    VendorBundleNotFound(String),

    #[error("No device adapter library matching '{pattern}' in {directory}")]
    NoInterfaceLibrary { pattern: String, directory: String },

    #[error("Failed to load library {library}: {reason}")]
    LibraryLoad { library: String, reason: String },

    #[error("Function '{symbol}' not found in {library}")]
    EntryPointMissing { symbol: String, library: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, MmError>;

fn describe_preview(preview: &[String]) -> String {
    if preview.is_empty() {
        return "No releases are available for this platform.".to_string();
    }
    format!(
        "Last {} releases:\n{} ...",
        preview.len(),
        preview.join(", ")
    )
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}
