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

//! Fetch prebuilt Micro-Manager device adapter libraries.
//!
//! Resolves a nightly release, downloads the platform installer, extracts
//! the adapter libraries into a directory and reports their device
//! interface version.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod download;
pub mod error;
pub mod indicator;
pub mod installer;
pub mod logging;
pub mod platform;
pub mod probe;
pub mod tls;
pub mod user_agent;
pub mod version;

pub use installer::{InstallOutcome, Installer, install, install_latest};
