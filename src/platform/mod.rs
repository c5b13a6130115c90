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

//! Host platform detection and the process plumbing the installers share.
//!
//! Detection happens once, at startup, and the resulting [`TargetPlatform`]
//! is handed to every component that behaves differently per operating
//! system. Nothing below the command layer inspects the host directly.

mod detection;
pub mod process;
pub mod quarantine;

pub use detection::{TargetPlatform, detect_host_platform};
pub use process::{CommandOutput, CommandRunner, Invocation, SystemCommandRunner, run_checked};
pub use quarantine::{QUARANTINE_ATTRIBUTE, clear_quarantine};
