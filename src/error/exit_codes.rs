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

use crate::error::MmError;

pub fn get_exit_code(error: &MmError) -> i32 {
    match error {
        MmError::InvalidConfig(_) | MmError::ConfigError(_) | MmError::ValidationError(_) => 2,

        MmError::ReleaseNotFound { .. } => 3,

        MmError::NoInterfaceLibrary { .. } | MmError::EntryPointMissing { .. } => 4,

        MmError::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => 13,

        MmError::CatalogFetch(_) | MmError::Download(_) => 20,

        MmError::UnsupportedPlatform { .. } => 69, // EX_UNAVAILABLE

        MmError::CommandSpawn { .. } => 127, // Standard "command not found" exit code

        _ => 1,
    }
}
