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

use crate::error::Result;
use crate::installer::normalize_destination;
use crate::probe::{NativeLoader, probe_interface_version};
use std::path::Path;

pub struct ProbeCommand;

impl ProbeCommand {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }

    pub fn execute(&self, directory: &Path) -> Result<()> {
        let directory = normalize_destination(directory)?;
        let version = probe_interface_version(&NativeLoader, &directory)?;
        println!("{version}");
        Ok(())
    }
}
