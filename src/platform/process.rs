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

//! External process execution.
//!
//! Installers never call `std::process::Command` directly; they describe an
//! [`Invocation`] and hand it to a [`CommandRunner`], which lets the vendor
//! installer, `hdiutil` and `xattr` be replaced in tests.

use crate::error::{MmError, Result};
use std::ffi::{OsStr, OsString};
use std::process::{Command, Stdio};

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
    capture_output: bool,
}

impl Invocation {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            capture_output: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Capture stdout and stderr instead of inheriting the terminal.
    pub fn captured(mut self) -> Self {
        self.capture_output = true;
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    pub fn captures_output(&self) -> bool {
        self.capture_output
    }

    /// Human readable command line, for logs and error messages.
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| part.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Exit status and captured output of a finished process.
///
/// `stdout` and `stderr` are empty when output was not captured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

pub trait CommandRunner {
    /// Run the invocation to completion, blocking the calling thread.
    ///
    /// A non-zero exit is not an error here; failure to start the process is.
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}

/// Runs invocations as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        log::debug!("Running: {}", invocation.display());

        let mut command = Command::new(invocation.program());
        command.args(invocation.arguments());

        let spawn_error = |source| MmError::CommandSpawn {
            command: invocation.program().to_string_lossy().into_owned(),
            source,
        };

        if invocation.captures_output() {
            let output = command.stdin(Stdio::null()).output().map_err(spawn_error)?;
            Ok(CommandOutput {
                status: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        } else {
            let status = command
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(spawn_error)?;
            Ok(CommandOutput {
                status: status.code(),
                ..Default::default()
            })
        }
    }
}

/// Run an invocation and turn a non-zero exit into [`MmError::Subprocess`].
pub fn run_checked(runner: &dyn CommandRunner, invocation: &Invocation) -> Result<CommandOutput> {
    let output = runner.run(invocation)?;
    if !output.success() {
        return Err(MmError::Subprocess {
            command: invocation.display(),
            status: output.status,
            stderr: output.stderr,
        });
    }
    Ok(output)
}
