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

use crate::platform::process::{CommandRunner, Invocation};
use std::path::Path;

/// Extended attribute Gatekeeper attaches to files that came from the internet.
pub const QUARANTINE_ATTRIBUTE: &str = "com.apple.quarantine";

/// Recursively strip the download quarantine attribute below `root`.
///
/// Best effort: removing the attribute may need elevated privileges, so any
/// failure is logged and swallowed. Returns whether the removal succeeded.
pub fn clear_quarantine(runner: &dyn CommandRunner, root: &Path) -> bool {
    let invocation = Invocation::new("xattr")
        .args(["-r", "-d", QUARANTINE_ATTRIBUTE])
        .arg(root)
        .captured();

    match runner.run(&invocation) {
        Ok(output) if output.success() => {
            log::debug!("Cleared {QUARANTINE_ATTRIBUTE} below {}", root.display());
            true
        }
        Ok(output) => {
            log::warn!(
                "Could not clear {QUARANTINE_ATTRIBUTE} below {} (status {:?}): {}",
                root.display(),
                output.status,
                output.stderr.trim()
            );
            false
        }
        Err(e) => {
            log::warn!(
                "Could not clear {QUARANTINE_ATTRIBUTE} below {}: {e}",
                root.display()
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MmError, Result};
    use crate::platform::process::CommandOutput;
    use std::cell::RefCell;

    struct RecordingRunner {
        result: fn() -> Result<CommandOutput>,
        seen: RefCell<Vec<String>>,
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
            self.seen.borrow_mut().push(invocation.display());
            (self.result)()
        }
    }

    #[test]
    fn test_clear_quarantine_invokes_xattr_recursively() {
        let runner = RecordingRunner {
            result: || {
                Ok(CommandOutput {
                    status: Some(0),
                    ..Default::default()
                })
            },
            seen: RefCell::new(Vec::new()),
        };

        assert!(clear_quarantine(&runner, Path::new("/tmp/libs")));
        assert_eq!(
            runner.seen.borrow().as_slice(),
            ["xattr -r -d com.apple.quarantine /tmp/libs"]
        );
    }

    #[test]
    fn test_clear_quarantine_tolerates_non_zero_exit() {
        let runner = RecordingRunner {
            result: || {
                Ok(CommandOutput {
                    status: Some(1),
                    stdout: String::new(),
                    stderr: "Operation not permitted".to_string(),
                })
            },
            seen: RefCell::new(Vec::new()),
        };

        assert!(!clear_quarantine(&runner, Path::new("/tmp/libs")));
    }

    #[test]
    fn test_clear_quarantine_tolerates_missing_xattr() {
        let runner = RecordingRunner {
            result: || {
                Err(MmError::CommandSpawn {
                    command: "xattr".to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
                })
            },
            seen: RefCell::new(Vec::new()),
        };

        assert!(!clear_quarantine(&runner, Path::new("/tmp/libs")));
    }
}
