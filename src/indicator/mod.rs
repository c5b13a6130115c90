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

//! Progress feedback for long-running steps.
//!
//! Downloads report through a [`ProgressIndicator`]; `--no-progress` swaps in
//! the silent implementation.

mod factory;
mod indicatif;
mod silent;

pub use factory::ProgressFactory;
pub use self::indicatif::IndicatifProgress;
pub use silent::SilentProgress;

#[derive(Debug, Clone)]
pub struct ProgressConfig {
    pub operation: String,
    pub context: String,
    pub total: Option<u64>,
}

impl ProgressConfig {
    pub fn new(operation: &str, context: &str) -> Self {
        Self {
            operation: operation.to_string(),
            context: context.to_string(),
            total: None,
        }
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }
}

pub trait ProgressIndicator: Send + Sync {
    /// Start a new progress operation
    ///
    /// A bar is shown when the configuration has a total, a spinner otherwise.
    fn start(&mut self, config: ProgressConfig);

    fn update(&mut self, current: u64, total: Option<u64>);

    /// Complete the progress operation successfully
    fn complete(&mut self, message: Option<String>);

    fn error(&mut self, message: String);
}
