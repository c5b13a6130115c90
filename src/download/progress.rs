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

use super::ProgressReporter;
use crate::indicator::{ProgressConfig, ProgressFactory, ProgressIndicator};

pub struct DownloadProgressAdapter {
    indicator: Box<dyn ProgressIndicator>,
    context: String,
}

impl DownloadProgressAdapter {
    pub fn new(no_progress: bool, artifact_name: &str) -> Self {
        Self::with_indicator(ProgressFactory::create(no_progress), artifact_name)
    }

    pub fn with_indicator(indicator: Box<dyn ProgressIndicator>, artifact_name: &str) -> Self {
        Self {
            indicator,
            context: artifact_name.to_string(),
        }
    }
}

impl ProgressReporter for DownloadProgressAdapter {
    fn on_start(&mut self, total_bytes: u64) {
        let config = ProgressConfig::new("Downloading", &self.context);
        let config = if total_bytes > 0 {
            config.with_total(total_bytes)
        } else {
            config
        };
        self.indicator.start(config);
    }

    fn on_progress(&mut self, bytes_downloaded: u64) {
        self.indicator.update(bytes_downloaded, None);
    }

    fn on_complete(&mut self) {
        self.indicator
            .complete(Some("Download complete".to_string()));
    }

    fn on_error(&mut self, message: &str) {
        self.indicator.error(message.to_string());
    }
}
