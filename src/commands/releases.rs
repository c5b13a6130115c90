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

use crate::catalog::ReleaseResolver;
use crate::config::MmConfig;
use crate::error::Result;
use crate::platform::{TargetPlatform, detect_host_platform};
use crate::version::release_date;
use comfy_table::{Cell, Table};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ReleaseEntry<'a> {
    release: &'a str,
    url: &'a str,
}

pub struct ReleasesCommand<'a> {
    config: &'a MmConfig,
}

impl<'a> ReleasesCommand<'a> {
    pub fn new(config: &'a MmConfig) -> Result<Self> {
        Ok(Self { config })
    }

    /// List available releases, newest first.
    pub fn execute(
        &self,
        platform: Option<TargetPlatform>,
        limit: Option<usize>,
        json: bool,
    ) -> Result<()> {
        let platform = match platform {
            Some(platform) => platform,
            None => detect_host_platform()?,
        };

        let resolver = ReleaseResolver::new(&self.config.catalog, platform)?;
        let catalog = resolver.catalog()?;
        let entries: Vec<ReleaseEntry> = catalog
            .iter()
            .rev()
            .take(limit.unwrap_or(usize::MAX))
            .map(|(release, url)| ReleaseEntry { release, url })
            .collect();

        if json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }

        if entries.is_empty() {
            println!("No {platform} releases found at {}", resolver.listing_url()?);
            return Ok(());
        }

        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_BORDERS_ONLY);
        table.set_header(vec![Cell::new("Release"), Cell::new("Date"), Cell::new("URL")]);
        for entry in &entries {
            let date = release_date(entry.release)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            table.add_row(vec![
                Cell::new(entry.release),
                Cell::new(date),
                Cell::new(entry.url),
            ]);
        }
        println!("{table}");
        println!(
            "{} of {} {platform} releases",
            entries.len(),
            catalog.len()
        );
        Ok(())
    }
}
