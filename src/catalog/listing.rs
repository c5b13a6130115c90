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

use crate::platform::TargetPlatform;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use url::Url;

static HREF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href="([^"]+)""#).expect("href pattern is a valid regex")
});

/// Marker in installer names built for 32-bit hosts.
const THIRTY_TWO_BIT_MARKER: &str = "32bit";

/// Mapping of release identifier to installer URL.
///
/// Identifiers sort lexicographically, which for the date-coded tokens the
/// nightly channel uses is also chronological order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseCatalog {
    entries: BTreeMap<String, String>,
}

impl ReleaseCatalog {
    /// Parse a directory listing page fetched from `listing_url`.
    ///
    /// Links pointing at the site root, at directories, at 32-bit builds, or
    /// consisting only of a query or fragment are skipped. When two links map
    /// to the same identifier the later one wins.
    pub fn from_listing(html: &str, listing_url: &Url, platform: TargetPlatform) -> Self {
        let delimiter = platform.identifier_delimiter();
        let mut entries = BTreeMap::new();

        for capture in HREF_PATTERN.captures_iter(html) {
            let link = &capture[1];
            if !is_installer_link(link) {
                continue;
            }

            let url = match listing_url.join(link) {
                Ok(url) => url,
                Err(e) => {
                    log::warn!("Skipping unparsable link '{link}': {e}");
                    continue;
                }
            };

            let Some(identifier) = release_identifier(link, delimiter) else {
                log::trace!("No release identifier in '{link}'");
                continue;
            };
            entries.insert(identifier.to_string(), url.to_string());
        }

        log::debug!(
            "Parsed {} releases from listing at {listing_url}",
            entries.len()
        );
        Self { entries }
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.entries.get(identifier).map(String::as_str)
    }

    /// The maximum identifier and its URL.
    pub fn latest(&self) -> Option<(&str, &str)> {
        self.entries
            .last_key_value()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Identifiers in ascending order.
    pub fn identifiers(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The newest `count` identifiers, in ascending order.
    pub fn preview(&self, count: usize) -> Vec<String> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.keys().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_installer_link(link: &str) -> bool {
    link != "/"
        && !link.contains(THIRTY_TWO_BIT_MARKER)
        && !link.ends_with('/')
        && !link.starts_with('?')
        && !link.starts_with('#')
}

/// Text after the last `delimiter` in the link, cut at its first `.`.
fn release_identifier(link: &str, delimiter: char) -> Option<&str> {
    let tail = link.rsplit(delimiter).next()?;
    let identifier = tail.split('.').next()?;
    if identifier.is_empty() {
        None
    } else {
        Some(identifier)
    }
}
