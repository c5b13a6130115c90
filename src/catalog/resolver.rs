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

use crate::catalog::{CatalogCache, ReleaseCatalog};
use crate::config::{CatalogConfig, LatestSource};
use crate::download::{AttohttpcClient, HttpClient};
use crate::error::{MmError, Result};
use crate::platform::TargetPlatform;
use crate::user_agent;
use std::io::Read;
use std::sync::Arc;
use url::Url;

/// Sentinel release token meaning "the most recent build".
pub const LATEST: &str = "latest";

/// A release token paired with the installer URL it resolved to.
///
/// For `latest` resolved through the catalog, `token` is the concrete
/// identifier that was picked, not the sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRelease {
    pub token: String,
    pub url: String,
}

/// Resolves release tokens against the nightly listing of one platform.
///
/// Parsed listings live in a [`CatalogCache`] shared across resolvers, so a
/// listing is fetched at most once per process. A failed fetch is not cached
/// and the next call tries again.
pub struct ReleaseResolver {
    base_url: Url,
    channel_path: String,
    preview_count: usize,
    latest_source: LatestSource,
    platform: TargetPlatform,
    client: Box<dyn HttpClient>,
    cache: CatalogCache,
}

impl ReleaseResolver {
    pub fn new(config: &CatalogConfig, platform: TargetPlatform) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url()?,
            channel_path: config.channel_path.trim_matches('/').to_string(),
            preview_count: config.preview_count,
            latest_source: config.latest_source,
            platform,
            client: Box::new(AttohttpcClient::new(user_agent::catalog_client())),
            cache: CatalogCache::process(),
        })
    }

    pub fn with_client(mut self, client: Box<dyn HttpClient>) -> Self {
        self.client = client;
        self
    }

    /// Use `cache` instead of the process-wide one.
    pub fn with_cache(mut self, cache: CatalogCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn platform(&self) -> TargetPlatform {
        self.platform
    }

    /// `{base}/{channel}/{Mac|Windows}/`
    pub fn listing_url(&self) -> Result<Url> {
        let path = format!("{}/{}/", self.channel_path, self.platform.listing_dir());
        self.base_url
            .join(&path)
            .map_err(|e| MmError::InvalidConfig(format!("catalog listing path '{path}': {e}")))
    }

    /// The parsed catalog, fetching the listing unless it is already cached.
    pub fn catalog(&self) -> Result<Arc<ReleaseCatalog>> {
        let listing_url = self.listing_url()?;
        self.cache
            .get_or_fetch(&listing_url, || self.fetch_catalog(&listing_url))
    }

    /// Map a release token to the installer URL.
    pub fn resolve(&self, token: &str) -> Result<ResolvedRelease> {
        let token = token.trim();

        if token.eq_ignore_ascii_case(LATEST) {
            return self.resolve_latest();
        }

        let catalog = self.catalog()?;
        match catalog.get(token) {
            Some(url) => {
                log::debug!("Release {token} resolves to {url}");
                Ok(ResolvedRelease {
                    token: token.to_string(),
                    url: url.to_string(),
                })
            }
            None => Err(MmError::ReleaseNotFound {
                release: token.to_string(),
                preview: catalog.preview(self.preview_count),
            }),
        }
    }

    fn resolve_latest(&self) -> Result<ResolvedRelease> {
        match self.latest_source {
            LatestSource::Direct => {
                let path = self.platform.direct_latest_path();
                let url = self.base_url.join(path).map_err(|e| {
                    MmError::InvalidConfig(format!("latest installer path '{path}': {e}"))
                })?;
                log::debug!("Using fixed latest installer URL {url}");
                Ok(ResolvedRelease {
                    token: LATEST.to_string(),
                    url: url.to_string(),
                })
            }
            LatestSource::Catalog => {
                let catalog = self.catalog()?;
                let (identifier, url) = catalog.latest().ok_or_else(|| MmError::ReleaseNotFound {
                    release: LATEST.to_string(),
                    preview: Vec::new(),
                })?;
                log::info!("Latest {} release is {identifier}", self.platform);
                Ok(ResolvedRelease {
                    token: identifier.to_string(),
                    url: url.to_string(),
                })
            }
        }
    }

    fn fetch_catalog(&self, listing_url: &Url) -> Result<ReleaseCatalog> {
        log::debug!("Fetching release listing from {listing_url}");

        let mut response = self.client.get(listing_url.as_str()).map_err(|e| match e {
            // The client reports transport failures as download errors
            MmError::Download(msg) => MmError::CatalogFetch(msg),
            other => MmError::CatalogFetch(other.to_string()),
        })?;

        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(MmError::CatalogFetch(format!(
                "HTTP {status} from {listing_url}"
            )));
        }

        let mut body = String::new();
        response
            .read_to_string(&mut body)
            .map_err(|e| MmError::CatalogFetch(format!("reading {listing_url}: {e}")))?;

        Ok(ReleaseCatalog::from_listing(
            &body,
            listing_url,
            self.platform,
        ))
    }
}
