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

use crate::catalog::ReleaseCatalog;
use crate::error::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use url::Url;

static PROCESS_CACHE: OnceLock<CatalogCache> = OnceLock::new();

/// Parsed listings keyed by listing URL.
///
/// Clones share the same entries. Resolvers built through
/// [`ReleaseResolver::new`](crate::catalog::ReleaseResolver::new) use the
/// process-wide cache, so a listing is fetched once per process no matter how
/// many installs run.
#[derive(Clone, Default)]
pub struct CatalogCache {
    entries: Arc<Mutex<HashMap<Url, Arc<ReleaseCatalog>>>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by every resolver in this process.
    pub fn process() -> Self {
        PROCESS_CACHE.get_or_init(CatalogCache::new).clone()
    }

    /// Return the cached catalog for `url`, calling `fetch` on a miss.
    ///
    /// The lock is held across `fetch` so concurrent callers for the same
    /// listing wait for one download. Errors are not cached.
    pub fn get_or_fetch<F>(&self, url: &Url, fetch: F) -> Result<Arc<ReleaseCatalog>>
    where
        F: FnOnce() -> Result<ReleaseCatalog>,
    {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(catalog) = entries.get(url) {
            log::trace!("Release listing {url} served from cache");
            return Ok(Arc::clone(catalog));
        }

        let catalog = Arc::new(fetch()?);
        entries.insert(url.clone(), Arc::clone(&catalog));
        Ok(catalog)
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(url)
    }
}
