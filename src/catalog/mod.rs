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

//! Release catalog: which nightly builds exist and where to fetch them.
//!
//! The catalog is scraped from the download host's directory listing. Each
//! installer link yields one entry keyed by its release identifier, the
//! date-coded token at the end of the file name.

mod cache;
mod listing;
mod resolver;

pub use cache::CatalogCache;
pub use listing::ReleaseCatalog;
pub use resolver::{LATEST, ReleaseResolver, ResolvedRelease};
