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

//! Trust roots for HTTPS requests.
//!
//! Certificates are validated against the Mozilla root set compiled into the
//! binary (`webpki-roots`), never the host trust store, so machines with a
//! stale or incomplete system store can still reach the download host.

use attohttpc::{ProxySettings, Session};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustRoots {
    /// Mozilla roots bundled at build time.
    Bundled,
}

#[derive(Debug, Clone)]
pub struct TrustStore {
    roots: TrustRoots,
}

impl Default for TrustStore {
    fn default() -> Self {
        Self::bundled()
    }
}

impl TrustStore {
    pub fn bundled() -> Self {
        Self {
            roots: TrustRoots::Bundled,
        }
    }

    pub fn roots(&self) -> TrustRoots {
        self.roots
    }

    /// Number of trust anchors certificates are checked against.
    pub fn anchor_count(&self) -> usize {
        match self.roots {
            TrustRoots::Bundled => webpki_roots::TLS_SERVER_ROOTS.len(),
        }
    }

    /// Build a session that validates certificates against this store.
    pub fn session(&self, user_agent: &str, timeout: Option<Duration>) -> Session {
        let mut session = Session::new();
        session.header("User-Agent", user_agent.to_string());
        session.proxy_settings(ProxySettings::from_env());
        session.follow_redirects(true);
        if let Some(timeout) = timeout {
            session.timeout(timeout);
        }

        log::trace!(
            "HTTP session using {:?} trust roots ({} anchors)",
            self.roots,
            self.anchor_count()
        );
        session
    }
}
