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

//! Version label stamped onto the packaged libraries.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Format of date-coded release tokens.
const RELEASE_DATE_FORMAT: &str = "%Y%m%d";

/// `<interface>.<year>.<month>.<day>`, or just `<interface>` when the
/// release token carries no date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionLabel {
    pub interface: i64,
    pub date: Option<NaiveDate>,
}

impl VersionLabel {
    pub fn new(interface: i64, release_token: &str) -> Self {
        Self {
            interface,
            date: release_date(release_token),
        }
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.date {
            Some(date) => {
                use chrono::Datelike;
                write!(
                    f,
                    "{}.{}.{}.{}",
                    self.interface,
                    date.year(),
                    date.month(),
                    date.day()
                )
            }
            None => write!(f, "{}", self.interface),
        }
    }
}

/// Build date encoded in a release token such as `20240501`.
pub fn release_date(token: &str) -> Option<NaiveDate> {
    if token.len() != 8 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(token, RELEASE_DATE_FORMAT).ok()
}
