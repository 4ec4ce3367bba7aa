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

use attohttpc::Session;
use log::{debug, info};
use std::str::FromStr;

use crate::error::{KubepkgError, Result};
use crate::user_agent;
use crate::version::{Version, strip_tag_prefix};

/// Source of bare version strings, such as the `stable-1.14.txt` index files
/// published on `dl.k8s.io`.
#[cfg_attr(test, mockall::automock)]
pub trait VersionFetcher {
    /// Fetch `url` and return the version it names, trimmed and without the
    /// `v` tag prefix.
    fn fetch_version(&self, url: &str) -> Result<String>;
}

/// Blocking HTTP fetcher for release index files
pub struct HttpVersionFetcher {
    client: Session,
}

impl HttpVersionFetcher {
    pub fn new() -> Self {
        let mut client = Session::new();
        client.header("User-Agent", user_agent::fetch_client());

        Self { client }
    }
}

impl Default for HttpVersionFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionFetcher for HttpVersionFetcher {
    fn fetch_version(&self, url: &str) -> Result<String> {
        if url.trim().is_empty() {
            return Err(KubepkgError::FetchError("URL cannot be empty".to_string()));
        }

        info!("Fetching version index {url}");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| KubepkgError::FetchError(format!("Failed to fetch {url}: {e}")))?;

        if !response.is_success() {
            return Err(KubepkgError::FetchError(format!(
                "Failed to fetch {url}: HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .map_err(|e| KubepkgError::FetchError(format!("Failed to read {url}: {e}")))?;

        let version = strip_tag_prefix(body.trim()).to_string();
        if version.is_empty() {
            return Err(KubepkgError::FetchError(format!(
                "Empty version index at {url}"
            )));
        }

        Version::from_str(&version).map_err(|_| {
            KubepkgError::FetchError(format!("Unparsable version '{version}' at {url}"))
        })?;

        debug!("Version index {url} names {version}");
        Ok(version)
    }
}

#[cfg(test)]
#[path = "fetcher_tests.rs"]
mod tests;
