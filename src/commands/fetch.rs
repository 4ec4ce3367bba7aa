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

use crate::config::KubepkgConfig;
use crate::error::Result;
use crate::models::package::ChannelType;
use crate::version::resolver::VersionResolver;

pub struct FetchVersionCommand<'a> {
    config: &'a KubepkgConfig,
}

impl<'a> FetchVersionCommand<'a> {
    pub fn new(config: &'a KubepkgConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(&self, channel: ChannelType, minor: Option<&str>) -> Result<()> {
        let resolver = VersionResolver::new(self.config);
        log::debug!("Looking up {}", resolver.index_url(channel, minor)?);

        let version = resolver.fetch_channel_version(channel, minor)?;
        println!("{version}");
        Ok(())
    }
}
