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
use crate::models::package::{PackageDefinition, ResolvedPackage};
use crate::models::platform::Architecture;
use crate::version::resolver::VersionResolver;

pub struct ResolveCommand<'a> {
    config: &'a KubepkgConfig,
}

impl<'a> ResolveCommand<'a> {
    pub fn new(config: &'a KubepkgConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn execute(&self, def: &PackageDefinition, arch: Architecture, json: bool) -> Result<()> {
        let resolver = VersionResolver::new(self.config);
        let resolved = resolver.resolve_package(Some(def), arch)?;

        if json {
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        } else {
            print!("{}", format_standard_output(&resolved));
        }

        Ok(())
    }
}

fn format_standard_output(resolved: &ResolvedPackage) -> String {
    let mut rows = vec![
        ("name", resolved.name.clone()),
        ("version", resolved.version.clone()),
        ("kubernetes version", resolved.kubernetes_version.clone()),
        ("channel", resolved.channel.to_string()),
        ("architecture", resolved.architecture.to_string()),
        ("download base", resolved.download_link_base.clone()),
        ("download url", resolved.download_url.clone()),
    ];
    if let Some(dependencies) = &resolved.dependencies {
        rows.push(("depends", dependencies.clone()));
    }

    rows.iter()
        .map(|(label, value)| format!("{:<20}{value}\n", format!("{label}:")))
        .collect()
}
