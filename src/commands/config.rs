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
use crate::error::{KubepkgError, Result};

pub struct ConfigCommand<'a> {
    config: &'a KubepkgConfig,
}

impl<'a> ConfigCommand<'a> {
    pub fn new(config: &'a KubepkgConfig) -> Result<Self> {
        Ok(Self { config })
    }

    /// Print the effective configuration, environment overrides included.
    pub fn show(&self) -> Result<()> {
        print!("{}", self.render()?);
        Ok(())
    }

    /// Write a config file holding the default endpoints.
    pub fn init(&self, force: bool) -> Result<()> {
        let path = self.config.config_path();
        if path.exists() && !force {
            return Err(KubepkgError::ConfigError(format!(
                "{} already exists; pass --force to overwrite it",
                path.display()
            )));
        }

        KubepkgConfig::new(self.config.home().to_path_buf()).save()?;
        println!("Wrote {}", path.display());
        Ok(())
    }

    fn render(&self) -> Result<String> {
        Ok(format!(
            "# {}\n{}",
            self.config.config_path().display(),
            self.config.to_toml()?
        ))
    }
}
