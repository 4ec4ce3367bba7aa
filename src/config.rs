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

use crate::error::{KubepkgError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.toml";
const HOME_ENV_VAR: &str = "KUBEPKG_HOME";
const ENV_PREFIX: &str = "KUBEPKG";

pub const DEFAULT_DOWNLOAD_BASE: &str = "https://dl.k8s.io";
pub const DEFAULT_CNI_RELEASE_BASE: &str =
    "https://github.com/containernetworking/plugins/releases/download";
pub const DEFAULT_CRI_TOOLS_RELEASE_BASE: &str =
    "https://github.com/kubernetes-sigs/cri-tools/releases/download";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KubepkgConfig {
    #[serde(skip)]
    home: PathBuf,

    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

/// Base URLs every resolved link and index lookup is built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Root of the Kubernetes artifact host; `/ci`, `/release` and `/v<version>` hang off it.
    #[serde(default = "default_download_base")]
    pub download_base: String,

    #[serde(default = "default_cni_release_base")]
    pub cni_release_base: String,

    #[serde(default = "default_cri_tools_release_base")]
    pub cri_tools_release_base: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            download_base: default_download_base(),
            cni_release_base: default_cni_release_base(),
            cri_tools_release_base: default_cri_tools_release_base(),
        }
    }
}

impl EndpointsConfig {
    fn normalize(&mut self) {
        for base in [
            &mut self.download_base,
            &mut self.cni_release_base,
            &mut self.cri_tools_release_base,
        ] {
            let trimmed = base.trim().trim_end_matches('/').to_string();
            *base = trimmed;
        }
    }
}

fn default_download_base() -> String {
    DEFAULT_DOWNLOAD_BASE.to_string()
}

fn default_cni_release_base() -> String {
    DEFAULT_CNI_RELEASE_BASE.to_string()
}

fn default_cri_tools_release_base() -> String {
    DEFAULT_CRI_TOOLS_RELEASE_BASE.to_string()
}

/// Load the configuration from `$KUBEPKG_HOME` (or the platform config dir),
/// with `KUBEPKG_*` environment variables layered on top.
pub fn new_kubepkg_config() -> Result<KubepkgConfig> {
    KubepkgConfig::load(&kubepkg_home()?)
}

fn kubepkg_home() -> Result<PathBuf> {
    if let Ok(home) = env::var(HOME_ENV_VAR)
        && !home.is_empty()
    {
        return Ok(PathBuf::from(home));
    }

    dirs::config_dir()
        .map(|dir| dir.join("kubepkg"))
        .ok_or_else(|| {
            KubepkgError::ConfigError(format!(
                "Unable to determine a config directory; set {HOME_ENV_VAR}"
            ))
        })
}

impl KubepkgConfig {
    pub fn new(home: PathBuf) -> Self {
        Self {
            home,
            endpoints: EndpointsConfig::default(),
        }
    }

    pub fn load(home: &Path) -> Result<Self> {
        let config_path = home.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            log::debug!("Loading config from {config_path:?}");
        } else {
            log::debug!("Config file not found at {config_path:?}, using defaults");
        }

        let settings = Config::builder()
            .add_source(
                File::from(config_path)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| KubepkgError::ConfigError(format!("Failed to load config: {e}")))?;

        let mut config: KubepkgConfig = settings
            .try_deserialize()
            .map_err(|e| KubepkgError::ConfigError(format!("Failed to parse config: {e}")))?;

        config.home = home.to_path_buf();
        config.endpoints.normalize();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = self.config_path();

        fs::create_dir_all(&self.home)?;
        fs::write(&config_path, self.to_toml()?)?;
        log::debug!("Saved config to {config_path:?}");
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| KubepkgError::ConfigError(format!("Failed to serialize config: {e}")))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join(CONFIG_FILE_NAME)
    }
}
