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
use crate::models::platform::Architecture;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const KUBELET: &str = "kubelet";
pub const KUBECTL: &str = "kubectl";
pub const KUBEADM: &str = "kubeadm";
pub const KUBERNETES_CNI: &str = "kubernetes-cni";
pub const CRI_TOOLS: &str = "cri-tools";

/// Packages whose payload is a single binary published under the Kubernetes
/// release tree.
pub const KUBERNETES_BINARIES: [&str; 3] = [KUBELET, KUBECTL, KUBEADM];

/// Which release index governs version resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    #[default]
    Release,
    Testing,
    Nightly,
}

impl FromStr for ChannelType {
    type Err = KubepkgError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "release" | "stable" => Ok(ChannelType::Release),
            "testing" => Ok(ChannelType::Testing),
            "nightly" | "ci" => Ok(ChannelType::Nightly),
            _ => Err(KubepkgError::InvalidInput(format!("Unknown channel: {s}"))),
        }
    }
}

impl std::fmt::Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let channel = match self {
            ChannelType::Release => "release",
            ChannelType::Testing => "testing",
            ChannelType::Nightly => "nightly",
        };
        write!(f, "{channel}")
    }
}

/// A partially specified package: whatever is left unset gets resolved.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PackageDefinition {
    pub name: String,
    pub version: Option<String>,
    pub kubernetes_version: Option<String>,
    #[serde(default)]
    pub channel: ChannelType,
}

impl PackageDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_kubernetes_version(mut self, version: impl Into<String>) -> Self {
        self.kubernetes_version = Some(version.into());
        self
    }

    pub fn with_channel(mut self, channel: ChannelType) -> Self {
        self.channel = channel;
        self
    }

    /// Explicit package version, if one was given. Empty strings count as unset.
    pub fn explicit_version(&self) -> Option<&str> {
        non_empty(self.version.as_deref())
    }

    /// Explicit Kubernetes version, if one was given. Empty strings count as unset.
    pub fn explicit_kubernetes_version(&self) -> Option<&str> {
        non_empty(self.kubernetes_version.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Everything derived for one package on one architecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPackage {
    pub name: String,
    pub version: String,
    pub kubernetes_version: String,
    pub channel: ChannelType,
    pub architecture: Architecture,
    pub download_link_base: String,
    pub download_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<String>,
}
