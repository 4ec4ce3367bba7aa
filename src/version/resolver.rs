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
use crate::models::package::{
    CRI_TOOLS, ChannelType, KUBEADM, KUBECTL, KUBELET, KUBERNETES_BINARIES, KUBERNETES_CNI,
    PackageDefinition, ResolvedPackage,
};
use crate::models::platform::Architecture;
use crate::version::fetcher::{HttpVersionFetcher, VersionFetcher};
use crate::version::{Version, strip_tag_prefix};
use log::{debug, info};
use std::str::FromStr;

pub const MINIMUM_KUBERNETES_VERSION: &str = "1.13.0";
pub const MINIMUM_CRI_TOOLS_VERSION: &str = MINIMUM_KUBERNETES_VERSION;
pub const MINIMUM_CNI_VERSION: &str = "0.8.6";
pub const PRE_117_CNI_VERSION: &str = "0.7.5";

/// Debian substitution variable appended to every dependency list
pub const MISC_DEPENDS: &str = "${misc:Depends}";

/// Kubernetes releases from this one on need the newer CNI plugins.
const CNI_SWITCH_KUBERNETES_VERSION: (u32, u32, u32) = (1, 17, 0);

/// Last CNI plugins release whose archive name carries no OS segment.
const LEGACY_CNI_ARCHIVE_VERSION: Version = Version::new(0, 7, 5);

/// Accepts `1.14` or `v1.14` and returns the bare pair.
fn parse_minor_line(minor: &str) -> Result<&str> {
    let bare = strip_tag_prefix(minor);
    let numeric = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());

    match bare.split_once('.') {
        Some((major, minor_part)) if numeric(major) && numeric(minor_part) => Ok(bare),
        _ => Err(KubepkgError::InvalidInput(format!(
            "Minor line must look like '<major>.<minor>', got '{minor}'"
        ))),
    }
}

fn require(def: Option<&PackageDefinition>) -> Result<&PackageDefinition> {
    def.ok_or_else(|| KubepkgError::InvalidInput("package definition is required".to_string()))
}

/// Turns partially specified package definitions into concrete versions,
/// dependency lists and download links.
///
/// Everything is computed from the definition and the configured endpoints.
/// The fetcher is only consulted on channel-aware paths when no Kubernetes
/// version was given.
pub struct VersionResolver<'a, F = HttpVersionFetcher> {
    config: &'a KubepkgConfig,
    fetcher: F,
}

impl<'a> VersionResolver<'a> {
    pub fn new(config: &'a KubepkgConfig) -> Self {
        Self::with_fetcher(config, HttpVersionFetcher::new())
    }
}

impl<'a, F: VersionFetcher> VersionResolver<'a, F> {
    pub fn with_fetcher(config: &'a KubepkgConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    /// Version of the package itself: the explicit one, a derived one for CNI
    /// and cri-tools, otherwise the Kubernetes version (possibly empty).
    pub fn resolve_package_version(&self, def: Option<&PackageDefinition>) -> Result<String> {
        let def = require(def)?;

        if let Some(version) = def.explicit_version() {
            return Ok(version.to_string());
        }

        match def.name.as_str() {
            KUBERNETES_CNI => self.resolve_cni_version(Some(def)),
            CRI_TOOLS => self.resolve_cri_tools_version(Some(def)),
            _ => self.resolve_kubernetes_version(Some(def)),
        }
    }

    /// The Kubernetes version exactly as given, or an empty string. Never fetches.
    pub fn resolve_kubernetes_version(&self, def: Option<&PackageDefinition>) -> Result<String> {
        let def = require(def)?;
        Ok(def
            .explicit_kubernetes_version()
            .unwrap_or_default()
            .to_string())
    }

    /// The Kubernetes version as given, or the one the definition's channel
    /// index currently points at.
    pub fn resolve_channel_kubernetes_version(
        &self,
        def: Option<&PackageDefinition>,
    ) -> Result<String> {
        let def = require(def)?;

        match def.explicit_kubernetes_version() {
            Some(version) => Ok(version.to_string()),
            None => self.fetch_channel_version(def.channel, None),
        }
    }

    /// Fetch the version named by a channel index, optionally pinned to a
    /// minor line such as `1.14`.
    pub fn fetch_channel_version(&self, channel: ChannelType, minor: Option<&str>) -> Result<String> {
        let url = self.index_url(channel, minor)?;
        let version = self.fetcher.fetch_version(&url)?;
        info!("Channel {channel} resolved to {version}");
        Ok(version)
    }

    /// URL of the index file for `channel`, e.g. `<base>/release/stable-1.14.txt`.
    ///
    /// `minor` must be a `<major>.<minor>` pair; an empty value selects the
    /// unpinned index.
    pub fn index_url(&self, channel: ChannelType, minor: Option<&str>) -> Result<String> {
        let base = &self.config.endpoints.download_base;
        let (tree, marker) = match channel {
            ChannelType::Release => ("release", "stable"),
            ChannelType::Testing => ("release", "latest"),
            ChannelType::Nightly => ("ci", "latest"),
        };

        match minor.map(str::trim).filter(|m| !m.is_empty()) {
            Some(minor) => {
                let minor = parse_minor_line(minor)?;
                Ok(format!("{base}/{tree}/{marker}-{minor}.txt"))
            }
            None => Ok(format!("{base}/{tree}/{marker}.txt")),
        }
    }

    pub fn resolve_cni_version(&self, def: Option<&PackageDefinition>) -> Result<String> {
        let def = require(def)?;

        if let Some(version) = def.explicit_version() {
            return Ok(version.to_string());
        }

        let kubernetes = parse_kubernetes_version(def, "the CNI version")?;
        let version = if kubernetes.core() < CNI_SWITCH_KUBERNETES_VERSION {
            PRE_117_CNI_VERSION
        } else {
            MINIMUM_CNI_VERSION
        };

        debug!("Kubernetes {kubernetes} pairs with CNI plugins {version}");
        Ok(version.to_string())
    }

    /// cri-tools tracks the Kubernetes minor line, but is only published once
    /// that line is released; pre-releases fall back to the previous line.
    pub fn resolve_cri_tools_version(&self, def: Option<&PackageDefinition>) -> Result<String> {
        let def = require(def)?;

        if let Some(version) = def.explicit_version() {
            return Ok(version.to_string());
        }

        let kubernetes = parse_kubernetes_version(def, "the cri-tools version")?;
        let minor = if kubernetes.is_prerelease() {
            kubernetes.minor.checked_sub(1).ok_or_else(|| {
                KubepkgError::InvalidVersionFormat(format!(
                    "No released cri-tools line precedes Kubernetes {kubernetes}"
                ))
            })?
        } else {
            kubernetes.minor
        };

        let version = format!("{}.{minor}.0", kubernetes.major);
        debug!("Kubernetes {kubernetes} pairs with cri-tools {version}");
        Ok(version)
    }

    pub fn resolve_download_link_base(&self, def: Option<&PackageDefinition>) -> Result<String> {
        let def = require(def)?;

        match def.channel {
            ChannelType::Nightly => self.resolve_ci_builds_download_link_base(Some(def)),
            ChannelType::Release | ChannelType::Testing => {
                self.resolve_release_download_link_base(Some(def))
            }
        }
    }

    /// `<base>/ci/v<version>`, keeping the CI build suffix of the version. The
    /// version must still parse, so a marker such as `latest` is rejected.
    pub fn resolve_ci_builds_download_link_base(
        &self,
        def: Option<&PackageDefinition>,
    ) -> Result<String> {
        let def = require(def)?;

        let version = match def.explicit_kubernetes_version() {
            Some(version) => version.to_string(),
            None => self.fetch_channel_version(ChannelType::Nightly, None)?,
        };

        let version = Version::from_str(&version)?;
        Ok(format!("{}/ci/v{version}", self.config.endpoints.download_base))
    }

    /// `<base>/v<version>`, with the version reduced to its published release form.
    pub fn resolve_release_download_link_base(
        &self,
        def: Option<&PackageDefinition>,
    ) -> Result<String> {
        let def = require(def)?;

        let version = match def.explicit_kubernetes_version() {
            Some(version) => version.to_string(),
            None => {
                let channel = match def.channel {
                    ChannelType::Nightly => ChannelType::Release,
                    other => other,
                };
                self.fetch_channel_version(channel, None)?
            }
        };

        let version = Version::from_str(&version)?.release_form();
        Ok(format!("{}/v{version}", self.config.endpoints.download_base))
    }

    /// Dependency line for the kubeadm package. The floors are the same for
    /// every supported Kubernetes version.
    pub fn resolve_kubeadm_dependencies(&self, def: Option<&PackageDefinition>) -> Result<String> {
        let def = require(def)?;
        debug!(
            "Building kubeadm dependencies for version {}",
            def.explicit_version().unwrap_or("<unset>")
        );

        let dependencies = [
            format!("{KUBELET} (>= {MINIMUM_KUBERNETES_VERSION})"),
            format!("{KUBECTL} (>= {MINIMUM_KUBERNETES_VERSION})"),
            format!("{KUBERNETES_CNI} (>= {PRE_117_CNI_VERSION})"),
            format!("{CRI_TOOLS} (>= {MINIMUM_CRI_TOOLS_VERSION})"),
            MISC_DEPENDS.to_string(),
        ];

        Ok(dependencies.join(", "))
    }

    /// Dependency line for packages that declare one; only kubeadm does.
    pub fn resolve_dependencies(&self, def: Option<&PackageDefinition>) -> Result<Option<String>> {
        let def = require(def)?;

        match def.name.as_str() {
            KUBEADM => self.resolve_kubeadm_dependencies(Some(def)).map(Some),
            _ => Ok(None),
        }
    }

    pub fn resolve_cni_download_link(
        &self,
        def: Option<&PackageDefinition>,
        arch: Architecture,
    ) -> Result<String> {
        let def = require(def)?;

        let version = self.resolve_cni_version(Some(def))?;
        let version = strip_tag_prefix(&version);

        // CNI plugins archives gained a "linux-" segment after 0.7.5
        let variant = if Version::from_str(version)? <= LEGACY_CNI_ARCHIVE_VERSION {
            arch.to_string()
        } else {
            format!("linux-{arch}")
        };

        Ok(format!(
            "{}/v{version}/cni-plugins-{variant}-v{version}.tgz",
            self.config.endpoints.cni_release_base
        ))
    }

    pub fn resolve_cri_tools_download_link(
        &self,
        def: Option<&PackageDefinition>,
        arch: Architecture,
    ) -> Result<String> {
        let def = require(def)?;

        let version = self.resolve_cri_tools_version(Some(def))?;
        let version = strip_tag_prefix(&version);

        Ok(format!(
            "{}/v{version}/crictl-v{version}-linux-{arch}.tar.gz",
            self.config.endpoints.cri_tools_release_base
        ))
    }

    /// `<download link base>/bin/linux/<arch>/<binary>` for kubelet, kubectl and kubeadm.
    pub fn resolve_kubernetes_binary_link(
        &self,
        def: Option<&PackageDefinition>,
        arch: Architecture,
    ) -> Result<String> {
        let def = require(def)?;

        if !KUBERNETES_BINARIES.contains(&def.name.as_str()) {
            return Err(KubepkgError::InvalidInput(format!(
                "'{}' is not a Kubernetes release binary",
                def.name
            )));
        }

        let base = self.resolve_download_link_base(Some(def))?;
        Ok(format!("{base}/bin/linux/{arch}/{}", def.name))
    }

    pub fn resolve_download_link(
        &self,
        def: Option<&PackageDefinition>,
        arch: Architecture,
    ) -> Result<String> {
        let def = require(def)?;

        match def.name.as_str() {
            KUBERNETES_CNI => self.resolve_cni_download_link(Some(def), arch),
            CRI_TOOLS => self.resolve_cri_tools_download_link(Some(def), arch),
            name if KUBERNETES_BINARIES.contains(&name) => {
                self.resolve_kubernetes_binary_link(Some(def), arch)
            }
            name => Err(KubepkgError::InvalidInput(format!("Unknown package: '{name}'"))),
        }
    }

    /// Resolve everything about one package for one architecture. The
    /// Kubernetes version is looked up through the channel when it is unset,
    /// and every other value is derived from it.
    pub fn resolve_package(
        &self,
        def: Option<&PackageDefinition>,
        arch: Architecture,
    ) -> Result<ResolvedPackage> {
        let def = require(def)?;

        let kubernetes_version = self.resolve_channel_kubernetes_version(Some(def))?;
        let def = def.clone().with_kubernetes_version(kubernetes_version.clone());

        let version = self.resolve_package_version(Some(&def))?;
        let download_link_base = self.resolve_download_link_base(Some(&def))?;
        let download_url = self.resolve_download_link(Some(&def), arch)?;
        let dependencies = self.resolve_dependencies(Some(&def))?;

        info!(
            "Resolved {} {version} for {arch} (Kubernetes {kubernetes_version})",
            def.name
        );

        Ok(ResolvedPackage {
            name: def.name.clone(),
            version,
            kubernetes_version,
            channel: def.channel,
            architecture: arch,
            download_link_base,
            download_url,
            dependencies,
        })
    }
}

fn parse_kubernetes_version(def: &PackageDefinition, purpose: &str) -> Result<Version> {
    let version = def.explicit_kubernetes_version().ok_or_else(|| {
        KubepkgError::InvalidVersionFormat(format!(
            "a Kubernetes version is required to derive {purpose}"
        ))
    })?;

    Version::from_str(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::fetcher::MockVersionFetcher;

    const CNI_BASE: &str = "https://github.com/containernetworking/plugins/releases/download";

    fn definition(name: &str) -> PackageDefinition {
        PackageDefinition::new(name)
    }

    /// A fetcher that fails the test if it is ever called.
    fn no_fetch() -> MockVersionFetcher {
        let mut fetcher = MockVersionFetcher::new();
        fetcher.expect_fetch_version().never();
        fetcher
    }

    fn fetching(url: &'static str, version: &'static str) -> MockVersionFetcher {
        let mut fetcher = MockVersionFetcher::new();
        fetcher
            .expect_fetch_version()
            .withf(move |requested| requested.to_string() == url)
            .times(1)
            .returning(move |_| Ok(version.to_string()));
        fetcher
    }

    #[test]
    fn test_package_version() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        let cases = [
            (definition("").with_kubernetes_version("1.17.0"), "1.17.0"),
            (definition(""), ""),
            (
                definition(KUBERNETES_CNI)
                    .with_version("0.8.3")
                    .with_kubernetes_version("1.17.0"),
                "0.8.3",
            ),
            (
                definition(CRI_TOOLS).with_kubernetes_version("1.17.0"),
                "1.17.0",
            ),
            (
                definition(KUBERNETES_CNI).with_kubernetes_version("1.16.0"),
                PRE_117_CNI_VERSION,
            ),
            (
                definition(KUBELET)
                    .with_version("1.16.2")
                    .with_kubernetes_version("1.17.0"),
                "1.16.2",
            ),
        ];

        for (def, expected) in cases {
            assert_eq!(
                resolver.resolve_package_version(Some(&def)).unwrap(),
                expected,
                "{def:?}"
            );
        }
    }

    #[test]
    fn test_absent_definition_is_invalid_input() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        let results = [
            resolver.resolve_package_version(None),
            resolver.resolve_kubernetes_version(None),
            resolver.resolve_channel_kubernetes_version(None),
            resolver.resolve_cni_version(None),
            resolver.resolve_cri_tools_version(None),
            resolver.resolve_download_link_base(None),
            resolver.resolve_ci_builds_download_link_base(None),
            resolver.resolve_release_download_link_base(None),
            resolver.resolve_kubeadm_dependencies(None),
            resolver.resolve_cni_download_link(None, Architecture::Amd64),
            resolver.resolve_cri_tools_download_link(None, Architecture::Amd64),
            resolver.resolve_kubernetes_binary_link(None, Architecture::Amd64),
            resolver.resolve_download_link(None, Architecture::Amd64),
        ];

        for result in results {
            assert!(matches!(result, Err(KubepkgError::InvalidInput(_))));
        }
        assert!(matches!(
            resolver.resolve_dependencies(None),
            Err(KubepkgError::InvalidInput(_))
        ));
        assert!(matches!(
            resolver.resolve_package(None, Architecture::Amd64),
            Err(KubepkgError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_explicit_version_always_wins() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        for kubernetes_version in ["1.15.0", "1.16.0", "1.18.0-alpha.1", ""] {
            let def = definition(KUBERNETES_CNI)
                .with_version("0.8.3")
                .with_kubernetes_version(kubernetes_version);

            assert_eq!(resolver.resolve_package_version(Some(&def)).unwrap(), "0.8.3");
            assert_eq!(resolver.resolve_cni_version(Some(&def)).unwrap(), "0.8.3");
            assert_eq!(
                resolver.resolve_cri_tools_version(Some(&def)).unwrap(),
                "0.8.3"
            );
        }
    }

    #[test]
    fn test_kubernetes_version_is_returned_verbatim() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        let def = definition(KUBELET).with_kubernetes_version("1.17.0");
        assert_eq!(resolver.resolve_kubernetes_version(Some(&def)).unwrap(), "1.17.0");

        let nightly = definition(KUBELET).with_channel(ChannelType::Nightly);
        assert_eq!(resolver.resolve_kubernetes_version(Some(&nightly)).unwrap(), "");
    }

    #[test]
    fn test_cni_version() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        let cases = [
            ("1.16.0", PRE_117_CNI_VERSION),
            ("1.16.9-rc.0", PRE_117_CNI_VERSION),
            ("1.17.0", MINIMUM_CNI_VERSION),
            ("1.17.0-alpha.1", MINIMUM_CNI_VERSION),
            ("1.18.0-alpha.1.277+2099c00290d262", MINIMUM_CNI_VERSION),
        ];

        for (kubernetes_version, expected) in cases {
            let def = definition(KUBERNETES_CNI).with_kubernetes_version(kubernetes_version);
            assert_eq!(
                resolver.resolve_cni_version(Some(&def)).unwrap(),
                expected,
                "Kubernetes {kubernetes_version}"
            );
        }
    }

    #[test]
    fn test_cni_version_requires_parsable_kubernetes_version() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        for def in [
            definition(KUBERNETES_CNI),
            definition(KUBERNETES_CNI).with_kubernetes_version("latest"),
        ] {
            assert!(matches!(
                resolver.resolve_cni_version(Some(&def)),
                Err(KubepkgError::InvalidVersionFormat(_))
            ));
        }
    }

    #[test]
    fn test_cri_tools_version() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        let cases = [
            (definition(CRI_TOOLS).with_version("1.17.0"), "1.17.0"),
            (
                definition(CRI_TOOLS).with_kubernetes_version("1.17.0"),
                "1.17.0",
            ),
            (
                definition(CRI_TOOLS).with_kubernetes_version("1.17.3"),
                "1.17.0",
            ),
            (
                definition(CRI_TOOLS).with_kubernetes_version("1.18.0-alpha.1"),
                "1.17.0",
            ),
            (
                definition(CRI_TOOLS).with_kubernetes_version("v1.18.0-alpha.1.277+2099c00290d262"),
                "1.17.0",
            ),
        ];

        for (def, expected) in cases {
            assert_eq!(
                resolver.resolve_cri_tools_version(Some(&def)).unwrap(),
                expected,
                "{def:?}"
            );
        }
    }

    #[test]
    fn test_cri_tools_version_without_earlier_minor_line() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        let def = definition(CRI_TOOLS).with_kubernetes_version("2.0.0-alpha.0");
        assert!(matches!(
            resolver.resolve_cri_tools_version(Some(&def)),
            Err(KubepkgError::InvalidVersionFormat(_))
        ));
    }

    #[test]
    fn test_download_link_base() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        let ci = definition(KUBELET)
            .with_kubernetes_version("1.18.0-alpha.1.277+2099c00290d262")
            .with_channel(ChannelType::Nightly);
        assert_eq!(
            resolver.resolve_download_link_base(Some(&ci)).unwrap(),
            "https://dl.k8s.io/ci/v1.18.0-alpha.1.277+2099c00290d262"
        );

        let release =
            definition(KUBELET).with_kubernetes_version("1.18.0-alpha.1.277+2099c00290d262");
        assert_eq!(
            resolver.resolve_download_link_base(Some(&release)).unwrap(),
            "https://dl.k8s.io/v1.18.0-alpha.1"
        );

        let testing = definition(KUBELET)
            .with_kubernetes_version("1.18.0-alpha.1")
            .with_channel(ChannelType::Testing);
        assert_eq!(
            resolver.resolve_download_link_base(Some(&testing)).unwrap(),
            "https://dl.k8s.io/v1.18.0-alpha.1"
        );
    }

    #[test]
    fn test_ci_builds_download_link_base() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        let def = definition(KUBELET).with_kubernetes_version("1.18.0-alpha.1.277+2099c00290d262");
        assert_eq!(
            resolver
                .resolve_ci_builds_download_link_base(Some(&def))
                .unwrap(),
            "https://dl.k8s.io/ci/v1.18.0-alpha.1.277+2099c00290d262"
        );

        let tagged = definition(KUBELET).with_kubernetes_version("v1.18.0-alpha.1");
        assert_eq!(
            resolver
                .resolve_ci_builds_download_link_base(Some(&tagged))
                .unwrap(),
            "https://dl.k8s.io/ci/v1.18.0-alpha.1"
        );
    }

    #[test]
    fn test_ci_builds_download_link_base_rejects_non_versions() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        for kubernetes_version in ["latest", "not a version/../x"] {
            let def = definition(KUBELET)
                .with_kubernetes_version(kubernetes_version)
                .with_channel(ChannelType::Nightly);

            assert!(matches!(
                resolver.resolve_download_link_base(Some(&def)),
                Err(KubepkgError::InvalidVersionFormat(_))
            ));
            assert!(matches!(
                resolver.resolve_package(Some(&def), Architecture::Amd64),
                Err(KubepkgError::InvalidVersionFormat(_))
            ));
        }
    }

    #[test]
    fn test_release_download_link_base() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        let cases = [
            ("1.17.0", "https://dl.k8s.io/v1.17.0"),
            ("v1.17.0", "https://dl.k8s.io/v1.17.0"),
            ("1.18.0-alpha.1", "https://dl.k8s.io/v1.18.0-alpha.1"),
        ];

        for (kubernetes_version, expected) in cases {
            let def = definition(KUBELET).with_kubernetes_version(kubernetes_version);
            assert_eq!(
                resolver
                    .resolve_release_download_link_base(Some(&def))
                    .unwrap(),
                expected
            );
        }
    }

    #[test]
    fn test_download_link_base_fetches_missing_version() {
        let config = KubepkgConfig::default();

        let resolver = VersionResolver::with_fetcher(
            &config,
            fetching("https://dl.k8s.io/ci/latest.txt", "1.18.0-alpha.1.277+2099c00290d262"),
        );
        let nightly = definition(KUBELET).with_channel(ChannelType::Nightly);
        assert_eq!(
            resolver.resolve_download_link_base(Some(&nightly)).unwrap(),
            "https://dl.k8s.io/ci/v1.18.0-alpha.1.277+2099c00290d262"
        );

        let resolver = VersionResolver::with_fetcher(
            &config,
            fetching("https://dl.k8s.io/release/stable.txt", "1.17.3"),
        );
        let release = definition(KUBELET);
        assert_eq!(
            resolver.resolve_download_link_base(Some(&release)).unwrap(),
            "https://dl.k8s.io/v1.17.3"
        );
    }

    #[test]
    fn test_kubeadm_dependencies() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        let expected = [
            "kubelet (>= 1.13.0)",
            "kubectl (>= 1.13.0)",
            "kubernetes-cni (>= 0.7.5)",
            "cri-tools (>= 1.13.0)",
            "${misc:Depends}",
        ]
        .join(", ");

        for version in ["1.15.0", "1.17.0", "1.18.0-alpha.1", "1.18.0"] {
            let def = definition(KUBEADM).with_version(version);
            assert_eq!(
                resolver.resolve_kubeadm_dependencies(Some(&def)).unwrap(),
                expected,
                "version {version}"
            );
        }
    }

    #[test]
    fn test_dependencies_only_for_kubeadm() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        let kubeadm = definition(KUBEADM);
        assert!(
            resolver
                .resolve_dependencies(Some(&kubeadm))
                .unwrap()
                .unwrap()
                .ends_with(MISC_DEPENDS)
        );

        for name in [KUBELET, KUBECTL, KUBERNETES_CNI, CRI_TOOLS] {
            let def = definition(name);
            assert_eq!(resolver.resolve_dependencies(Some(&def)).unwrap(), None);
        }
    }

    #[test]
    fn test_cni_download_link() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        let cases = [
            (
                "0.7.5",
                Architecture::Amd64,
                format!("{CNI_BASE}/v0.7.5/cni-plugins-amd64-v0.7.5.tgz"),
            ),
            (
                "0.7.1",
                Architecture::Arm64,
                format!("{CNI_BASE}/v0.7.1/cni-plugins-arm64-v0.7.1.tgz"),
            ),
            (
                "0.8.3",
                Architecture::Amd64,
                format!("{CNI_BASE}/v0.8.3/cni-plugins-linux-amd64-v0.8.3.tgz"),
            ),
            (
                "0.8.6",
                Architecture::S390x,
                format!("{CNI_BASE}/v0.8.6/cni-plugins-linux-s390x-v0.8.6.tgz"),
            ),
        ];

        for (version, arch, expected) in cases {
            let def = definition(KUBERNETES_CNI).with_version(version);
            assert_eq!(
                resolver.resolve_cni_download_link(Some(&def), arch).unwrap(),
                expected
            );
        }
    }

    #[test]
    fn test_cni_download_link_derives_version() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        let def = definition(KUBERNETES_CNI).with_kubernetes_version("1.16.3");
        assert_eq!(
            resolver
                .resolve_cni_download_link(Some(&def), Architecture::Amd64)
                .unwrap(),
            format!("{CNI_BASE}/v0.7.5/cni-plugins-amd64-v0.7.5.tgz")
        );
    }

    #[test]
    fn test_cri_tools_download_link() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        let def = definition(CRI_TOOLS).with_kubernetes_version("1.18.0-alpha.1");
        assert_eq!(
            resolver
                .resolve_cri_tools_download_link(Some(&def), Architecture::Arm64)
                .unwrap(),
            "https://github.com/kubernetes-sigs/cri-tools/releases/download/v1.17.0/crictl-v1.17.0-linux-arm64.tar.gz"
        );
    }

    #[test]
    fn test_download_link_dispatch() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        let kubectl = definition(KUBECTL).with_kubernetes_version("1.17.0");
        assert_eq!(
            resolver
                .resolve_download_link(Some(&kubectl), Architecture::Ppc64le)
                .unwrap(),
            "https://dl.k8s.io/v1.17.0/bin/linux/ppc64le/kubectl"
        );

        let cni = definition(KUBERNETES_CNI).with_version("0.8.3");
        assert!(
            resolver
                .resolve_download_link(Some(&cni), Architecture::Amd64)
                .unwrap()
                .ends_with("cni-plugins-linux-amd64-v0.8.3.tgz")
        );

        let unknown = definition("kube-proxy").with_kubernetes_version("1.17.0");
        assert!(matches!(
            resolver.resolve_download_link(Some(&unknown), Architecture::Amd64),
            Err(KubepkgError::InvalidInput(_))
        ));
        assert!(matches!(
            resolver.resolve_kubernetes_binary_link(Some(&cni), Architecture::Amd64),
            Err(KubepkgError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_index_urls() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        let cases = [
            (ChannelType::Release, None, "https://dl.k8s.io/release/stable.txt"),
            (ChannelType::Release, Some("1.14"), "https://dl.k8s.io/release/stable-1.14.txt"),
            (ChannelType::Testing, Some("v1.14"), "https://dl.k8s.io/release/latest-1.14.txt"),
            (ChannelType::Nightly, Some("1.14"), "https://dl.k8s.io/ci/latest-1.14.txt"),
            (ChannelType::Nightly, Some(""), "https://dl.k8s.io/ci/latest.txt"),
        ];

        for (channel, minor, expected) in cases {
            assert_eq!(resolver.index_url(channel, minor).unwrap(), expected);
        }
    }

    #[test]
    fn test_index_url_rejects_malformed_minor_line() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        for minor in ["1.14/../x", "1", "1.", ".14", "1.14.0", "latest", "1.x"] {
            assert!(
                matches!(
                    resolver.index_url(ChannelType::Release, Some(minor)),
                    Err(KubepkgError::InvalidInput(_))
                ),
                "expected {minor:?} to be rejected"
            );
            assert!(matches!(
                resolver.fetch_channel_version(ChannelType::Testing, Some(minor)),
                Err(KubepkgError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_channel_kubernetes_version() {
        let config = KubepkgConfig::default();

        let resolver = VersionResolver::with_fetcher(&config, no_fetch());
        let explicit = definition(KUBELET)
            .with_kubernetes_version("1.17.0")
            .with_channel(ChannelType::Nightly);
        assert_eq!(
            resolver
                .resolve_channel_kubernetes_version(Some(&explicit))
                .unwrap(),
            "1.17.0"
        );

        let resolver = VersionResolver::with_fetcher(
            &config,
            fetching("https://dl.k8s.io/release/latest.txt", "1.18.0-beta.2"),
        );
        let testing = definition(KUBELET).with_channel(ChannelType::Testing);
        assert_eq!(
            resolver
                .resolve_channel_kubernetes_version(Some(&testing))
                .unwrap(),
            "1.18.0-beta.2"
        );
    }

    #[test]
    fn test_fetch_errors_propagate() {
        let config = KubepkgConfig::default();
        let mut fetcher = MockVersionFetcher::new();
        fetcher
            .expect_fetch_version()
            .returning(|url| Err(KubepkgError::FetchError(format!("{url} unreachable"))));
        let resolver = VersionResolver::with_fetcher(&config, fetcher);

        let def = definition(KUBELET);
        assert!(matches!(
            resolver.resolve_package(Some(&def), Architecture::Amd64),
            Err(KubepkgError::FetchError(_))
        ));
    }

    #[test]
    fn test_resolve_package_kubeadm() {
        let config = KubepkgConfig::default();
        let resolver = VersionResolver::with_fetcher(
            &config,
            fetching("https://dl.k8s.io/release/stable.txt", "1.17.3"),
        );

        let resolved = resolver
            .resolve_package(Some(&definition(KUBEADM)), Architecture::Amd64)
            .unwrap();

        assert_eq!(resolved.name, "kubeadm");
        assert_eq!(resolved.version, "1.17.3");
        assert_eq!(resolved.kubernetes_version, "1.17.3");
        assert_eq!(resolved.channel, ChannelType::Release);
        assert_eq!(resolved.download_link_base, "https://dl.k8s.io/v1.17.3");
        assert_eq!(
            resolved.download_url,
            "https://dl.k8s.io/v1.17.3/bin/linux/amd64/kubeadm"
        );
        assert!(resolved.dependencies.unwrap().starts_with("kubelet (>= 1.13.0)"));
    }

    #[test]
    fn test_resolve_package_cni_on_custom_mirror() {
        let mut config = KubepkgConfig::default();
        config.endpoints.download_base = "https://mirror.example.com".to_string();
        config.endpoints.cni_release_base = "https://mirror.example.com/cni".to_string();
        let resolver = VersionResolver::with_fetcher(&config, no_fetch());

        let def = definition(KUBERNETES_CNI).with_kubernetes_version("1.17.0");
        let resolved = resolver
            .resolve_package(Some(&def), Architecture::Arm)
            .unwrap();

        assert_eq!(resolved.version, MINIMUM_CNI_VERSION);
        assert_eq!(resolved.download_link_base, "https://mirror.example.com/v1.17.0");
        assert_eq!(
            resolved.download_url,
            "https://mirror.example.com/cni/v0.8.6/cni-plugins-linux-arm-v0.8.6.tgz"
        );
        assert_eq!(resolved.dependencies, None);
    }
}
