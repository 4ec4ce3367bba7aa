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
use std::cmp::Ordering;
use std::str::FromStr;

pub mod fetcher;
pub mod resolver;

/// A Kubernetes-style version: `major.minor.patch[-pre_release][+build]`.
///
/// Ordering follows semver precedence: a pre-release sorts below the release
/// it precedes, so `1.18.0-alpha.1 < 1.18.0`. Build metadata only breaks ties
/// between otherwise equal versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub pre_release: Option<String>,
    pub build: Option<String>,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            pre_release: None,
            build: None,
        }
    }

    pub fn with_pre_release(mut self, pre_release: impl Into<String>) -> Self {
        self.pre_release = Some(pre_release.into());
        self
    }

    pub fn with_build(mut self, build: impl Into<String>) -> Self {
        self.build = Some(build.into());
        self
    }

    /// The numeric `major.minor.patch` triple, ignoring any suffix.
    pub fn core(&self) -> (u32, u32, u32) {
        (self.major, self.minor, self.patch)
    }

    pub fn is_prerelease(&self) -> bool {
        self.pre_release.is_some()
    }

    /// The version as published on the release tree: build metadata dropped and
    /// the pre-release cut down to `<label>.<number>`.
    ///
    /// `1.18.0-alpha.1.277+2099c00290d262` becomes `1.18.0-alpha.1`.
    pub fn release_form(&self) -> Version {
        let pre_release = self
            .pre_release
            .as_deref()
            .map(|pre| pre.split('.').take(2).collect::<Vec<_>>().join("."));

        Version {
            major: self.major,
            minor: self.minor,
            patch: self.patch,
            pre_release,
            build: None,
        }
    }
}

/// Strip the `v` tag prefix Kubernetes uses for release tags and index files.
pub fn strip_tag_prefix(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

fn parse_identifiers(part: &str, input: &str) -> Result<String> {
    let valid = part.split('.').all(|identifier| {
        !identifier.is_empty()
            && identifier
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    if valid {
        Ok(part.to_string())
    } else {
        Err(KubepkgError::InvalidVersionFormat(input.to_string()))
    }
}

impl FromStr for Version {
    type Err = KubepkgError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = strip_tag_prefix(s.trim());
        if trimmed.is_empty() {
            return Err(KubepkgError::InvalidVersionFormat(s.to_string()));
        }

        // Build metadata may itself contain '-', so split it off first
        let (remaining, build) = match trimmed.split_once('+') {
            Some((before, build)) => (before, Some(parse_identifiers(build, s)?)),
            None => (trimmed, None),
        };

        let (core, pre_release) = match remaining.split_once('-') {
            Some((before, pre)) => (before, Some(parse_identifiers(pre, s)?)),
            None => (remaining, None),
        };

        let components = core
            .split('.')
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| KubepkgError::InvalidVersionFormat(s.to_string()))
            })
            .collect::<Result<Vec<u32>>>()?;

        let [major, minor, patch] = components[..] else {
            return Err(KubepkgError::InvalidVersionFormat(s.to_string()));
        };

        Ok(Version {
            major,
            minor,
            patch,
            pre_release,
            build,
        })
    }
}

fn compare_identifier(left: &str, right: &str) -> Ordering {
    match (left.parse::<u64>(), right.parse::<u64>()) {
        (Ok(l), Ok(r)) => l.cmp(&r),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => left.cmp(right),
    }
}

fn compare_pre_release(left: Option<&str>, right: Option<&str>) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => {
            let mut left = left.split('.');
            let mut right = right.split('.');
            loop {
                match (left.next(), right.next()) {
                    (None, None) => return Ordering::Equal,
                    (None, Some(_)) => return Ordering::Less,
                    (Some(_), None) => return Ordering::Greater,
                    (Some(l), Some(r)) => match compare_identifier(l, r) {
                        Ordering::Equal => continue,
                        other => return other,
                    },
                }
            }
        }
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.core()
            .cmp(&other.core())
            .then_with(|| {
                compare_pre_release(self.pre_release.as_deref(), other.pre_release.as_deref())
            })
            .then_with(|| self.build.cmp(&other.build))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;

        if let Some(pre_release) = &self.pre_release {
            write!(f, "-{pre_release}")?;
        }

        if let Some(build) = &self.build {
            write!(f, "+{build}")?;
        }

        Ok(())
    }
}
