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
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Target architecture, named the way Debian and the Kubernetes release
/// artifacts name it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    Amd64,
    Arm,
    Arm64,
    Ppc64le,
    S390x,
}

impl Architecture {
    pub const ALL: [Architecture; 5] = [
        Architecture::Amd64,
        Architecture::Arm,
        Architecture::Arm64,
        Architecture::Ppc64le,
        Architecture::S390x,
    ];
}

impl FromStr for Architecture {
    type Err = KubepkgError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "amd64" | "x86_64" => Ok(Architecture::Amd64),
            "arm" | "armhf" => Ok(Architecture::Arm),
            "arm64" | "aarch64" => Ok(Architecture::Arm64),
            "ppc64le" => Ok(Architecture::Ppc64le),
            "s390x" => Ok(Architecture::S390x),
            _ => {
                let known = Architecture::ALL.map(|arch| arch.to_string()).join(", ");
                Err(KubepkgError::InvalidInput(format!(
                    "Unknown architecture: {s} (expected one of {known})"
                )))
            }
        }
    }
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let arch = match self {
            Architecture::Amd64 => "amd64",
            Architecture::Arm => "arm",
            Architecture::Arm64 => "arm64",
            Architecture::Ppc64le => "ppc64le",
            Architecture::S390x => "s390x",
        };
        write!(f, "{arch}")
    }
}
