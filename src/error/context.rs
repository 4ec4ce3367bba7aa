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

use crate::error::KubepkgError;

pub struct ErrorContext<'a> {
    pub error: &'a KubepkgError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl<'a> ErrorContext<'a> {
    pub fn new(error: &'a KubepkgError) -> Self {
        let (suggestion, details) = match error {
            KubepkgError::InvalidInput(msg) => {
                let suggestion = Some(
                    "Provide a package definition with a name, e.g. 'kubepkg resolve kubelet \
                     --kube-version 1.17.0'."
                        .to_string(),
                );
                let details = Some(format!("Rejected input: {msg}"));
                (suggestion, details)
            }
            KubepkgError::InvalidVersionFormat(msg) => {
                let suggestion = Some(
                    "Versions must look like '<major>.<minor>.<patch>' with an optional \
                     pre-release, e.g. '1.17.0' or '1.18.0-alpha.1'."
                        .to_string(),
                );
                let details = Some(format!("Invalid format: {msg}"));
                (suggestion, details)
            }
            KubepkgError::FetchError(msg) => {
                let suggestion = Some(
                    "Check your internet connection and proxy settings, or pass an explicit \
                     --kube-version to skip the release index lookup."
                        .to_string(),
                );
                let details = Some(format!("Release index lookup failed: {msg}"));
                (suggestion, details)
            }
            KubepkgError::ConfigError(msg) => {
                let suggestion = Some(
                    "Check config.toml in your kubepkg home directory, or the \
                     KUBEPKG_ENDPOINTS__* environment variables."
                        .to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            KubepkgError::Io(io_err) => {
                let suggestion = match io_err.kind() {
                    std::io::ErrorKind::PermissionDenied => {
                        Some("Check permissions of the kubepkg home directory.".to_string())
                    }
                    std::io::ErrorKind::NotFound => Some(
                        "Ensure the file or directory exists and the path is correct.".to_string(),
                    ),
                    _ => None,
                };
                let details = Some(format!("I/O error: {io_err}"));
                (suggestion, details)
            }
            _ => (None, None),
        };

        ErrorContext {
            error,
            suggestion,
            details,
        }
    }
}
