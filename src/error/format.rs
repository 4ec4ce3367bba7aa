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

use crate::error::{ErrorContext, KubepkgError};
use std::fmt::Write;

const RED_BOLD: &str = "\x1b[1;31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Render an error for stderr as `error:` / `details:` / `hint:` lines.
///
/// Only the labels are styled when `use_color` is set, so the messages stay
/// grep-able either way.
pub fn format_error(error: &KubepkgError, use_color: bool) -> String {
    let context = ErrorContext::new(error);
    let label = |name: &str, style: &str| {
        if use_color {
            format!("{style}{name}:{RESET}")
        } else {
            format!("{name}:")
        }
    };

    let mut output = String::new();
    let _ = writeln!(output, "{} {error}", label("error", RED_BOLD));

    if let Some(details) = &context.details {
        let _ = writeln!(output, "{} {details}", label("details", YELLOW));
    }

    if let Some(suggestion) = &context.suggestion {
        let _ = writeln!(output, "{} {suggestion}", label("hint", YELLOW));
    }

    output
}
