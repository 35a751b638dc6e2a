// Copyright 2024 FastLabs Developers
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

//! Loading and parsing of configuration documents.
//!
//! A document is relaxed JSON (JSON5: comments, trailing commas and unquoted keys are
//! accepted) with four optional top-level sections:
//!
//! ```json5
//! {
//!     THREAD_POOL: { thread_count: 1, queue_size: 8192 },
//!     SINKS: { console: { type: "stdout_color_sink_mt", level: "info" } },
//!     PATTERNS: { short: "[%n] %v" },
//!     LOGGERS: { APP: { sinks: ["console"], pattern: "short", level: "debug" } },
//! }
//! ```

use std::io;
use std::path::Path;

use crate::Error;
use crate::ErrorKind;

mod document;

pub use self::document::ConfigDocument;
pub use self::document::LoggerConfig;
pub use self::document::SinkConfig;
pub use self::document::ThreadPoolConfig;

const EXCERPT_LEN: usize = 24;

/// Read the whole configuration file at `path`.
pub fn read(path: impl AsRef<Path>) -> Result<String, Error> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|err| {
        let err = match err.kind() {
            io::ErrorKind::NotFound => {
                Error::new(ErrorKind::ConfigNotFound, "configuration file not found")
                    .with_source(err)
            }
            _ => Error::new(ErrorKind::ConfigReadFailure, "failed to read configuration file")
                .with_source(err),
        };
        err.with_context("path", path.display())
    })
}

/// Parse a configuration document.
///
/// Syntax errors carry the byte offset of the failure and a short excerpt of the text there.
pub fn parse(text: &str) -> Result<ConfigDocument, Error> {
    let value = json5::from_str::<serde_json::Value>(text).map_err(|err| syntax_error(text, err))?;
    if !value.is_object() {
        return Err(Error::new(
            ErrorKind::ConfigInvalid,
            "configuration document must be an object",
        ));
    }

    serde_json::from_value(value).map_err(|err| {
        Error::new(ErrorKind::ConfigInvalid, "malformed configuration section").with_source(err)
    })
}

/// Read and parse the configuration file at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<ConfigDocument, Error> {
    let path = path.as_ref();
    let text = read(path)?;
    parse(&text).map_err(|err| err.with_context("path", path.display()))
}

fn syntax_error(text: &str, err: json5::Error) -> Error {
    let json5::Error::Message { msg, location } = err;
    let offset = match location {
        Some(location) => line_column_to_offset(text, location.line, location.column),
        None => text.len(),
    };

    let near = text[offset..].chars().take(EXCERPT_LEN).collect::<String>();
    Error::new(ErrorKind::ConfigSyntaxError, msg)
        .with_offset(offset)
        .with_context("near", format!("{near:?}"))
}

/// Convert a 1-based line and character column into a byte offset of `text`.
fn line_column_to_offset(text: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (index, content) in text.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            return offset
                + content
                    .char_indices()
                    .nth(column.saturating_sub(1))
                    .map_or(content.len(), |(pos, _)| pos);
        }
        offset += content.len();
    }
    text.len()
}
