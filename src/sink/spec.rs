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

use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use crate::config::SinkConfig;
use crate::sink::SinkKind;

/// Path of a `basic_file_sink_*` without `file_name`.
pub const DEFAULT_BASIC_FILE_NAME: &str = "./log_file.log";
/// Path of a `daily_file_sink_*` without `base_file_name`.
pub const DEFAULT_DAILY_FILE_NAME: &str = "./daily.log";
/// Path of a `rotating_file_sink_*` without `base_file_name`.
pub const DEFAULT_ROTATING_FILE_NAME: &str = "./rotate.log";
/// Size limit of a rotating file without `max_size`: 10 MiB.
pub const DEFAULT_MAX_SIZE: u64 = 10 * 1024 * 1024;
/// Number of rotated files kept without `max_files`.
pub const DEFAULT_MAX_FILES: usize = 10;

/// A sink kind together with its type-specific parameters, defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSpec {
    kind: SinkKind,
    params: SinkParams,
}

/// Type-specific parameters of a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkParams {
    /// Console sinks take no parameters.
    Console,
    /// Syslog sinks tag their messages with `ident`.
    Syslog { ident: String },
    /// A single file.
    BasicFile { path: PathBuf, truncate: bool },
    /// One file per day, switched at `rotation_hour:rotation_minute` local time.
    DailyFile {
        base: PathBuf,
        rotation_hour: u8,
        rotation_minute: u8,
        truncate: bool,
    },
    /// Size-based rotation.
    RotatingFile {
        base: PathBuf,
        max_size: u64,
        max_files: usize,
    },
}

impl SinkSpec {
    /// Pair a kind with explicit parameters.
    pub fn new(kind: SinkKind, params: SinkParams) -> Self {
        Self { kind, params }
    }

    /// Read the parameters `kind` needs from `config`, filling in defaults for absent fields.
    pub fn from_config(name: &str, kind: SinkKind, config: &SinkConfig) -> Self {
        let params = match kind {
            SinkKind::StdoutSt
            | SinkKind::StdoutMt
            | SinkKind::StderrSt
            | SinkKind::StderrMt
            | SinkKind::StdoutColorSt
            | SinkKind::StdoutColorMt
            | SinkKind::StderrColorSt
            | SinkKind::StderrColorMt => SinkParams::Console,
            SinkKind::SyslogSt | SinkKind::SyslogMt => SinkParams::Syslog {
                ident: or_default(name, "ident", config.ident.clone(), String::new()),
            },
            SinkKind::BasicFileSt | SinkKind::BasicFileMt => SinkParams::BasicFile {
                path: or_default(
                    name,
                    "file_name",
                    config.file_name.as_deref().map(PathBuf::from),
                    PathBuf::from(DEFAULT_BASIC_FILE_NAME),
                ),
                truncate: or_default(name, "truncate", config.truncate, false),
            },
            SinkKind::DailyFileSt | SinkKind::DailyFileMt => SinkParams::DailyFile {
                base: or_default(
                    name,
                    "base_file_name",
                    config.base_file_name.as_deref().map(PathBuf::from),
                    PathBuf::from(DEFAULT_DAILY_FILE_NAME),
                ),
                rotation_hour: or_default(name, "rotation_hour", config.rotation_hour, 0),
                rotation_minute: or_default(name, "rotation_minute", config.rotation_minute, 0),
                truncate: or_default(name, "truncate", config.truncate, false),
            },
            SinkKind::RotatingFileSt | SinkKind::RotatingFileMt => SinkParams::RotatingFile {
                base: or_default(
                    name,
                    "base_file_name",
                    config.base_file_name.as_deref().map(PathBuf::from),
                    PathBuf::from(DEFAULT_ROTATING_FILE_NAME),
                ),
                max_size: or_default(name, "max_size", config.max_size, DEFAULT_MAX_SIZE),
                max_files: or_default(name, "max_files", config.max_files, DEFAULT_MAX_FILES),
            },
        };

        Self { kind, params }
    }

    pub fn kind(&self) -> SinkKind {
        self.kind
    }

    pub fn params(&self) -> &SinkParams {
        &self.params
    }

    /// The path a file-based sink writes to.
    pub fn file_path(&self) -> Option<&Path> {
        match &self.params {
            SinkParams::BasicFile { path, .. } => Some(path),
            SinkParams::DailyFile { base, .. } | SinkParams::RotatingFile { base, .. } => {
                Some(base)
            }
            SinkParams::Console | SinkParams::Syslog { .. } => None,
        }
    }
}

fn or_default<T: fmt::Debug>(sink: &str, field: &str, value: Option<T>, default: T) -> T {
    value.unwrap_or_else(|| {
        log::info!(target: "logconf", "sink '{sink}' has no '{field}', using default {default:?}");
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_defaults() {
        let config = SinkConfig::default();

        let spec = SinkSpec::from_config("f", SinkKind::BasicFileMt, &config);
        assert_eq!(
            spec.params(),
            &SinkParams::BasicFile {
                path: PathBuf::from("./log_file.log"),
                truncate: false,
            }
        );

        let spec = SinkSpec::from_config("d", SinkKind::DailyFileSt, &config);
        assert_eq!(
            spec.params(),
            &SinkParams::DailyFile {
                base: PathBuf::from("./daily.log"),
                rotation_hour: 0,
                rotation_minute: 0,
                truncate: false,
            }
        );

        let spec = SinkSpec::from_config("r", SinkKind::RotatingFileSt, &config);
        assert_eq!(
            spec.params(),
            &SinkParams::RotatingFile {
                base: PathBuf::from("./rotate.log"),
                max_size: 10 * 1024 * 1024,
                max_files: 10,
            }
        );
        assert_eq!(spec.file_path(), Some(Path::new("./rotate.log")));
    }

    #[test]
    fn test_configured_values_win() {
        let config = SinkConfig {
            base_file_name: Some("logs/app.log".to_string()),
            rotation_hour: Some(2),
            rotation_minute: Some(30),
            truncate: Some(true),
            ..SinkConfig::default()
        };

        let spec = SinkSpec::from_config("d", SinkKind::DailyFileMt, &config);
        assert_eq!(
            spec.params(),
            &SinkParams::DailyFile {
                base: PathBuf::from("logs/app.log"),
                rotation_hour: 2,
                rotation_minute: 30,
                truncate: true,
            }
        );
    }

    #[test]
    fn test_console_has_no_path() {
        let spec = SinkSpec::from_config("c", SinkKind::StderrColorMt, &SinkConfig::default());
        assert_eq!(spec.params(), &SinkParams::Console);
        assert_eq!(spec.file_path(), None);
    }
}
