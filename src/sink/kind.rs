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
use std::str::FromStr;

use crate::Error;
use crate::ErrorKind;

/// Whether a sink may be written by one thread at a time or by many.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Threading {
    /// `*_st` variants.
    Single,
    /// `*_mt` variants: formatting and writing of a record happen under the sink lock.
    Multi,
}

/// The closed set of sink types a configuration may declare.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SinkKind {
    /// `stdout_sink_st`
    StdoutSt,
    /// `stdout_sink_mt`
    StdoutMt,
    /// `stderr_sink_st`
    StderrSt,
    /// `stderr_sink_mt`
    StderrMt,
    /// `stdout_color_sink_st`
    StdoutColorSt,
    /// `stdout_color_sink_mt`
    StdoutColorMt,
    /// `stderr_color_sink_st`
    StderrColorSt,
    /// `stderr_color_sink_mt`
    StderrColorMt,
    /// `syslog_sink_st`
    SyslogSt,
    /// `syslog_sink_mt`
    SyslogMt,
    /// `basic_file_sink_st`
    BasicFileSt,
    /// `basic_file_sink_mt`
    BasicFileMt,
    /// `daily_file_sink_st`
    DailyFileSt,
    /// `daily_file_sink_mt`
    DailyFileMt,
    /// `rotating_file_sink_st`
    RotatingFileSt,
    /// `rotating_file_sink_mt`
    RotatingFileMt,
}

impl SinkKind {
    /// Every sink kind, in declaration order.
    pub const ALL: [SinkKind; 16] = [
        SinkKind::StdoutSt,
        SinkKind::StdoutMt,
        SinkKind::StderrSt,
        SinkKind::StderrMt,
        SinkKind::StdoutColorSt,
        SinkKind::StdoutColorMt,
        SinkKind::StderrColorSt,
        SinkKind::StderrColorMt,
        SinkKind::SyslogSt,
        SinkKind::SyslogMt,
        SinkKind::BasicFileSt,
        SinkKind::BasicFileMt,
        SinkKind::DailyFileSt,
        SinkKind::DailyFileMt,
        SinkKind::RotatingFileSt,
        SinkKind::RotatingFileMt,
    ];

    /// The type string of this kind as written in configuration documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            SinkKind::StdoutSt => "stdout_sink_st",
            SinkKind::StdoutMt => "stdout_sink_mt",
            SinkKind::StderrSt => "stderr_sink_st",
            SinkKind::StderrMt => "stderr_sink_mt",
            SinkKind::StdoutColorSt => "stdout_color_sink_st",
            SinkKind::StdoutColorMt => "stdout_color_sink_mt",
            SinkKind::StderrColorSt => "stderr_color_sink_st",
            SinkKind::StderrColorMt => "stderr_color_sink_mt",
            SinkKind::SyslogSt => "syslog_sink_st",
            SinkKind::SyslogMt => "syslog_sink_mt",
            SinkKind::BasicFileSt => "basic_file_sink_st",
            SinkKind::BasicFileMt => "basic_file_sink_mt",
            SinkKind::DailyFileSt => "daily_file_sink_st",
            SinkKind::DailyFileMt => "daily_file_sink_mt",
            SinkKind::RotatingFileSt => "rotating_file_sink_st",
            SinkKind::RotatingFileMt => "rotating_file_sink_mt",
        }
    }

    pub fn threading(&self) -> Threading {
        match self {
            SinkKind::StdoutSt
            | SinkKind::StderrSt
            | SinkKind::StdoutColorSt
            | SinkKind::StderrColorSt
            | SinkKind::SyslogSt
            | SinkKind::BasicFileSt
            | SinkKind::DailyFileSt
            | SinkKind::RotatingFileSt => Threading::Single,
            SinkKind::StdoutMt
            | SinkKind::StderrMt
            | SinkKind::StdoutColorMt
            | SinkKind::StderrColorMt
            | SinkKind::SyslogMt
            | SinkKind::BasicFileMt
            | SinkKind::DailyFileMt
            | SinkKind::RotatingFileMt => Threading::Multi,
        }
    }

    /// Whether sinks of this kind write to a path on the file system.
    pub fn is_file_based(&self) -> bool {
        matches!(
            self,
            SinkKind::BasicFileSt
                | SinkKind::BasicFileMt
                | SinkKind::DailyFileSt
                | SinkKind::DailyFileMt
                | SinkKind::RotatingFileSt
                | SinkKind::RotatingFileMt
        )
    }

    /// Whether this build can construct sinks of this kind.
    ///
    /// Syslog sinks need a unix host and the `append-syslog` feature.
    pub fn is_supported(&self) -> bool {
        match self {
            SinkKind::SyslogSt | SinkKind::SyslogMt => cfg!(all(unix, feature = "append-syslog")),
            _ => true,
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SinkKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SinkKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s && kind.is_supported())
            .ok_or_else(|| {
                Error::new(ErrorKind::UnknownSinkType, "sink type not supported")
                    .with_context("type", s)
            })
    }
}
