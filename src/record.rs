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

//! Log record and severity levels.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::thread::ThreadId;
use std::time::SystemTime;

use crate::Error;
use crate::ErrorKind;

/// One log message with its metadata.
///
/// A record is formatted once when it is created, so it can be handed to a worker thread and
/// fanned out to every sink of a logger without further borrowing.
#[derive(Clone, Debug)]
pub struct Record {
    // the observed time
    now: SystemTime,

    // the metadata
    level: Level,
    logger: Arc<str>,
    thread: ThreadId,
    file: Option<&'static str>,
    line: Option<u32>,

    // the payload
    payload: String,
}

impl Record {
    /// The observed time.
    pub fn time(&self) -> SystemTime {
        self.now
    }

    /// The verbosity level of the message.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The name of the logger that emitted the message.
    pub fn logger_name(&self) -> &str {
        &self.logger
    }

    /// The thread that emitted the message.
    pub fn thread_id(&self) -> ThreadId {
        self.thread
    }

    /// The source file containing the message.
    pub fn file(&self) -> Option<&'static str> {
        self.file
    }

    /// The filename of the source file.
    pub fn filename(&self) -> Cow<'static, str> {
        self.file
            .map(std::path::Path::new)
            .and_then(std::path::Path::file_name)
            .map(std::ffi::OsStr::to_string_lossy)
            .unwrap_or_default()
    }

    /// The line containing the message.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// The message body.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Start a record observed now on the current thread.
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }
}

/// Builder for [`Record`].
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl Default for RecordBuilder {
    fn default() -> Self {
        RecordBuilder {
            record: Record {
                now: SystemTime::now(),
                level: Level::Info,
                logger: Arc::from(""),
                thread: std::thread::current().id(),
                file: None,
                line: None,
                payload: String::new(),
            },
        }
    }
}

impl RecordBuilder {
    /// Set [`payload`](Record::payload).
    pub fn payload(mut self, payload: impl Into<String>) -> Self {
        self.record.payload = payload.into();
        self
    }

    /// Set [`level`](Record::level).
    pub fn level(mut self, level: Level) -> Self {
        self.record.level = level;
        self
    }

    /// Set [`logger_name`](Record::logger_name).
    pub fn logger(mut self, logger: Arc<str>) -> Self {
        self.record.logger = logger;
        self
    }

    /// Set [`time`](Record::time).
    pub fn time(mut self, now: SystemTime) -> Self {
        self.record.now = now;
        self
    }

    /// Set [`file`](Record::file).
    pub fn file(mut self, file: Option<&'static str>) -> Self {
        self.record.file = file;
        self
    }

    /// Set [`line`](Record::line).
    pub fn line(mut self, line: Option<u32>) -> Self {
        self.record.line = line;
        self
    }

    /// Finish the record.
    pub fn build(self) -> Record {
        self.record
    }
}

/// An enum representing the available verbosity levels of a logger, from the most verbose to
/// the most severe.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    /// Step-by-step tracing, usually disabled.
    Trace = 0,
    /// Diagnostics for developers.
    Debug = 1,
    /// Normal operation, the default threshold.
    Info = 2,
    /// Something unexpected that the program handled.
    Warn = 3,
    /// An operation failed.
    Error = 4,
    /// The program cannot continue.
    Critical = 5,
}

impl Level {
    /// The name rendered by the `%l` flag; `warn` renders as `warning`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warning",
            Level::Error => "error",
            Level::Critical => "critical",
        }
    }

    /// The name rendered by the `%L` flag.
    pub fn as_short_str(&self) -> &'static str {
        match self {
            Level::Trace => "T",
            Level::Debug => "D",
            Level::Info => "I",
            Level::Warn => "W",
            Level::Error => "E",
            Level::Critical => "C",
        }
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warn,
            log::Level::Info => Level::Info,
            log::Level::Debug => Level::Debug,
            log::Level::Trace => Level::Trace,
        }
    }
}

/// The threshold of a logger or a sink: records below it are discarded.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[repr(u8)]
pub enum LevelFilter {
    /// Enables all levels.
    Trace = 0,
    /// Enables `debug` and above.
    Debug = 1,
    /// Enables `info` and above.
    Info = 2,
    /// Enables `warn` and above.
    Warn = 3,
    /// Enables `error` and above.
    Error = 4,
    /// Enables `critical` only.
    Critical = 5,
    /// Disables all levels.
    Off = 6,
}

impl LevelFilter {
    /// Checks whether records of the given level pass this filter.
    ///
    /// # Examples
    ///
    /// ```
    /// use logconf::Level;
    /// use logconf::LevelFilter;
    ///
    /// assert!(LevelFilter::Warn.enabled(Level::Error));
    /// assert!(LevelFilter::Warn.enabled(Level::Warn));
    /// assert!(!LevelFilter::Warn.enabled(Level::Info));
    /// assert!(!LevelFilter::Off.enabled(Level::Critical));
    /// ```
    pub fn enabled(&self, level: Level) -> bool {
        (level as u8) >= (*self as u8)
    }

    /// Return the name of the filter as written in configuration documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelFilter::Trace => "trace",
            LevelFilter::Debug => "debug",
            LevelFilter::Info => "info",
            LevelFilter::Warn => "warning",
            LevelFilter::Error => "error",
            LevelFilter::Critical => "critical",
            LevelFilter::Off => "off",
        }
    }

    pub(crate) fn from_u8(n: u8) -> LevelFilter {
        match n {
            0 => LevelFilter::Trace,
            1 => LevelFilter::Debug,
            2 => LevelFilter::Info,
            3 => LevelFilter::Warn,
            4 => LevelFilter::Error,
            5 => LevelFilter::Critical,
            _ => LevelFilter::Off,
        }
    }
}

impl fmt::Display for LevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<Level> for LevelFilter {
    fn from(level: Level) -> Self {
        LevelFilter::from_u8(level as u8)
    }
}

impl FromStr for LevelFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<LevelFilter, Self::Err> {
        for (name, level) in [
            ("trace", LevelFilter::Trace),
            ("debug", LevelFilter::Debug),
            ("info", LevelFilter::Info),
            ("warn", LevelFilter::Warn),
            ("warning", LevelFilter::Warn),
            ("err", LevelFilter::Error),
            ("error", LevelFilter::Error),
            ("critical", LevelFilter::Critical),
            ("off", LevelFilter::Off),
        ] {
            if s.eq_ignore_ascii_case(name) {
                return Ok(level);
            }
        }

        Err(Error::new(ErrorKind::ConfigInvalid, format!("malformed level: {s:?}"))
            .with_context("value", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_names() {
        assert_eq!("warn".parse::<LevelFilter>().unwrap(), LevelFilter::Warn);
        assert_eq!("WARNING".parse::<LevelFilter>().unwrap(), LevelFilter::Warn);
        assert_eq!("err".parse::<LevelFilter>().unwrap(), LevelFilter::Error);
        assert_eq!("Off".parse::<LevelFilter>().unwrap(), LevelFilter::Off);

        let err = "verbose".parse::<LevelFilter>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_filter_thresholds() {
        assert!(LevelFilter::Trace.enabled(Level::Trace));
        assert!(LevelFilter::Info.enabled(Level::Critical));
        assert!(!LevelFilter::Critical.enabled(Level::Error));
        assert!(!LevelFilter::Off.enabled(Level::Critical));
        assert_eq!(LevelFilter::from(Level::Debug), LevelFilter::Debug);
    }

    #[test]
    fn test_record_filename() {
        let record = Record::builder()
            .file(Some("src/registry/mod.rs"))
            .line(Some(7))
            .payload("hello")
            .build();
        assert_eq!(record.filename(), "mod.rs");
        assert_eq!(record.line(), Some(7));
        assert_eq!(record.payload(), "hello");
    }
}
