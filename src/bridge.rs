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

//! Forward records of the [`log`] crate facade to a registered logger.

use crate::Level;
use crate::LevelFilter;
use crate::Record;
use crate::logger::LoggerHandle;

#[derive(Debug)]
struct LogCrateLogger(LoggerHandle);

impl log::Log for LogCrateLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.0.enabled(metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        let level = Level::from(record.level());
        if !self.0.enabled(level) {
            return;
        }

        let record = Record::builder()
            .level(level)
            .file(record.file_static())
            .line(record.line())
            .payload(record.args().to_string())
            .build();
        self.0.log_record(record);
    }

    fn flush(&self) {
        self.0.flush();
    }
}

fn max_level(level: LevelFilter) -> log::LevelFilter {
    match level {
        LevelFilter::Trace => log::LevelFilter::Trace,
        LevelFilter::Debug => log::LevelFilter::Debug,
        LevelFilter::Info => log::LevelFilter::Info,
        LevelFilter::Warn => log::LevelFilter::Warn,
        LevelFilter::Error | LevelFilter::Critical => log::LevelFilter::Error,
        LevelFilter::Off => log::LevelFilter::Off,
    }
}

/// Set up the log crate global logger to write through `logger`.
///
/// The global maximum level follows the level of `logger` at the time of the call. Records
/// passing it are still checked against the logger level on every call, so a later
/// [`set_level`](crate::Logger::set_level) towards a more severe level takes effect.
///
/// # Errors
///
/// Return an error if the log crate global logger has already been set.
pub fn try_setup_log_crate(logger: LoggerHandle) -> Result<(), log::SetLoggerError> {
    let level = max_level(logger.level());
    log::set_boxed_logger(Box::new(LogCrateLogger(logger)))?;
    log::set_max_level(level);
    Ok(())
}

/// Set up the log crate global logger to write through `logger`.
///
/// # Panics
///
/// Panic if the log crate global logger has already been set.
///
/// # Examples
///
/// ```
/// use logconf::Registry;
///
/// let registry = Registry::new();
/// logconf::bridge::setup_log_crate(registry.default_logger());
/// log::info!("forwarded to the default logger");
/// ```
pub fn setup_log_crate(logger: LoggerHandle) {
    try_setup_log_crate(logger).expect(
        "logconf::bridge::setup_log_crate must be called before the log crate global logger initialized",
    )
}
