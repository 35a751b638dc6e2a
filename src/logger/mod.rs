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

//! Named loggers fanning records out to their sinks.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;

use crate::Error;
use crate::ErrorKind;
use crate::Level;
use crate::LevelFilter;
use crate::Record;
use crate::layout::PatternLayout;
use crate::sink::SinkHandle;
use crate::thread_pool::OverflowPolicy;
use crate::thread_pool::Task;
use crate::thread_pool::ThreadPool;
use crate::trap::Trap;

mod builder;

pub use self::builder::LoggerBuilder;

/// A shared logger, as handed out by the registry.
pub type LoggerHandle = Arc<Logger>;

/// How a logger hands records to its sinks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum SyncMode {
    /// `sync`: write to every sink on the calling thread.
    #[default]
    Sync,
    /// `async`: queue on the thread pool, blocking while the queue is full.
    Async,
    /// `async_nb`: queue on the thread pool, discarding the oldest queued record while the
    /// queue is full.
    AsyncNonBlocking,
}

impl SyncMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMode::Sync => "sync",
            SyncMode::Async => "async",
            SyncMode::AsyncNonBlocking => "async_nb",
        }
    }

    /// The overflow policy of an asynchronous mode.
    pub fn overflow(&self) -> Option<OverflowPolicy> {
        match self {
            SyncMode::Sync => None,
            SyncMode::Async => Some(OverflowPolicy::Block),
            SyncMode::AsyncNonBlocking => Some(OverflowPolicy::DropOldest),
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sync" => Ok(SyncMode::Sync),
            "async" => Ok(SyncMode::Async),
            "async_nb" => Ok(SyncMode::AsyncNonBlocking),
            _ => Err(Error::new(ErrorKind::UnknownSyncMode, "sync type not supported")
                .with_context("value", s)),
        }
    }
}

#[derive(Debug)]
enum Dispatch {
    Sync,
    Async {
        pool: Arc<ThreadPool>,
        overflow: OverflowPolicy,
    },
}

/// A named logger.
///
/// Records below the logger level are discarded before formatting. Records that pass are
/// written to every sink in order, each sink applying its own level and pattern.
///
/// # Examples
///
/// ```
/// use logconf::Registry;
///
/// let registry = Registry::new();
/// let logger = registry.default_logger();
/// logconf::info!(logger, "answer = {}", 42);
/// ```
#[derive(Debug)]
pub struct Logger {
    name: Arc<str>,
    sinks: Arc<[SinkHandle]>,
    layout: Arc<PatternLayout>,
    level: AtomicU8,
    sync_mode: SyncMode,
    dispatch: Dispatch,
    trap: Arc<dyn Trap>,
}

impl Logger {
    /// Start building a logger named `name`.
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current threshold of this logger.
    pub fn level(&self) -> LevelFilter {
        LevelFilter::from_u8(self.level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, level: LevelFilter) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    pub fn sync_mode(&self) -> SyncMode {
        self.sync_mode
    }

    /// The format string records are rendered with, unless a sink names its own.
    pub fn pattern(&self) -> &str {
        self.layout.pattern()
    }

    /// The sinks of this logger, in write order.
    pub fn sinks(&self) -> &[SinkHandle] {
        &self.sinks
    }

    /// Whether a record at `level` passes this logger.
    pub fn enabled(&self, level: Level) -> bool {
        self.level().enabled(level)
    }

    /// Log a formatted message at `level`.
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        let record = Record::builder()
            .level(level)
            .logger(self.name.clone())
            .payload(fmt::format(args))
            .build();
        self.dispatch(record);
    }

    #[doc(hidden)]
    pub fn __log_at(
        &self,
        level: Level,
        file: &'static str,
        line: u32,
        args: fmt::Arguments<'_>,
    ) {
        if !self.enabled(level) {
            return;
        }
        let record = Record::builder()
            .level(level)
            .logger(self.name.clone())
            .file(Some(file))
            .line(Some(line))
            .payload(fmt::format(args))
            .build();
        self.dispatch(record);
    }

    /// Log a prepared record, renamed to this logger.
    pub fn log_record(&self, record: Record) {
        if !self.enabled(record.level()) {
            return;
        }
        let record = Record::builder()
            .time(record.time())
            .level(record.level())
            .logger(self.name.clone())
            .file(record.file())
            .line(record.line())
            .payload(record.payload())
            .build();
        self.dispatch(record);
    }

    pub fn trace(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Trace, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    pub fn critical(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Critical, args);
    }

    /// Flush every sink.
    ///
    /// An asynchronous logger waits until a worker has flushed the sinks; with a single worker
    /// this covers every record queued before the call.
    pub fn flush(&self) {
        match &self.dispatch {
            Dispatch::Sync => {
                for sink in self.sinks.iter() {
                    if let Err(err) = sink.flush() {
                        self.trap_sink_error("failed to flush", sink.name(), err);
                    }
                }
            }
            Dispatch::Async { pool, overflow } => {
                let (done, wait) = crossbeam_channel::bounded(1);
                let task = Task::Flush {
                    sinks: self.sinks.clone(),
                    done,
                };
                match pool.send(task, *overflow) {
                    // disconnected when the task was dropped from a full queue
                    Ok(()) => {
                        let _ = wait.recv();
                    }
                    Err(err) => self.trap.trap(&err.with_context("logger", &self.name)),
                }
            }
        }
    }

    fn dispatch(&self, record: Record) {
        match &self.dispatch {
            Dispatch::Sync => {
                for sink in self.sinks.iter() {
                    if let Err(err) = sink.log(&record, &self.layout) {
                        self.trap_sink_error("failed to append record", sink.name(), err);
                    }
                }
            }
            Dispatch::Async { pool, overflow } => {
                let task = Task::Log {
                    sinks: self.sinks.clone(),
                    layout: self.layout.clone(),
                    record,
                };
                if let Err(err) = pool.send(task, *overflow) {
                    self.trap.trap(&err.with_context("logger", &self.name));
                }
            }
        }
    }

    fn trap_sink_error(&self, message: &str, sink: &str, err: Error) {
        let err = Error::new(ErrorKind::Unexpected, message)
            .with_context("logger", &self.name)
            .with_context("sink", sink)
            .with_source(err);
        self.trap.trap(&err);
    }
}
