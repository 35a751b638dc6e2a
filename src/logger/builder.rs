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

use std::sync::Arc;
use std::sync::atomic::AtomicU8;

use jiff::tz::TimeZone;

use crate::Error;
use crate::ErrorKind;
use crate::LevelFilter;
use crate::layout::DEFAULT_PATTERN;
use crate::layout::PatternLayout;
use crate::logger::Dispatch;
use crate::logger::Logger;
use crate::logger::SyncMode;
use crate::sink::SinkHandle;
use crate::thread_pool::ThreadPool;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

/// A builder for [`Logger`].
///
/// Defaults: no sinks, [`DEFAULT_PATTERN`], level `info`, synchronous.
#[derive(Debug)]
pub struct LoggerBuilder {
    name: String,
    sinks: Vec<SinkHandle>,
    pattern: Option<String>,
    timezone: Option<TimeZone>,
    level: LevelFilter,
    sync_mode: SyncMode,
    thread_pool: Option<Arc<ThreadPool>>,
    trap: Option<Arc<dyn Trap>>,
}

impl LoggerBuilder {
    pub(super) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sinks: vec![],
            pattern: None,
            timezone: None,
            level: LevelFilter::Info,
            sync_mode: SyncMode::Sync,
            thread_pool: None,
            trap: None,
        }
    }

    /// Append a sink; records are written to sinks in the order they were added.
    #[must_use]
    pub fn sink(mut self, sink: SinkHandle) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Append several sinks.
    #[must_use]
    pub fn sinks(mut self, sinks: impl IntoIterator<Item = SinkHandle>) -> Self {
        self.sinks.extend(sinks);
        self
    }

    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Render time flags of the logger pattern in `tz` instead of the system timezone.
    ///
    /// Sinks may be shared by loggers with different timezones, so a sink carrying its own
    /// pattern keeps the timezone of that layout; see [`PatternLayout::timezone`].
    #[must_use]
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.timezone = Some(tz);
        self
    }

    #[must_use]
    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn sync_mode(mut self, sync_mode: SyncMode) -> Self {
        self.sync_mode = sync_mode;
        self
    }

    /// The pool asynchronous modes queue on.
    #[must_use]
    pub fn thread_pool(mut self, thread_pool: Option<Arc<ThreadPool>>) -> Self {
        self.thread_pool = thread_pool;
        self
    }

    /// Where write errors go; [`DefaultTrap`] if unset.
    #[must_use]
    pub fn trap(mut self, trap: Arc<dyn Trap>) -> Self {
        self.trap = Some(trap);
        self
    }

    /// Build the logger.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::ThreadPoolUnavailable`] if an asynchronous mode is requested without a pool.
    pub fn build(self) -> Result<Logger, Error> {
        let Self {
            name,
            sinks,
            pattern,
            timezone,
            level,
            sync_mode,
            thread_pool,
            trap,
        } = self;

        let dispatch = match (sync_mode.overflow(), thread_pool) {
            (None, _) => Dispatch::Sync,
            (Some(overflow), Some(pool)) => Dispatch::Async { pool, overflow },
            (Some(_), None) => {
                return Err(Error::new(
                    ErrorKind::ThreadPoolUnavailable,
                    "asynchronous logger needs a thread pool",
                )
                .with_context("logger", name)
                .with_context("value", sync_mode));
            }
        };

        let mut layout = PatternLayout::new(pattern.as_deref().unwrap_or(DEFAULT_PATTERN));
        if let Some(tz) = timezone {
            layout = layout.timezone(tz);
        }

        Ok(Logger {
            name: Arc::from(name),
            sinks: sinks.into(),
            layout: Arc::new(layout),
            level: AtomicU8::new(level as u8),
            sync_mode,
            dispatch,
            trap: trap.unwrap_or_else(|| Arc::new(DefaultTrap::default())),
        })
    }
}
