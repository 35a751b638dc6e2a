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

//! The registry of named loggers and the initialization pipeline filling it.

use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::RwLock;

use crate::Error;
use crate::ErrorKind;
use crate::LevelFilter;
use crate::append::Stdout;
use crate::config;
use crate::config::ConfigDocument;
use crate::config::LoggerConfig;
use crate::layout::DEFAULT_PATTERN;
use crate::logger::Logger;
use crate::logger::LoggerHandle;
use crate::logger::SyncMode;
use crate::resolve::BuildContext;
use crate::sink::DefaultSinkFactory;
use crate::sink::Sink;
use crate::sink::SinkFactory;
use crate::sink::SinkHandle;
use crate::sink::SinkKind;
use crate::thread_pool::DEFAULT_QUEUE_SIZE;
use crate::thread_pool::DEFAULT_THREAD_COUNT;
use crate::thread_pool::ThreadPool;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

/// Name of the logger every registry starts with.
pub const DEFAULT_LOGGER_NAME: &str = "DEFAULT";
/// Name of the console sink shared by the default logger and by loggers that declare no sinks.
pub const DEFAULT_SINK_NAME: &str = "DEFAULT_SINK";
/// Id of the default logger.
pub const DEFAULT_LOGGER_ID: LoggerId = LoggerId(0);
/// Maximum number of loggers in a registry, the default logger included.
pub const MAX_LOGGERS: usize = 32;

/// A dense logger id, assigned in registration order starting at 0.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoggerId(u32);

impl LoggerId {
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for LoggerId {
    fn from(id: u32) -> Self {
        LoggerId(id)
    }
}

impl fmt::Display for LoggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Default)]
struct State {
    entries: Vec<(String, LoggerHandle)>,
    ids: HashMap<String, LoggerId>,
}

impl State {
    fn push(&mut self, name: String, logger: LoggerHandle) -> Result<LoggerId, Error> {
        if self.ids.contains_key(&name) {
            return Err(duplicate(&name));
        }
        if self.entries.len() >= MAX_LOGGERS {
            return Err(capacity_exceeded(&name));
        }

        let id = LoggerId(self.entries.len() as u32);
        self.ids.insert(name.clone(), id);
        self.entries.push((name, logger));
        Ok(id)
    }
}

/// Loggers by name and by id.
///
/// A registry starts with the default logger at id 0: a console sink, [`DEFAULT_PATTERN`] and
/// level `info`. [`Registry::initialize`] adds the loggers of a configuration file.
///
/// Initialization is all or nothing: when any logger of a document fails to build or register,
/// the registry keeps exactly the loggers it had before the call.
///
/// # Examples
///
/// ```
/// use logconf::Registry;
///
/// let registry = Registry::new();
/// registry
///     .initialize_from_str(
///         r#"{
///             "SINKS": { "c1": { "type": "stdout_color_sink_st" } },
///             "PATTERNS": { "p1": "[%n] %v" },
///             "LOGGERS": { "L1": { "sinks": ["c1"], "pattern": "p1", "level": "warn" } }
///         }"#,
///     )
///     .unwrap();
///
/// let id = registry.logger_id("L1").unwrap();
/// assert_eq!(id.as_u32(), 1);
/// let logger = registry.logger_by_id(id).unwrap();
/// logconf::warn!(logger, "disk {}% full", 91);
/// ```
#[derive(Debug)]
pub struct Registry {
    state: RwLock<State>,
    default_logger: LoggerHandle,
    default_sink: SinkHandle,
    factory: Box<dyn SinkFactory>,
    trap: Arc<dyn Trap>,
    // one initialization at a time
    init: Mutex<()>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry with the default sink factory and trap.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Load the configuration file at `path` and register its loggers.
    pub fn initialize(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let document = config::load(path).inspect_err(|err| {
            log::error!(target: "logconf", "failed to load configuration: {err}");
        })?;
        self.initialize_document(&document)
    }

    /// Parse `text` as a configuration document and register its loggers.
    pub fn initialize_from_str(&self, text: &str) -> Result<(), Error> {
        let document = config::parse(text).inspect_err(|err| {
            log::error!(target: "logconf", "failed to parse configuration: {err}");
        })?;
        self.initialize_document(&document)
    }

    /// Register the loggers of a parsed document, in document order.
    pub fn initialize_document(&self, document: &ConfigDocument) -> Result<(), Error> {
        let _init = self.init.lock().unwrap_or_else(PoisonError::into_inner);

        let staged = self.stage(document).inspect_err(|err| {
            log::error!(target: "logconf", "logger initialization failure: {err}");
        })?;

        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if state.entries.len() + staged.len() > MAX_LOGGERS {
                let err = capacity_exceeded(&staged[MAX_LOGGERS - state.entries.len()].0);
                log::error!(target: "logconf", "logger initialization failure: {err}");
                return Err(err);
            }
            if let Some((name, _)) = staged.iter().find(|(name, _)| state.ids.contains_key(name)) {
                let err = duplicate(name);
                log::error!(target: "logconf", "logger initialization failure: {err}");
                return Err(err);
            }
            for (name, logger) in &staged {
                state.push(name.clone(), logger.clone())?;
            }
        }

        for (_, logger) in &staged {
            logger.info(format_args!("Logger started"));
        }
        Ok(())
    }

    /// Register `logger` under `name` with the next free id.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::DuplicateLoggerName`] if `name` is taken, in which case the existing logger
    /// keeps its id; [`ErrorKind::RegistryCapacityExceeded`] if the registry is full.
    pub fn register(&self, name: impl Into<String>, logger: LoggerHandle) -> Result<LoggerId, Error> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.push(name.into(), logger)
    }

    /// The logger registered under `name`.
    pub fn logger(&self, name: &str) -> Option<LoggerHandle> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let id = state.ids.get(name)?;
        state.entries.get(id.index()).map(|(_, logger)| logger.clone())
    }

    /// The logger with id `id`.
    pub fn logger_by_id(&self, id: LoggerId) -> Option<LoggerHandle> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.entries.get(id.index()).map(|(_, logger)| logger.clone())
    }

    /// The id of the logger registered under `name`.
    pub fn logger_id(&self, name: &str) -> Result<LoggerId, Error> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.ids.get(name).copied().ok_or_else(|| {
            Error::new(ErrorKind::LoggerNotFound, "logger is not registered")
                .with_context("logger", name)
        })
    }

    /// The logger at id 0.
    pub fn default_logger(&self) -> LoggerHandle {
        self.default_logger.clone()
    }

    /// Number of registered loggers, the default logger included.
    pub fn len(&self) -> usize {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.entries.len()
    }

    /// Always false: the default logger is registered from the start.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered names in id order.
    pub fn names(&self) -> Vec<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Flush every registered logger.
    pub fn flush_all(&self) {
        let loggers = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            state
                .entries
                .iter()
                .map(|(_, logger)| logger.clone())
                .collect::<Vec<_>>()
        };
        for logger in loggers {
            logger.flush();
        }
    }

    fn stage(&self, document: &ConfigDocument) -> Result<Vec<(String, LoggerHandle)>, Error> {
        let mut context = BuildContext::new(document, self.factory.as_ref());
        let mut pool = PoolSlot::new(document, &self.trap)?;
        let registered = self.len();

        let mut staged: Vec<(String, LoggerHandle)> = vec![];
        let mut names = HashSet::new();
        for (name, config) in document.loggers() {
            if self.logger(name).is_some() || !names.insert(name) {
                return Err(duplicate(name));
            }
            if registered + staged.len() >= MAX_LOGGERS {
                return Err(capacity_exceeded(name));
            }

            let config = config?;
            let logger = self
                .build_logger(&mut context, &mut pool, name, &config)
                .map_err(|err| match err.context("logger") {
                    Some(_) => err,
                    None => err.with_context("logger", name),
                })?;
            log::debug!(target: "logconf", "logger '{name}' built as {}", logger.sync_mode());
            staged.push((name.to_string(), Arc::new(logger)));
        }

        Ok(staged)
    }

    fn build_logger(
        &self,
        context: &mut BuildContext<'_>,
        pool: &mut PoolSlot,
        name: &str,
        config: &LoggerConfig,
    ) -> Result<Logger, Error> {
        let sinks = match &config.sinks {
            Some(sinks) => sinks
                .iter()
                .map(|sink| context.resolve(sink))
                .collect::<Result<Vec<_>, _>>()?,
            None => {
                log::warn!(target: "logconf", "logger '{name}' has no 'sinks', using the default sink");
                vec![self.default_sink.clone()]
            }
        };

        let pattern = match config.pattern.as_deref() {
            Some(pattern) => context.pattern(pattern).ok_or_else(|| {
                Error::new(ErrorKind::UnknownPatternReference, "pattern is not defined")
                    .with_context("pattern", pattern)
            })?,
            None => {
                log::info!(target: "logconf", "logger '{name}' has no 'pattern', using the default pattern");
                DEFAULT_PATTERN
            }
        };

        let level = match config.level.as_deref() {
            Some(level) => level
                .parse::<LevelFilter>()
                .map_err(|err| err.with_context("field", "level"))?,
            None => {
                log::info!(target: "logconf", "logger '{name}' has no 'level', using info");
                LevelFilter::Info
            }
        };

        let sync_mode = match config.sync_type.as_deref() {
            Some(sync_type) => sync_type.parse::<SyncMode>()?,
            None => {
                log::info!(target: "logconf", "logger '{name}' has no 'sync_type', using sync");
                SyncMode::Sync
            }
        };

        let thread_pool = match sync_mode {
            SyncMode::Sync => None,
            SyncMode::Async | SyncMode::AsyncNonBlocking => pool.get()?,
        };

        Logger::builder(name)
            .sinks(sinks)
            .pattern(pattern)
            .level(level)
            .sync_mode(sync_mode)
            .thread_pool(thread_pool)
            .trap(self.trap.clone())
            .build()
    }
}

/// The thread pool of one initialization, spawned when the first asynchronous logger needs it.
struct PoolSlot {
    thread_count: usize,
    queue_size: usize,
    trap: Arc<dyn Trap>,
    pool: Option<Arc<ThreadPool>>,
}

impl PoolSlot {
    fn new(document: &ConfigDocument, trap: &Arc<dyn Trap>) -> Result<Self, Error> {
        let config = document.thread_pool()?.unwrap_or_else(|| {
            log::info!(target: "logconf", "no THREAD_POOL section, using the default thread pool");
            Default::default()
        });

        let thread_count = config.thread_count.unwrap_or(DEFAULT_THREAD_COUNT);
        let queue_size = config.queue_size.unwrap_or(DEFAULT_QUEUE_SIZE);
        if thread_count == 0 {
            log::warn!(target: "logconf", "thread_count is 0, asynchronous loggers are unavailable");
        }
        if queue_size == 0 {
            return Err(Error::new(ErrorKind::ConfigInvalid, "thread pool needs a queue")
                .with_context("field", "queue_size")
                .with_context("value", queue_size));
        }

        Ok(Self {
            thread_count,
            queue_size,
            trap: trap.clone(),
            pool: None,
        })
    }

    /// The pool, or `None` when the configuration establishes none.
    fn get(&mut self) -> Result<Option<Arc<ThreadPool>>, Error> {
        if self.thread_count == 0 {
            return Ok(None);
        }
        if self.pool.is_none() {
            let pool = ThreadPool::new(self.thread_count, self.queue_size, self.trap.clone())?;
            self.pool = Some(Arc::new(pool));
        }
        Ok(self.pool.clone())
    }
}

fn duplicate(name: &str) -> Error {
    Error::new(ErrorKind::DuplicateLoggerName, "logger name is already registered")
        .with_context("logger", name)
}

fn capacity_exceeded(name: &str) -> Error {
    Error::new(ErrorKind::RegistryCapacityExceeded, "registry is full")
        .with_context("logger", name)
        .with_context("capacity", MAX_LOGGERS)
}

/// A builder for [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    factory: Option<Box<dyn SinkFactory>>,
    trap: Option<Arc<dyn Trap>>,
}

impl RegistryBuilder {
    /// Construct configured sinks with `factory` instead of [`DefaultSinkFactory`].
    #[must_use]
    pub fn sink_factory(mut self, factory: impl Into<Box<dyn SinkFactory>>) -> Self {
        self.factory = Some(factory.into());
        self
    }

    /// Send write errors of every logger to `trap` instead of [`DefaultTrap`].
    #[must_use]
    pub fn trap(mut self, trap: Arc<dyn Trap>) -> Self {
        self.trap = Some(trap);
        self
    }

    /// Build the registry with its default logger.
    pub fn build(self) -> Registry {
        let factory = self.factory.unwrap_or_else(|| Box::new(DefaultSinkFactory));
        let trap = self
            .trap
            .unwrap_or_else(|| Arc::new(DefaultTrap::default()));

        let default_sink: SinkHandle = Arc::new(Sink::new(
            DEFAULT_SINK_NAME,
            SinkKind::StdoutColorSt,
            Stdout::default().with_color(true),
        ));
        let default_logger: LoggerHandle = Arc::new(
            Logger::builder(DEFAULT_LOGGER_NAME)
                .sink(default_sink.clone())
                .pattern(DEFAULT_PATTERN)
                .level(LevelFilter::Info)
                .trap(trap.clone())
                .build()
                // a synchronous logger always builds
                .unwrap_or_else(|err| unreachable!("{err}")),
        );

        let mut state = State::default();
        state.ids.insert(DEFAULT_LOGGER_NAME.to_string(), DEFAULT_LOGGER_ID);
        state
            .entries
            .push((DEFAULT_LOGGER_NAME.to_string(), default_logger.clone()));

        Registry {
            state: RwLock::new(state),
            default_logger,
            default_sink,
            factory,
            trap,
            init: Mutex::new(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_logger(name: &str) -> LoggerHandle {
        Arc::new(Logger::builder(name).build().unwrap())
    }

    #[test]
    fn test_default_logger_at_id_zero() {
        let registry = Registry::new();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.logger_id(DEFAULT_LOGGER_NAME).unwrap(), DEFAULT_LOGGER_ID);

        let by_name = registry.logger(DEFAULT_LOGGER_NAME).unwrap();
        let by_id = registry.logger_by_id(DEFAULT_LOGGER_ID).unwrap();
        assert!(Arc::ptr_eq(&by_name, &by_id));
        assert!(Arc::ptr_eq(&by_name, &registry.default_logger()));
        assert_eq!(by_name.level(), LevelFilter::Info);
        assert_eq!(by_name.pattern(), DEFAULT_PATTERN);
        assert_eq!(by_name.sinks()[0].kind(), SinkKind::StdoutColorSt);
    }

    #[test]
    fn test_register_assigns_dense_ids() {
        let registry = Registry::new();
        let a = registry.register("A", quiet_logger("A")).unwrap();
        let b = registry.register("B", quiet_logger("B")).unwrap();
        assert_eq!(a.as_u32(), 1);
        assert_eq!(b.as_u32(), 2);
        assert_eq!(registry.names(), ["DEFAULT", "A", "B"]);
    }

    #[test]
    fn test_register_duplicate_keeps_first() {
        let registry = Registry::new();
        let first = quiet_logger("A");
        let id = registry.register("A", first.clone()).unwrap();

        let err = registry.register("A", quiet_logger("A")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateLoggerName);
        assert_eq!(registry.logger_id("A").unwrap(), id);
        assert!(Arc::ptr_eq(&registry.logger("A").unwrap(), &first));
    }

    #[test]
    fn test_register_capacity() {
        let registry = Registry::new();
        for i in 1..MAX_LOGGERS {
            registry
                .register(format!("L{i}"), quiet_logger("filler"))
                .unwrap();
        }
        assert_eq!(registry.len(), MAX_LOGGERS);

        let err = registry.register("overflow", quiet_logger("overflow")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RegistryCapacityExceeded);
        assert!(registry.logger("overflow").is_none());
    }

    #[test]
    fn test_lookup_missing() {
        let registry = Registry::new();
        assert!(registry.logger("nope").is_none());
        assert!(registry.logger_by_id(LoggerId::from(7)).is_none());
        let err = registry.logger_id("nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LoggerNotFound);
    }
}
