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

//! Configured sinks: a named appender with its own level and optional pattern.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use crate::Error;
use crate::ErrorKind;
use crate::LevelFilter;
use crate::Record;
use crate::append::Append;
use crate::layout::PatternLayout;

mod factory;
mod kind;
mod spec;

pub use self::factory::DefaultSinkFactory;
pub use self::factory::SinkFactory;
pub use self::kind::SinkKind;
pub use self::kind::Threading;
pub use self::spec::DEFAULT_BASIC_FILE_NAME;
pub use self::spec::DEFAULT_DAILY_FILE_NAME;
pub use self::spec::DEFAULT_MAX_FILES;
pub use self::spec::DEFAULT_MAX_SIZE;
pub use self::spec::DEFAULT_ROTATING_FILE_NAME;
pub use self::spec::SinkParams;
pub use self::spec::SinkSpec;

/// A shared sink; every logger that references the same sink name holds the same handle.
pub type SinkHandle = Arc<Sink>;

/// A named output destination.
///
/// The sink level filters after the logger level. A sink pattern replaces the logger pattern
/// for records written through this sink only.
#[derive(Debug)]
pub struct Sink {
    name: String,
    kind: SinkKind,
    level: LevelFilter,
    layout: Option<Arc<PatternLayout>>,
    serial: Option<Mutex<()>>,
    append: Box<dyn Append>,
}

impl Sink {
    /// Wrap an appender as a sink of the declared kind, passing every level.
    pub fn new(name: impl Into<String>, kind: SinkKind, append: impl Into<Box<dyn Append>>) -> Self {
        let serial = match kind.threading() {
            Threading::Single => None,
            Threading::Multi => Some(Mutex::new(())),
        };

        Self {
            name: name.into(),
            kind,
            level: LevelFilter::Trace,
            layout: None,
            serial,
            append: append.into(),
        }
    }

    /// Only records at or above `level` pass this sink.
    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Format records written through this sink with `layout`, including its timezone.
    pub fn with_layout(mut self, layout: PatternLayout) -> Self {
        self.layout = Some(Arc::new(layout));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SinkKind {
        self.kind
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// The sink's own pattern, if it overrides the logger's.
    pub fn layout(&self) -> Option<&PatternLayout> {
        self.layout.as_deref()
    }

    /// Write `record`, formatted by the sink layout or else by `fallback`.
    pub fn log(&self, record: &Record, fallback: &PatternLayout) -> Result<(), Error> {
        if !self.level.enabled(record.level()) {
            return Ok(());
        }

        let layout = self.layout.as_deref().unwrap_or(fallback);
        let _guard = self
            .serial
            .as_ref()
            .map(|serial| serial.lock().unwrap_or_else(PoisonError::into_inner));
        self.append.append(record, layout)
    }

    pub fn flush(&self) -> Result<(), Error> {
        let _guard = self
            .serial
            .as_ref()
            .map(|serial| serial.lock().unwrap_or_else(PoisonError::into_inner));
        self.append.flush()
    }
}

/// Create the directory that will hold `path`, unless it is the current directory.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), Error> {
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    if dir.as_os_str().is_empty() || dir == Path::new(".") {
        return Ok(());
    }

    fs::create_dir_all(dir).map_err(|err| {
        Error::new(ErrorKind::DirectoryCreateFailure, "failed to create log directory")
            .with_context("dir", dir.display())
            .with_source(err)
    })
}
