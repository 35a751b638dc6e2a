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
use std::io;

/// The class of an [`Error`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The configuration file does not exist.
    ConfigNotFound,
    /// The configuration file exists but could not be read completely.
    ConfigReadFailure,
    /// The configuration text is not a well-formed document.
    ConfigSyntaxError,
    /// A configuration value has the wrong shape, e.g. `sinks` is not an array.
    ConfigInvalid,
    /// A sink declares no type, or a type outside the supported set.
    UnknownSinkType,
    /// A logger references a sink absent from the `SINKS` section.
    SinkNotDefined,
    /// A logger or sink references a pattern absent from the `PATTERNS` section.
    UnknownPatternReference,
    /// The directory holding a log file could not be created.
    DirectoryCreateFailure,
    /// The output behind a sink could not be opened.
    SinkCreateFailure,
    /// A logger declares a `sync_type` other than `sync`, `async` or `async_nb`.
    UnknownSyncMode,
    /// An asynchronous logger was requested but no thread pool is established.
    ThreadPoolUnavailable,
    /// A logger with the same name is already registered.
    DuplicateLoggerName,
    /// The registry holds the maximum number of loggers.
    RegistryCapacityExceeded,
    /// No logger is registered under the requested name.
    LoggerNotFound,
    /// Failures on the write path, such as a sink failing to write.
    Unexpected,
}

impl ErrorKind {
    /// Return the string representation of the `ErrorKind`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConfigNotFound => "ConfigNotFound",
            ErrorKind::ConfigReadFailure => "ConfigReadFailure",
            ErrorKind::ConfigSyntaxError => "ConfigSyntaxError",
            ErrorKind::ConfigInvalid => "ConfigInvalid",
            ErrorKind::UnknownSinkType => "UnknownSinkType",
            ErrorKind::SinkNotDefined => "SinkNotDefined",
            ErrorKind::UnknownPatternReference => "UnknownPatternReference",
            ErrorKind::DirectoryCreateFailure => "DirectoryCreateFailure",
            ErrorKind::SinkCreateFailure => "SinkCreateFailure",
            ErrorKind::UnknownSyncMode => "UnknownSyncMode",
            ErrorKind::ThreadPoolUnavailable => "ThreadPoolUnavailable",
            ErrorKind::DuplicateLoggerName => "DuplicateLoggerName",
            ErrorKind::RegistryCapacityExceeded => "RegistryCapacityExceeded",
            ErrorKind::LoggerNotFound => "LoggerNotFound",
            ErrorKind::Unexpected => "Unexpected",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error struct of logconf.
pub struct Error {
    kind: ErrorKind,
    message: String,
    sources: Vec<anyhow::Error>,
    context: Vec<(&'static str, String)>,
    offset: Option<usize>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)?;

        if !self.context.is_empty() {
            write!(f, ", context: {{ ")?;
            write!(
                f,
                "{}",
                self.context
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;
            write!(f, " }}")?;
        }

        if !self.sources.is_empty() {
            write!(f, ", sources: [")?;
            for (i, source) in self.sources.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{source}")?;
            }
            write!(f, "]")?;
        }

        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // If alternate has been specified, we will print like Debug.
        if f.alternate() {
            let mut de = f.debug_struct("Error");
            de.field("kind", &self.kind);
            de.field("message", &self.message);
            de.field("context", &self.context);
            de.field("sources", &self.sources);
            de.field("offset", &self.offset);
            return de.finish();
        }

        write!(f, "{}: {}", self.kind, self.message)?;
        writeln!(f)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "Context:")?;
            for (k, v) in self.context.iter() {
                writeln!(f, "   {k}: {v}")?;
            }
        }
        if !self.sources.is_empty() {
            writeln!(f)?;
            writeln!(f, "Sources:")?;
            for source in self.sources.iter() {
                writeln!(f, "   {source:#}")?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.sources.first().map(|v| v.as_ref())
    }
}

impl Error {
    /// Create a new Error with error kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            sources: vec![],
            context: vec![],
            offset: None,
        }
    }

    /// Add one more context in error.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Add one more source in error.
    pub fn with_source(mut self, src: impl Into<anyhow::Error>) -> Self {
        self.sources.push(src.into());
        self
    }

    /// Record the byte offset into the configuration text where the error was detected.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self.with_context("offset", offset)
    }

    /// The class of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The error message, without context and sources.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The byte offset of a [`ErrorKind::ConfigSyntaxError`].
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// Look up a context value by key.
    pub fn context(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Return an iterator over all sources of this error.
    pub fn sources(&self) -> impl ExactSizeIterator<Item = &(dyn std::error::Error + 'static)> {
        self.sources.iter().map(|v| v.as_ref())
    }

    /// Default constructor for [`Error`] from [`io::Error`] on the write path.
    pub fn from_io_error(err: io::Error) -> Error {
        Error::new(ErrorKind::Unexpected, "failed to perform io").with_source(err)
    }
}
