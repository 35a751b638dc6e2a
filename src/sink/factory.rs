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

use crate::Error;
use crate::ErrorKind;
use crate::append::Append;
use crate::append::BasicFile;
use crate::append::DailyFile;
use crate::append::RotatingFile;
use crate::append::Stderr;
use crate::append::Stdout;
use crate::sink::SinkKind;
use crate::sink::SinkParams;
use crate::sink::SinkSpec;

/// Constructs the appender behind a configured sink.
///
/// The registry calls the factory once per sink name and initialization; the returned appender
/// is wrapped into a shared [`Sink`](crate::sink::Sink). Directories of file-based sinks exist
/// by the time `create` is called.
pub trait SinkFactory: fmt::Debug + Send + Sync + 'static {
    /// Build the appender for the sink `name`.
    fn create(&self, name: &str, spec: &SinkSpec) -> Result<Box<dyn Append>, Error>;
}

impl<T: SinkFactory> From<T> for Box<dyn SinkFactory> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

/// The factory for the console, file and syslog appenders of this crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSinkFactory;

impl SinkFactory for DefaultSinkFactory {
    fn create(&self, name: &str, spec: &SinkSpec) -> Result<Box<dyn Append>, Error> {
        let kind = spec.kind();
        let append: Box<dyn Append> = match (kind, spec.params()) {
            (SinkKind::StdoutSt | SinkKind::StdoutMt, _) => Stdout::default().into(),
            (SinkKind::StdoutColorSt | SinkKind::StdoutColorMt, _) => {
                Stdout::default().with_color(true).into()
            }
            (SinkKind::StderrSt | SinkKind::StderrMt, _) => Stderr::default().into(),
            (SinkKind::StderrColorSt | SinkKind::StderrColorMt, _) => {
                Stderr::default().with_color(true).into()
            }
            #[cfg(all(unix, feature = "append-syslog"))]
            (SinkKind::SyslogSt | SinkKind::SyslogMt, SinkParams::Syslog { ident }) => {
                crate::append::Syslog::new(ident.as_str())?.into()
            }
            (
                SinkKind::BasicFileSt | SinkKind::BasicFileMt,
                SinkParams::BasicFile { path, truncate },
            ) => BasicFile::new(path, *truncate)?.into(),
            (
                SinkKind::DailyFileSt | SinkKind::DailyFileMt,
                SinkParams::DailyFile {
                    base,
                    rotation_hour,
                    rotation_minute,
                    truncate,
                },
            ) => DailyFile::new(base, *rotation_hour, *rotation_minute, *truncate)?.into(),
            (
                SinkKind::RotatingFileSt | SinkKind::RotatingFileMt,
                SinkParams::RotatingFile {
                    base,
                    max_size,
                    max_files,
                },
            ) => RotatingFile::new(base, *max_size, *max_files)?.into(),
            (kind, _) => {
                return Err(Error::new(
                    ErrorKind::SinkCreateFailure,
                    "sink parameters do not match the sink type",
                )
                .with_context("sink", name)
                .with_context("type", kind));
            }
        };

        Ok(append)
    }
}
