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

//! Output destinations for formatted log records.

use std::fmt;

use crate::Error;
use crate::Record;
use crate::layout::PatternLayout;

pub mod file;
mod stdio;
#[cfg(all(unix, feature = "append-syslog"))]
mod syslog;

pub use self::file::BasicFile;
pub use self::file::DailyFile;
pub use self::file::RotatingFile;
pub use self::stdio::Stderr;
pub use self::stdio::Stdout;
#[cfg(all(unix, feature = "append-syslog"))]
pub use self::syslog::Syslog;

/// A trait representing an appender that can process log records.
///
/// The layout is chosen by the caller: a sink passes its own pattern when one is configured,
/// otherwise the pattern of the logger that emitted the record.
pub trait Append: fmt::Debug + Send + Sync + 'static {
    /// Dispatches a log record to the append target.
    fn append(&self, record: &Record, layout: &PatternLayout) -> Result<(), Error>;

    /// Flushes any buffered records.
    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}

impl<T: Append> From<T> for Box<dyn Append> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}
