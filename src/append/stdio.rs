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

use std::io::Write;

use crate::Error;
use crate::Record;
use crate::append::Append;
use crate::layout::PatternLayout;

/// An appender that prints log records to stdout.
///
/// # Examples
///
/// ```
/// use logconf::append::Stdout;
///
/// let plain = Stdout::default();
/// let colored = Stdout::default().with_color(true);
/// ```
#[derive(Debug, Default)]
pub struct Stdout {
    color: bool,
}

impl Stdout {
    /// Render the `%^`..`%$` range of the pattern in level colors.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

impl Append for Stdout {
    fn append(&self, record: &Record, layout: &PatternLayout) -> Result<(), Error> {
        let mut bytes = layout.format(record, self.color);
        bytes.push(b'\n');
        std::io::stdout()
            .lock()
            .write_all(&bytes)
            .map_err(Error::from_io_error)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        std::io::stdout().flush().map_err(Error::from_io_error)
    }
}

/// An appender that prints log records to stderr.
#[derive(Debug, Default)]
pub struct Stderr {
    color: bool,
}

impl Stderr {
    /// Render the `%^`..`%$` range of the pattern in level colors.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

impl Append for Stderr {
    fn append(&self, record: &Record, layout: &PatternLayout) -> Result<(), Error> {
        let mut bytes = layout.format(record, self.color);
        bytes.push(b'\n');
        std::io::stderr()
            .lock()
            .write_all(&bytes)
            .map_err(Error::from_io_error)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        std::io::stderr().flush().map_err(Error::from_io_error)
    }
}
