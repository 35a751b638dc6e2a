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

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::PoisonError;

use jiff::Timestamp;
use jiff::Zoned;

use crate::Error;
use crate::ErrorKind;
use crate::Record;
use crate::append::Append;
use crate::append::file::clock::Clock;
use crate::append::file::open_log_file;
use crate::append::file::split_by_extension;
use crate::append::file::with_file_suffix;
use crate::layout::PatternLayout;

/// An appender that starts a new file every day at a fixed local time.
///
/// Files are named `base_YYYY-MM-DD.ext` after the date at which they were opened.
#[derive(Debug)]
pub struct DailyFile {
    state: Mutex<State>,
}

impl DailyFile {
    /// Open the file for today and schedule the next switch at `hour:minute` local time.
    pub fn new(
        base: impl AsRef<Path>,
        hour: u8,
        minute: u8,
        truncate: bool,
    ) -> Result<Self, Error> {
        Self::with_clock(base, hour, minute, truncate, Clock::System)
    }

    fn with_clock(
        base: impl AsRef<Path>,
        hour: u8,
        minute: u8,
        truncate: bool,
        clock: Clock,
    ) -> Result<Self, Error> {
        if hour > 23 {
            return Err(invalid_rotation_time("rotation_hour", hour));
        }
        if minute > 59 {
            return Err(invalid_rotation_time("rotation_minute", minute));
        }

        let now = clock.now();
        let base = base.as_ref().to_path_buf();
        let path = calc_filename(&base, &now);
        let writer = open_log_file(&path, truncate)?;
        let next_rotation = next_rotation(&now, hour as i8, minute as i8)?;

        Ok(Self {
            state: Mutex::new(State {
                base,
                hour: hour as i8,
                minute: minute as i8,
                truncate,
                next_rotation,
                clock,
                path,
                writer,
            }),
        })
    }
}

impl Append for DailyFile {
    fn append(&self, record: &Record, layout: &PatternLayout) -> Result<(), Error> {
        let mut bytes = layout.format(record, false);
        bytes.push(b'\n');
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.write(&bytes)
    }

    fn flush(&self) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.writer.flush().map_err(Error::from_io_error)
    }
}

#[derive(Debug)]
struct State {
    base: PathBuf,
    hour: i8,
    minute: i8,
    truncate: bool,
    next_rotation: Timestamp,
    clock: Clock,
    path: PathBuf,
    writer: fs::File,
}

impl State {
    fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let now = self.clock.now();
        if now.timestamp() >= self.next_rotation {
            // a failed switch keeps the current file and is retried on the next record
            self.writer.flush().map_err(Error::from_io_error)?;
            let path = calc_filename(&self.base, &now);
            let writer = open_log_file(&path, self.truncate)?;
            self.writer = writer;
            self.path = path;
            self.next_rotation = next_rotation(&now, self.hour, self.minute)?;
        }

        self.writer.write_all(bytes).map_err(Error::from_io_error)
    }
}

fn invalid_rotation_time(field: &'static str, value: u8) -> Error {
    Error::new(ErrorKind::ConfigInvalid, "rotation time out of range")
        .with_context("field", field)
        .with_context("value", value)
}

/// `base_YYYY-MM-DD.ext` for the date of `now`.
fn calc_filename(base: &Path, now: &Zoned) -> PathBuf {
    let (stem, ext) = split_by_extension(base);
    with_file_suffix(&stem, &format!("_{}{ext}", now.strftime("%Y-%m-%d")))
}

/// The first instant strictly after `now` whose wall clock reads `hour:minute`.
fn next_rotation(now: &Zoned, hour: i8, minute: i8) -> Result<Timestamp, Error> {
    let today = now
        .with()
        .hour(hour)
        .minute(minute)
        .second(0)
        .subsec_nanosecond(0)
        .build()
        .map_err(rotation_time_failure)?;

    if today > *now {
        return Ok(today.timestamp());
    }
    today
        .tomorrow()
        .map(|next| next.timestamp())
        .map_err(rotation_time_failure)
}

fn rotation_time_failure(err: jiff::Error) -> Error {
    Error::new(ErrorKind::Unexpected, "failed to compute next rotation time").with_source(err)
}
