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
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::PoisonError;

use crate::Error;
use crate::ErrorKind;
use crate::Record;
use crate::append::Append;
use crate::append::file::open_log_file;
use crate::append::file::split_by_extension;
use crate::append::file::with_file_suffix;
use crate::layout::PatternLayout;

/// An appender that rotates its file once it grows past a size limit.
///
/// Records go to `base.ext`. When a record would push the file past `max_size`, the files shift
/// by one index (`base.ext` to `base.1.ext`, `base.1.ext` to `base.2.ext`, and so on up to
/// `base.{max_files}.ext`, which is overwritten) and a fresh `base.ext` is started. With
/// `max_files` zero the current file is truncated instead.
#[derive(Debug)]
pub struct RotatingFile {
    state: Mutex<State>,
}

impl RotatingFile {
    /// Open `base` for size-based rotation.
    pub fn new(base: impl AsRef<Path>, max_size: u64, max_files: usize) -> Result<Self, Error> {
        let base = base.as_ref().to_path_buf();
        let writer = open_log_file(&base, false)?;
        let current_size = writer
            .metadata()
            .map(|metadata| metadata.len())
            .unwrap_or_default();

        Ok(Self {
            state: Mutex::new(State {
                base,
                max_size,
                max_files,
                current_size,
                writer,
            }),
        })
    }
}

impl Append for RotatingFile {
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
    max_size: u64,
    max_files: usize,
    current_size: u64,
    writer: fs::File,
}

impl State {
    fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let len = bytes.len() as u64;
        if self.current_size > 0 && self.current_size + len > self.max_size {
            self.rotate()?;
        }

        self.writer.write_all(bytes).map_err(Error::from_io_error)?;
        self.current_size += len;
        Ok(())
    }

    fn rotate(&mut self) -> Result<(), Error> {
        self.writer.flush().map_err(Error::from_io_error)?;

        for index in (1..=self.max_files).rev() {
            let src = calc_filename(&self.base, index - 1);
            if !src.exists() {
                continue;
            }
            let target = calc_filename(&self.base, index);
            if let Err(err) = fs::remove_file(&target) {
                if err.kind() != io::ErrorKind::NotFound {
                    return Err(rename_failure(&src, &target, err));
                }
            }
            fs::rename(&src, &target).map_err(|err| rename_failure(&src, &target, err))?;
        }

        self.writer = open_log_file(&self.base, true)?;
        self.current_size = 0;
        Ok(())
    }
}

fn rename_failure(src: &Path, target: &Path, err: io::Error) -> Error {
    Error::new(ErrorKind::Unexpected, "failed to rotate log file")
        .with_context("from", src.display())
        .with_context("to", target.display())
        .with_source(err)
}

/// `base.ext` for index 0, `base.{index}.ext` otherwise.
fn calc_filename(base: &Path, index: usize) -> PathBuf {
    if index == 0 {
        return base.to_path_buf();
    }
    let (stem, ext) = split_by_extension(base);
    with_file_suffix(&stem, &format!(".{index}{ext}"))
}
