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

use crate::Error;
use crate::Record;
use crate::append::Append;
use crate::append::file::open_log_file;
use crate::layout::PatternLayout;

/// An appender that writes every record to a single file.
#[derive(Debug)]
pub struct BasicFile {
    path: PathBuf,
    writer: Mutex<fs::File>,
}

impl BasicFile {
    /// Open `path` for logging. With `truncate`, existing content is discarded.
    pub fn new(path: impl AsRef<Path>, truncate: bool) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let file = open_log_file(&path, truncate)?;
        Ok(Self {
            path,
            writer: Mutex::new(file),
        })
    }

    /// The path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Append for BasicFile {
    fn append(&self, record: &Record, layout: &PatternLayout) -> Result<(), Error> {
        let mut bytes = layout.format(record, false);
        bytes.push(b'\n');
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(&bytes).map_err(Error::from_io_error)
    }

    fn flush(&self) -> Result<(), Error> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.flush().map_err(Error::from_io_error)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::Level;
    use crate::append::file::generate_random_string;

    fn record(payload: &str) -> Record {
        Record::builder()
            .level(Level::Info)
            .logger(Arc::from("FILE"))
            .payload(payload)
            .build()
    }

    #[test]
    fn test_basic_file_appends_lines() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("basic.log");
        let layout = PatternLayout::new("%n %v");

        let payload = generate_random_string();
        let appender = BasicFile::new(&path, false).unwrap();
        appender.append(&record(&payload), &layout).unwrap();
        appender.append(&record("second"), &layout).unwrap();
        appender.flush().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("FILE {payload}\nFILE second\n"));
    }

    #[test]
    fn test_basic_file_truncate() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("basic.log");
        fs::write(&path, "stale line\n").unwrap();
        let layout = PatternLayout::new("%v");

        let appender = BasicFile::new(&path, false).unwrap();
        appender.append(&record("kept"), &layout).unwrap();
        drop(appender);
        assert_eq!(fs::read_to_string(&path).unwrap(), "stale line\nkept\n");

        let appender = BasicFile::new(&path, true).unwrap();
        appender.append(&record("fresh"), &layout).unwrap();
        drop(appender);
        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\n");
    }
}
