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

//! Appenders that write log records to files.
//!
//! Parent directories are not created here; the sink factory prepares them before an appender
//! is opened.

use std::fs;
use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;

use crate::Error;
use crate::ErrorKind;

pub use self::basic::BasicFile;
pub use self::daily::DailyFile;
pub use self::rotating::RotatingFile;

mod basic;
mod clock;
mod daily;
mod rotating;

/// Open a log file for appending, creating it if needed.
fn open_log_file(path: &Path, truncate: bool) -> Result<fs::File, Error> {
    let mut options = OpenOptions::new();
    options.create(true);
    if truncate {
        options.write(true).truncate(true);
    } else {
        options.append(true);
    }

    options.open(path).map_err(|err| {
        Error::new(ErrorKind::SinkCreateFailure, "failed to open log file")
            .with_context("path", path.display())
            .with_source(err)
    })
}

/// Split `path` into the part before the extension and the extension including its dot.
///
/// A leading dot of the file name is not an extension, so `.hidden` and `dir/.hidden` have
/// none, while `dir/.hidden.log` has `.log`.
fn split_by_extension(path: &Path) -> (PathBuf, String) {
    let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
        return (path.to_path_buf(), String::new());
    };

    match file_name.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < file_name.len() => {
            let (stem, ext) = file_name.split_at(pos);
            (path.with_file_name(stem), ext.to_string())
        }
        _ => (path.to_path_buf(), String::new()),
    }
}

/// Append `suffix` to the file name part of `base`.
fn with_file_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
fn generate_random_string() -> String {
    use rand::Rng;
    use rand::distr::Alphanumeric;

    let mut rng = rand::rng();
    let len = rng.random_range(50..=100);
    std::iter::repeat(())
        .map(|()| rng.sample(Alphanumeric))
        .map(char::from)
        .take(len)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_by_extension() {
        let cases = [
            ("mylog.txt", "mylog", ".txt"),
            ("logs/app.log", "logs/app", ".log"),
            ("logs/app", "logs/app", ""),
            (".mylog", ".mylog", ""),
            ("my_folder/.mylog", "my_folder/.mylog", ""),
            ("my_folder/.mylog.txt", "my_folder/.mylog", ".txt"),
            ("trailing.", "trailing.", ""),
            ("a.tar.gz", "a.tar", ".gz"),
        ];

        for (input, stem, ext) in cases {
            let (s, e) = split_by_extension(Path::new(input));
            assert_eq!(s, PathBuf::from(stem), "stem of {input}");
            assert_eq!(e, ext, "extension of {input}");
        }
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("absent").join("app.log");
        let err = open_log_file(&path, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SinkCreateFailure);
        assert!(err.context("path").is_some());
    }
}
