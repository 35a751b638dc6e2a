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

//! Appender for writing log records to the local syslog daemon.

use std::path::Path;
use std::sync::Mutex;
use std::sync::PoisonError;

use fasyslog::sender::SyslogSender;
use jiff::Zoned;

use crate::Error;
use crate::ErrorKind;
use crate::Level;
use crate::Record;
use crate::append::Append;
use crate::layout::PatternLayout;

const SOCKET_PATHS: [&str; 3] = ["/dev/log", "/var/run/syslog", "/var/run/log"];

// LOG_USER
const FACILITY_USER: u8 = 1;

/// An appender that sends [RFC 3164] messages over the local syslog socket.
///
/// Each record becomes `<PRI>Mmm dd hh:mm:ss ident[pid]: message`, with the message rendered by
/// the layout passed to [`Append::append`].
///
/// [RFC 3164]: https://datatracker.ietf.org/doc/html/rfc3164
#[derive(Debug)]
pub struct Syslog {
    ident: String,
    sender: Mutex<SyslogSender>,
}

impl Syslog {
    /// Connect to the first well-known syslog socket present on this host.
    pub fn new(ident: impl Into<String>) -> Result<Self, Error> {
        let Some(path) = SOCKET_PATHS
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
        else {
            return Err(Error::new(
                ErrorKind::SinkCreateFailure,
                "no syslog socket found",
            )
            .with_context("path", SOCKET_PATHS.join(", ")));
        };

        Self::with_socket(ident, path)
    }

    /// Connect to the syslog daemon listening on the unix socket at `path`.
    pub fn with_socket(ident: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let sender = fasyslog::sender::unix(path).map_err(|err| {
            Error::new(ErrorKind::SinkCreateFailure, "failed to connect to syslog")
                .with_context("path", path.display())
                .with_source(err)
        })?;

        Ok(Self {
            ident: ident.into(),
            sender: Mutex::new(sender),
        })
    }
}

impl Append for Syslog {
    fn append(&self, record: &Record, layout: &PatternLayout) -> Result<(), Error> {
        let message = layout.format(record, false);
        let line = format_rfc3164(
            &self.ident,
            record.level(),
            &Zoned::now(),
            &String::from_utf8_lossy(&message),
        );

        let mut sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        sender
            .send_formatted(line.as_bytes())
            .map_err(Error::from_io_error)
    }

    fn flush(&self) -> Result<(), Error> {
        let mut sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        sender.flush().map_err(Error::from_io_error)
    }
}

fn severity(level: Level) -> u8 {
    match level {
        Level::Critical => 2,
        Level::Error => 3,
        Level::Warn => 4,
        Level::Info => 6,
        Level::Debug | Level::Trace => 7,
    }
}

fn format_rfc3164(ident: &str, level: Level, now: &Zoned, message: &str) -> String {
    let priority = FACILITY_USER * 8 + severity(level);
    let timestamp = now.strftime("%b %e %H:%M:%S");
    let pid = std::process::id();
    match ident {
        "" => format!("<{priority}>{timestamp} [{pid}]: {message}"),
        ident => format!("<{priority}>{timestamp} {ident}[{pid}]: {message}"),
    }
}
