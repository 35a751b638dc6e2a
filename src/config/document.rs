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

use std::collections::HashMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;

use crate::Error;
use crate::ErrorKind;

/// A parsed configuration document.
///
/// Section entries stay untyped until they are used, so a malformed entry is reported with its
/// own name and does not hide the entries around it. Loggers keep their document order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigDocument {
    #[serde(rename = "THREAD_POOL", default)]
    thread_pool: Option<Value>,
    #[serde(rename = "SINKS", default)]
    sinks: Map<String, Value>,
    #[serde(rename = "PATTERNS", default)]
    patterns: HashMap<String, String>,
    #[serde(rename = "LOGGERS", default)]
    loggers: Map<String, Value>,
}

/// The `THREAD_POOL` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ThreadPoolConfig {
    pub thread_count: Option<usize>,
    pub queue_size: Option<usize>,
}

/// An entry of the `SINKS` section.
///
/// Fields a sink type does not use are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SinkConfig {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub level: Option<String>,
    pub pattern: Option<String>,
    pub file_name: Option<String>,
    pub base_file_name: Option<String>,
    pub truncate: Option<bool>,
    pub rotation_hour: Option<u8>,
    pub rotation_minute: Option<u8>,
    pub max_size: Option<u64>,
    pub max_files: Option<usize>,
    #[serde(alias = "indent")]
    pub ident: Option<String>,
}

/// An entry of the `LOGGERS` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggerConfig {
    pub sinks: Option<Vec<String>>,
    pub pattern: Option<String>,
    pub level: Option<String>,
    pub sync_type: Option<String>,
}

impl ConfigDocument {
    /// The `THREAD_POOL` section, if present.
    pub fn thread_pool(&self) -> Result<Option<ThreadPoolConfig>, Error> {
        self.thread_pool
            .as_ref()
            .map(|value| decode(value, "THREAD_POOL", "THREAD_POOL"))
            .transpose()
    }

    /// The definition of the sink `name`, if the `SINKS` section declares it.
    pub fn sink(&self, name: &str) -> Option<Result<SinkConfig, Error>> {
        self.sinks
            .get(name)
            .map(|value| decode(value, "sink", name))
    }

    /// The format string of the pattern `name`.
    pub fn pattern(&self, name: &str) -> Option<&str> {
        self.patterns.get(name).map(String::as_str)
    }

    /// Logger definitions in document order.
    pub fn loggers(&self) -> impl Iterator<Item = (&str, Result<LoggerConfig, Error>)> + '_ {
        self.loggers
            .iter()
            .map(|(name, value)| (name.as_str(), decode(value, "logger", name)))
    }
}

fn decode<T: DeserializeOwned>(value: &Value, entity: &'static str, name: &str) -> Result<T, Error> {
    T::deserialize(value).map_err(|err| {
        Error::new(ErrorKind::ConfigInvalid, format!("malformed {entity} definition"))
            .with_context(entity, name)
            .with_source(err)
    })
}
