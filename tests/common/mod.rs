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

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;

use logconf::Append;
use logconf::Error;
use logconf::Record;
use logconf::Registry;
use logconf::layout::PatternLayout;
use logconf::sink::SinkFactory;
use logconf::sink::SinkSpec;

type Lines = Arc<Mutex<Vec<(String, String)>>>;

/// A sink factory whose sinks record formatted lines in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingFactory {
    created: Arc<Mutex<Vec<String>>>,
    lines: Lines,
}

impl RecordingFactory {
    /// Sink names in creation order.
    pub fn created(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    /// Lines written to the sink `name`.
    pub fn lines(&self, name: &str) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(sink, _)| sink == name)
            .map(|(_, line)| line.clone())
            .collect()
    }

    pub fn registry(&self) -> Registry {
        Registry::builder().sink_factory(self.clone()).build()
    }
}

impl SinkFactory for RecordingFactory {
    fn create(&self, name: &str, _: &SinkSpec) -> Result<Box<dyn Append>, Error> {
        self.created.lock().unwrap().push(name.to_string());
        Ok(Box::new(Recording {
            sink: name.to_string(),
            lines: self.lines.clone(),
        }))
    }
}

#[derive(Debug)]
struct Recording {
    sink: String,
    lines: Lines,
}

impl Append for Recording {
    fn append(&self, record: &Record, layout: &PatternLayout) -> Result<(), Error> {
        let line = String::from_utf8_lossy(&layout.format(record, false)).into_owned();
        self.lines.lock().unwrap().push((self.sink.clone(), line));
        Ok(())
    }
}
