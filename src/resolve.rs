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

//! Resolution of sink references into shared sink handles.

use std::collections::HashMap;
use std::sync::Arc;

use crate::Error;
use crate::ErrorKind;
use crate::LevelFilter;
use crate::config::ConfigDocument;
use crate::layout::PatternLayout;
use crate::sink::Sink;
use crate::sink::SinkFactory;
use crate::sink::SinkHandle;
use crate::sink::SinkKind;
use crate::sink::SinkSpec;
use crate::sink::ensure_parent_dir;

/// State of one initialization pass: each sink name is built at most once and shared by every
/// logger referencing it.
pub(crate) struct BuildContext<'a> {
    document: &'a ConfigDocument,
    factory: &'a dyn SinkFactory,
    sinks: HashMap<String, SinkHandle>,
}

impl<'a> BuildContext<'a> {
    pub(crate) fn new(document: &'a ConfigDocument, factory: &'a dyn SinkFactory) -> Self {
        Self {
            document,
            factory,
            sinks: HashMap::new(),
        }
    }

    /// Look up the format string of the pattern `name`.
    pub(crate) fn pattern(&self, name: &str) -> Option<&'a str> {
        self.document.pattern(name)
    }

    /// Return the sink `name`, building it on first reference.
    pub(crate) fn resolve(&mut self, name: &str) -> Result<SinkHandle, Error> {
        if let Some(sink) = self.sinks.get(name) {
            return Ok(sink.clone());
        }

        let sink = Arc::new(self.build(name)?);
        self.sinks.insert(name.to_string(), sink.clone());
        Ok(sink)
    }

    fn build(&self, name: &str) -> Result<Sink, Error> {
        let config = match self.document.sink(name) {
            Some(config) => config?,
            None => {
                return Err(Error::new(ErrorKind::SinkNotDefined, "sink is not defined")
                    .with_context("sink", name));
            }
        };

        let Some(kind) = config.kind.as_deref() else {
            return Err(Error::new(ErrorKind::UnknownSinkType, "sink declares no type")
                .with_context("sink", name)
                .with_context("field", "type"));
        };
        let kind = kind
            .parse::<SinkKind>()
            .map_err(|err| err.with_context("sink", name))?;

        let spec = SinkSpec::from_config(name, kind, &config);
        if let Some(path) = spec.file_path() {
            ensure_parent_dir(path).map_err(|err| err.with_context("sink", name))?;
        }

        let append = self
            .factory
            .create(name, &spec)
            .map_err(|err| err.with_context("sink", name))?;
        let mut sink = Sink::new(name, kind, append);

        if let Some(level) = config.level.as_deref() {
            let level = level
                .parse::<LevelFilter>()
                .map_err(|err| err.with_context("sink", name).with_context("field", "level"))?;
            sink = sink.with_level(level);
        }

        if let Some(pattern) = config.pattern.as_deref() {
            let Some(format) = self.pattern(pattern) else {
                return Err(Error::new(
                    ErrorKind::UnknownPatternReference,
                    "pattern is not defined",
                )
                .with_context("sink", name)
                .with_context("pattern", pattern));
            };
            sink = sink.with_layout(PatternLayout::new(format));
        }

        log::debug!(target: "logconf", "sink '{name}' created as {kind}");
        Ok(sink)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::Record;
    use crate::append::Append;
    use crate::config::parse;

    #[derive(Debug)]
    struct Null;

    impl Append for Null {
        fn append(&self, _: &Record, _: &PatternLayout) -> Result<(), Error> {
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct Recording(Mutex<Vec<(String, SinkSpec)>>);

    impl SinkFactory for Recording {
        fn create(&self, name: &str, spec: &SinkSpec) -> Result<Box<dyn Append>, Error> {
            self.0.lock().unwrap().push((name.to_string(), spec.clone()));
            Ok(Box::new(Null))
        }
    }

    #[test]
    fn test_each_name_built_once() {
        let document = parse(
            r#"{ SINKS: { c1: { type: "stdout_sink_mt" }, c2: { type: "stderr_sink_st" } } }"#,
        )
        .unwrap();
        let factory = Recording::default();
        let mut context = BuildContext::new(&document, &factory);

        let a = context.resolve("c1").unwrap();
        let b = context.resolve("c2").unwrap();
        let c = context.resolve("c1").unwrap();

        assert!(Arc::ptr_eq(&a, &c));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.kind(), SinkKind::StdoutMt);
        assert_eq!(factory.0.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_unresolvable_sinks() {
        let document = parse(
            r#"{ SINKS: {
                untyped: { level: "info" },
                odd: { type: "carrier_pigeon_sink_mt" },
                bad_level: { type: "stdout_sink_st", level: "loud" },
                bad_pattern: { type: "stdout_sink_st", pattern: "missing" },
            } }"#,
        )
        .unwrap();
        let factory = Recording::default();
        let mut context = BuildContext::new(&document, &factory);

        let err = context.resolve("absent").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SinkNotDefined);
        assert_eq!(err.context("sink"), Some("absent"));

        let err = context.resolve("untyped").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownSinkType);

        let err = context.resolve("odd").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownSinkType);
        assert_eq!(err.context("type"), Some("carrier_pigeon_sink_mt"));

        let err = context.resolve("bad_level").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert_eq!(err.context("field"), Some("level"));

        let err = context.resolve("bad_pattern").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownPatternReference);
        assert_eq!(err.context("pattern"), Some("missing"));
    }

    #[test]
    fn test_sink_level_and_pattern() {
        let document = parse(
            r#"{
                SINKS: { c1: { type: "stdout_sink_st", level: "error", pattern: "short" } },
                PATTERNS: { short: "%L %v" },
            }"#,
        )
        .unwrap();
        let factory = Recording::default();
        let mut context = BuildContext::new(&document, &factory);

        let sink = context.resolve("c1").unwrap();
        assert_eq!(sink.level(), LevelFilter::Error);
        assert_eq!(sink.layout().map(PatternLayout::pattern), Some("%L %v"));
    }

    #[test]
    fn test_file_sink_directory_created() {
        let temp_dir = tempfile::tempdir().unwrap();
        let base = temp_dir.path().join("nested").join("deeper").join("rotate.log");
        let text = format!(
            r#"{{ "SINKS": {{ "r": {{ "type": "rotating_file_sink_mt", "base_file_name": {:?} }} }} }}"#,
            base.display().to_string()
        );
        let document = parse(&text).unwrap();
        let factory = Recording::default();
        let mut context = BuildContext::new(&document, &factory);

        context.resolve("r").unwrap();
        assert!(temp_dir.path().join("nested").join("deeper").is_dir());

        let recorded = factory.0.lock().unwrap();
        assert_eq!(recorded[0].1.file_path(), Some(base.as_path()));
    }
}
