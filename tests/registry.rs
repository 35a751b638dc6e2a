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

use std::sync::Arc;

use logconf::ErrorKind;
use logconf::LevelFilter;
use logconf::SyncMode;
use logconf::layout::DEFAULT_PATTERN;
use logconf::registry::DEFAULT_LOGGER_ID;
use logconf::registry::DEFAULT_LOGGER_NAME;
use logconf::registry::MAX_LOGGERS;
use serde_json::json;

mod common;

use common::RecordingFactory;

#[test]
fn test_initialize_registers_configured_logger() {
    let factory = RecordingFactory::default();
    let registry = factory.registry();

    registry
        .initialize_from_str(
            r#"{
                "SINKS": { "c1": { "type": "stdout_color_sink_st" } },
                "PATTERNS": { "p1": "[%n] %v" },
                "LOGGERS": { "L1": { "sinks": ["c1"], "pattern": "p1", "level": "warn" } }
            }"#,
        )
        .unwrap();

    let id = registry.logger_id("L1").unwrap();
    assert_eq!(id.as_u32(), 1);
    assert_eq!(registry.names(), [DEFAULT_LOGGER_NAME, "L1"]);

    let logger = registry.logger_by_id(id).unwrap();
    assert!(Arc::ptr_eq(&logger, &registry.logger("L1").unwrap()));
    assert_eq!(logger.level(), LevelFilter::Warn);
    assert_eq!(logger.pattern(), "[%n] %v");
    assert_eq!(logger.sync_mode(), SyncMode::Sync);

    logconf::info!(logger, "below threshold");
    logconf::warn!(logger, "hello {}", "world");
    // "Logger started" is emitted at info, below warn
    assert_eq!(factory.lines("c1"), ["[L1] hello world"]);
}

#[test]
fn test_logger_started_is_emitted() {
    let factory = RecordingFactory::default();
    let registry = factory.registry();

    registry
        .initialize_from_str(
            r#"{
                "SINKS": { "c1": { "type": "stdout_sink_mt" } },
                "PATTERNS": { "p1": "%n|%l|%v" },
                "LOGGERS": {
                    "first": { "sinks": ["c1"], "pattern": "p1" },
                    "second": { "sinks": ["c1"], "pattern": "p1", "level": "debug" }
                }
            }"#,
        )
        .unwrap();

    assert_eq!(
        factory.lines("c1"),
        ["first|info|Logger started", "second|info|Logger started"]
    );
}

#[test]
fn test_document_without_loggers_keeps_default_logger() {
    for text in [
        r#"{}"#,
        r#"{ "SINKS": { "c1": { "type": "stdout_sink_st" } } }"#,
        r#"{ "PATTERNS": { "p1": "%v" }, "THREAD_POOL": { "thread_count": 2 } }"#,
    ] {
        let factory = RecordingFactory::default();
        let registry = factory.registry();

        registry.initialize_from_str(text).unwrap();
        assert_eq!(registry.len(), 1, "{text}");
        assert_eq!(
            registry.logger_id(DEFAULT_LOGGER_NAME).unwrap(),
            DEFAULT_LOGGER_ID
        );

        let by_id = registry.logger_by_id(DEFAULT_LOGGER_ID).unwrap();
        let by_name = registry.logger(DEFAULT_LOGGER_NAME).unwrap();
        assert!(Arc::ptr_eq(&by_id, &by_name));
        assert!(Arc::ptr_eq(&by_id, &registry.default_logger()));

        // sinks nobody references are never built
        assert!(factory.created().is_empty(), "{text}");
    }
}

#[test]
fn test_defaults_for_absent_fields() {
    let factory = RecordingFactory::default();
    let registry = factory.registry();

    registry
        .initialize_from_str(r#"{ "LOGGERS": { "bare": {} } }"#)
        .unwrap();

    let bare = registry.logger("bare").unwrap();
    assert_eq!(bare.level(), LevelFilter::Info);
    assert_eq!(bare.pattern(), DEFAULT_PATTERN);
    assert_eq!(bare.sync_mode(), SyncMode::Sync);

    let default = registry.default_logger();
    assert_eq!(bare.sinks().len(), 1);
    assert!(Arc::ptr_eq(&bare.sinks()[0], &default.sinks()[0]));
    assert!(factory.created().is_empty());
}

#[test]
fn test_empty_sink_list_means_no_sinks() {
    let registry = RecordingFactory::default().registry();

    registry
        .initialize_from_str(r#"{ "LOGGERS": { "silent": { "sinks": [] } } }"#)
        .unwrap();

    let silent = registry.logger("silent").unwrap();
    assert!(silent.sinks().is_empty());
    logconf::critical!(silent, "goes nowhere");
}

#[test]
fn test_sinks_are_shared_between_loggers() {
    let factory = RecordingFactory::default();
    let registry = factory.registry();

    registry
        .initialize_from_str(
            r#"{
                "SINKS": {
                    "shared": { "type": "stderr_sink_mt" },
                    "other": { "type": "stderr_color_sink_st" }
                },
                "LOGGERS": {
                    "a": { "sinks": ["shared", "other"] },
                    "b": { "sinks": ["shared"] }
                }
            }"#,
        )
        .unwrap();

    let a = registry.logger("a").unwrap();
    let b = registry.logger("b").unwrap();
    assert!(Arc::ptr_eq(&a.sinks()[0], &b.sinks()[0]));
    assert_eq!(a.sinks()[1].name(), "other");
    assert_eq!(factory.created(), ["shared", "other"]);
}

#[test]
fn test_sink_level_and_pattern_override_logger() {
    let factory = RecordingFactory::default();
    let registry = factory.registry();

    registry
        .initialize_from_str(
            r#"{
                "SINKS": {
                    "loud": { "type": "stdout_sink_st" },
                    "errors": { "type": "stderr_sink_st", "level": "error", "pattern": "short" }
                },
                "PATTERNS": { "long": "[%n] [%l] %v", "short": "%L %v" },
                "LOGGERS": { "app": { "sinks": ["loud", "errors"], "pattern": "long", "level": "trace" } }
            }"#,
        )
        .unwrap();

    let app = registry.logger("app").unwrap();
    logconf::debug!(app, "step");
    logconf::error!(app, "boom");

    assert_eq!(
        factory.lines("loud"),
        [
            "[app] [info] Logger started",
            "[app] [debug] step",
            "[app] [error] boom"
        ]
    );
    assert_eq!(factory.lines("errors"), ["E boom"]);
}

#[test]
fn test_malformed_document_leaves_registry_untouched() {
    let registry = RecordingFactory::default().registry();

    let err = registry
        .initialize_from_str(r#"{ "LOGGERS": { "L1": { "level": "info" "#)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigSyntaxError);
    assert_eq!(registry.len(), 1);
    assert!(registry.logger("L1").is_none());
}

#[test]
fn test_async_logger_without_thread_pool() {
    let registry = RecordingFactory::default().registry();

    let err = registry
        .initialize_from_str(
            r#"{
                "THREAD_POOL": { "thread_count": 0 },
                "LOGGERS": { "A": { "sinks": [], "sync_type": "async" } }
            }"#,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ThreadPoolUnavailable);
    assert_eq!(err.context("logger"), Some("A"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_async_logger_delivers_in_order() {
    let factory = RecordingFactory::default();
    let registry = factory.registry();

    registry
        .initialize_from_str(
            r#"{
                "THREAD_POOL": { "thread_count": 1, "queue_size": 64 },
                "SINKS": { "q": { "type": "stdout_sink_mt" } },
                "PATTERNS": { "bare": "%v" },
                "LOGGERS": {
                    "blocking": { "sinks": ["q"], "pattern": "bare", "sync_type": "async" },
                    "lossy": { "sinks": ["q"], "pattern": "bare", "sync_type": "async_nb", "level": "warn" }
                }
            }"#,
        )
        .unwrap();

    let blocking = registry.logger("blocking").unwrap();
    assert_eq!(blocking.sync_mode(), SyncMode::Async);
    assert_eq!(
        registry.logger("lossy").unwrap().sync_mode(),
        SyncMode::AsyncNonBlocking
    );

    for i in 0..100 {
        logconf::info!(blocking, "m{i}");
    }
    blocking.flush();

    let lines = factory.lines("q");
    let expected = std::iter::once("Logger started".to_string())
        .chain((0..100).map(|i| format!("m{i}")))
        .collect::<Vec<_>>();
    assert_eq!(lines, expected);
}

#[test]
fn test_failure_rolls_back_whole_document() {
    let factory = RecordingFactory::default();
    let registry = factory.registry();

    let err = registry
        .initialize_from_str(
            r#"{
                "SINKS": { "c1": { "type": "stdout_sink_st" } },
                "LOGGERS": {
                    "good": { "sinks": ["c1"] },
                    "bad": { "sinks": ["c9"] }
                }
            }"#,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SinkNotDefined);
    assert_eq!(err.context("logger"), Some("bad"));
    assert_eq!(err.context("sink"), Some("c9"));

    assert_eq!(registry.len(), 1);
    assert!(registry.logger("good").is_none());
    // nothing was registered, so nothing was announced
    assert!(factory.lines("c1").is_empty());
}

#[test]
fn test_configuration_errors() {
    let cases = [
        (
            r#"{ "SINKS": { "s": { "level": "info" } }, "LOGGERS": { "L": { "sinks": ["s"] } } }"#,
            ErrorKind::UnknownSinkType,
        ),
        (
            r#"{ "SINKS": { "s": { "type": "carrier_pigeon_sink_mt" } }, "LOGGERS": { "L": { "sinks": ["s"] } } }"#,
            ErrorKind::UnknownSinkType,
        ),
        (
            r#"{ "LOGGERS": { "L": { "pattern": "missing" } } }"#,
            ErrorKind::UnknownPatternReference,
        ),
        (
            r#"{ "LOGGERS": { "L": { "sync_type": "eventually" } } }"#,
            ErrorKind::UnknownSyncMode,
        ),
        (
            r#"{ "LOGGERS": { "L": { "level": "loud" } } }"#,
            ErrorKind::ConfigInvalid,
        ),
        (
            r#"{ "LOGGERS": { "L": { "sinks": "c1" } } }"#,
            ErrorKind::ConfigInvalid,
        ),
        (r#"[1, 2, 3]"#, ErrorKind::ConfigInvalid),
    ];

    for (text, kind) in cases {
        let registry = RecordingFactory::default().registry();
        let err = registry.initialize_from_str(text).unwrap_err();
        assert_eq!(err.kind(), kind, "{text}: {err}");
        assert_eq!(registry.len(), 1, "{text}");
    }
}

#[test]
fn test_duplicate_logger_across_initializations() {
    let registry = RecordingFactory::default().registry();
    let text = r#"{ "LOGGERS": { "L1": { "sinks": [] } } }"#;

    registry.initialize_from_str(text).unwrap();
    let first = registry.logger("L1").unwrap();

    let err = registry.initialize_from_str(text).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateLoggerName);
    assert_eq!(registry.len(), 2);
    assert!(Arc::ptr_eq(&first, &registry.logger("L1").unwrap()));

    let err = registry
        .initialize_from_str(r#"{ "LOGGERS": { "DEFAULT": {} } }"#)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateLoggerName);
}

#[test]
fn test_registry_capacity() {
    let registry = RecordingFactory::default().registry();

    let loggers = (1..MAX_LOGGERS)
        .map(|i| (format!("L{i}"), json!({ "sinks": [] })))
        .collect::<serde_json::Map<_, _>>();
    let document = json!({ "LOGGERS": loggers });
    registry.initialize_from_str(&document.to_string()).unwrap();
    assert_eq!(registry.len(), MAX_LOGGERS);

    for (i, name) in registry.names().iter().enumerate() {
        assert_eq!(registry.logger_id(name).unwrap().as_u32() as usize, i);
    }

    let err = registry
        .initialize_from_str(r#"{ "LOGGERS": { "one_too_many": { "sinks": [] } } }"#)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RegistryCapacityExceeded);
    assert_eq!(registry.len(), MAX_LOGGERS);
}

#[test]
fn test_oversized_document_registers_nothing() {
    let registry = RecordingFactory::default().registry();

    let loggers = (0..MAX_LOGGERS)
        .map(|i| (format!("L{i}"), json!({ "sinks": [] })))
        .collect::<serde_json::Map<_, _>>();
    let document = json!({ "LOGGERS": loggers });

    let err = registry
        .initialize_from_str(&document.to_string())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RegistryCapacityExceeded);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let registry = RecordingFactory::default().registry();

    let err = registry
        .initialize(dir.path().join("absent.json"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigNotFound);
    assert_eq!(registry.len(), 1);
}
