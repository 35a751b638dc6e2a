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

use logconf::ErrorKind;
use logconf::Registry;
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_basic_file_sink_creates_directories() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let path = temp_dir.path().join("nested").join("deeper").join("app.log");

    let document = json!({
        "SINKS": { "file": { "type": "basic_file_sink_mt", "file_name": path } },
        "PATTERNS": { "plain": "[%l] %v" },
        "LOGGERS": { "app": { "sinks": ["file"], "pattern": "plain" } }
    });

    let registry = Registry::new();
    registry.initialize_from_str(&document.to_string()).unwrap();

    let app = registry.logger("app").unwrap();
    logconf::info!(app, "written to {}", "disk");
    logconf::debug!(app, "filtered");
    registry.flush_all();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "[info] Logger started\n[info] written to disk\n");
}

#[test]
fn test_config_file_on_disk() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let log_path = temp_dir.path().join("from_file.log");
    let config_path = temp_dir.path().join("logger.json");

    let document = json!({
        "SINKS": { "file": { "type": "basic_file_sink_st", "file_name": log_path, "truncate": true } },
        "PATTERNS": { "plain": "%n %v" },
        "LOGGERS": { "disk": { "sinks": ["file"], "pattern": "plain", "level": "warn" } }
    });
    fs::write(&config_path, document.to_string()).unwrap();

    let registry = Registry::new();
    registry.initialize(&config_path).unwrap();

    let disk = registry.logger("disk").unwrap();
    logconf::warn!(disk, "low battery");
    disk.flush();

    assert_eq!(fs::read_to_string(&log_path).unwrap(), "disk low battery\n");
}

#[test]
fn test_rotating_file_sink_keeps_max_files() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let base = temp_dir.path().join("rotate.log");

    let document = json!({
        "SINKS": { "r": {
            "type": "rotating_file_sink_mt",
            "base_file_name": base,
            "max_size": 100,
            "max_files": 2
        } },
        "PATTERNS": { "plain": "%v" },
        "LOGGERS": { "roll": { "sinks": ["r"], "pattern": "plain", "level": "info" } }
    });

    let registry = Registry::new();
    registry.initialize_from_str(&document.to_string()).unwrap();

    let roll = registry.logger("roll").unwrap();
    for i in 0..30 {
        logconf::info!(roll, "{i:02} {}", "x".repeat(40));
    }
    roll.flush();

    assert!(base.exists());
    assert!(temp_dir.path().join("rotate.1.log").exists());
    assert!(temp_dir.path().join("rotate.2.log").exists());
    assert!(!temp_dir.path().join("rotate.3.log").exists());

    let current = fs::read_to_string(&base).unwrap();
    assert!(current.ends_with(&format!("29 {}\n", "x".repeat(40))));
}

#[test]
fn test_daily_file_sink_names_file_by_date() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let base = temp_dir.path().join("logs").join("daily.log");

    let document = json!({
        "SINKS": { "d": { "type": "daily_file_sink_st", "base_file_name": base } },
        "LOGGERS": { "day": { "sinks": ["d"] } }
    });

    let registry = Registry::new();
    registry.initialize_from_str(&document.to_string()).unwrap();
    registry.flush_all();

    let files = fs::read_dir(temp_dir.path().join("logs"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    assert_eq!(files.len(), 1, "{files:?}");
    assert!(files[0].starts_with("daily_"), "{files:?}");
    assert!(files[0].ends_with(".log"), "{files:?}");
}

#[test]
fn test_invalid_rotation_time() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let base = temp_dir.path().join("daily.log");

    let document = json!({
        "SINKS": { "d": { "type": "daily_file_sink_mt", "base_file_name": base, "rotation_hour": 24 } },
        "LOGGERS": { "day": { "sinks": ["d"] } }
    });

    let registry = Registry::new();
    let err = registry
        .initialize_from_str(&document.to_string())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert_eq!(registry.len(), 1);
}

#[cfg(unix)]
#[test]
fn test_directory_create_failure() {
    let temp_dir = TempDir::new().expect("failed to create a temporary directory");
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let document = json!({
        "SINKS": { "f": { "type": "basic_file_sink_st", "file_name": blocker.join("app.log") } },
        "LOGGERS": { "app": { "sinks": ["f"] } }
    });

    let registry = Registry::new();
    let err = registry
        .initialize_from_str(&document.to_string())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DirectoryCreateFailure);
    assert_eq!(registry.len(), 1);
}
