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

use std::path::PathBuf;

use logconf::Registry;

fn main() {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/logger.json"));

    let registry = Registry::new();
    if let Err(err) = registry.initialize(&path) {
        eprintln!("failed to initialize loggers from {}: {err}", path.display());
        std::process::exit(1);
    }

    for name in registry.names() {
        let id = registry.logger_id(&name).unwrap();
        let logger = registry.logger_by_id(id).unwrap();
        logconf::info!(logger, "logger {name} has id {id}");
        logconf::warn!(logger, "Hello warn!");
        logconf::debug!(logger, "Hello debug!");
    }

    registry.flush_all();
}
