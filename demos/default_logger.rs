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

use logconf::Registry;

fn main() {
    let registry = Registry::new();
    let logger = registry.default_logger();

    logconf::critical!(logger, "Hello critical!");
    logconf::error!(logger, "Hello error!");
    logconf::warn!(logger, "Hello warn!");
    logconf::info!(logger, "Hello info!");
    logconf::debug!(logger, "Hello debug!");

    logconf::bridge::setup_log_crate(logger);
    log::info!("Hello from the log crate!");
}
