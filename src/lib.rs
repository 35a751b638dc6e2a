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

//! Logconf builds a registry of named loggers from a JSON configuration document.
//!
//! # Overview
//!
//! A configuration document declares sinks (console, syslog, plain files, daily files and
//! size-rotated files), named format patterns, an optional thread pool for asynchronous logging,
//! and loggers composed from them. [`Registry::initialize`] validates the document, builds every
//! logger, and registers them under their names with dense ids. A registry always holds a
//! default logger writing to the console.
//!
//! # Examples
//!
//! Log through the default logger:
//!
//! ```
//! let registry = logconf::Registry::new();
//! let logger = registry.default_logger();
//! logconf::info!(logger, "listening on port {}", 8080);
//! ```
//!
//! Build loggers from a configuration document:
//!
//! ```
//! use logconf::Registry;
//!
//! let registry = Registry::new();
//! registry
//!     .initialize_from_str(
//!         r#"{
//!             "THREAD_POOL": { "thread_count": 1, "queue_size": 1024 },
//!             "SINKS": { "console": { "type": "stderr_color_sink_mt", "level": "warn" } },
//!             "PATTERNS": { "short": "%H:%M:%S [%l] %v" },
//!             "LOGGERS": {
//!                 "net": { "sinks": ["console"], "pattern": "short", "sync_type": "async" }
//!             }
//!         }"#,
//!     )
//!     .unwrap();
//!
//! let net = registry.logger("net").unwrap();
//! logconf::error!(net, "connection reset");
//! net.flush();
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod error;
mod macros;
mod record;
mod resolve;

pub mod append;
pub mod bridge;
pub mod config;
pub mod layout;
pub mod logger;
pub mod registry;
pub mod sink;
pub mod thread_pool;
pub mod trap;

pub use self::append::Append;
pub use self::error::Error;
pub use self::error::ErrorKind;
pub use self::logger::Logger;
pub use self::logger::LoggerHandle;
pub use self::logger::SyncMode;
pub use self::record::Level;
pub use self::record::LevelFilter;
pub use self::record::Record;
pub use self::record::RecordBuilder;
pub use self::registry::LoggerId;
pub use self::registry::Registry;
