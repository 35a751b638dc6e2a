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

/// Log a message at an explicit level, recording the call site.
///
/// ```
/// use logconf::Level;
/// use logconf::Registry;
///
/// let registry = Registry::new();
/// logconf::log!(registry.default_logger(), Level::Warn, "{} retries left", 3);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        let level: $crate::Level = $level;
        if logger.enabled(level) {
            logger.__log_at(level, file!(), line!(), format_args!($($arg)+));
        }
    }};
}

/// Log a message at the trace level.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Trace, $($arg)+)
    };
}

/// Log a message at the debug level.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($arg)+)
    };
}

/// Log a message at the info level.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($arg)+)
    };
}

/// Log a message at the warn level.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Warn, $($arg)+)
    };
}

/// Log a message at the error level.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($arg)+)
    };
}

/// Log a message at the critical level.
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Critical, $($arg)+)
    };
}
