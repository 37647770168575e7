// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Diagnostics output backends (tracing, console and in-memory capture).
//!
//! Implementations are thread-safe; a single output may be shared by every
//! decode running against one loaded bundle.

use parking_lot::Mutex;
use std::io::{self, Write};

/// Log level enumeration for filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Debug: detailed development information
    Debug = 0,
    /// Info: general information about normal operation
    Info = 1,
    /// Warning: potentially harmful situations
    Warning = 2,
    /// Error: error conditions
    Error = 3,
}

impl LogLevel {
    /// Returns the string representation of the log level.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO ",
            Self::Warning => "WARN ",
            Self::Error => "ERROR",
        }
    }
}

/// Output destination trait for diagnostic messages.
pub trait Output: Send + Sync {
    /// Write a formatted message to the output.
    fn write(&self, level: LogLevel, message: &str) -> io::Result<()>;

    /// Flush any buffered output.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Forwards messages as `tracing` events under the `protolens` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingOutput;

impl Output for TracingOutput {
    fn write(&self, level: LogLevel, message: &str) -> io::Result<()> {
        match level {
            LogLevel::Debug => tracing::debug!(target: "protolens", "{}", message),
            LogLevel::Info => tracing::info!(target: "protolens", "{}", message),
            LogLevel::Warning => tracing::warn!(target: "protolens", "{}", message),
            LogLevel::Error => tracing::error!(target: "protolens", "{}", message),
        }
        Ok(())
    }
}

/// Console output implementation.
///
/// Writes directly to stderr with level prefix and newline.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleOutput;

impl Output for ConsoleOutput {
    fn write(&self, level: LogLevel, message: &str) -> io::Result<()> {
        let mut stderr = io::stderr().lock();
        writeln!(stderr, "[{}] {}", level.as_str(), message)
    }

    fn flush(&self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// Captures messages in memory so tests can assert on diagnostics.
#[derive(Debug, Default)]
pub struct MemoryOutput {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every captured message.
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.lock().clone()
    }

    /// Captured messages at exactly `level`.
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// True if any captured message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.lock().iter().any(|(_, m)| m.contains(needle))
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Output for MemoryOutput {
    fn write(&self, level: LogLevel, message: &str) -> io::Result<()> {
        self.entries.lock().push((level, message.to_string()));
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOutput;

impl Output for NullOutput {
    fn write(&self, _level: LogLevel, _message: &str) -> io::Result<()> {
        Ok(())
    }
}
