// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Explicit diagnostics handle.
//!
//! Every component (loader, cache, decoder, renderer) takes a [`Diagnostics`]
//! value instead of logging through a process-wide logger, so callers decide
//! where messages go and tests can capture them.
//!
//! ## Example
//!
//! ```
//! use protolens::logging::{Diagnostics, LogLevel, MemoryOutput};
//! use std::sync::Arc;
//!
//! let capture = Arc::new(MemoryOutput::new());
//! let diag = Diagnostics::new(capture.clone(), LogLevel::Debug);
//! diag.info(format_args!("loaded {} files", 3));
//! assert!(capture.contains("loaded 3 files"));
//! ```

mod output;

pub use output::{ConsoleOutput, LogLevel, MemoryOutput, NullOutput, Output, TracingOutput};

use std::fmt;
use std::sync::Arc;

/// Shared, cheaply clonable diagnostics sink with a minimum level.
#[derive(Clone)]
pub struct Diagnostics {
    output: Arc<dyn Output>,
    min_level: LogLevel,
}

impl Diagnostics {
    /// Route messages at or above `min_level` to `output`.
    pub fn new(output: Arc<dyn Output>, min_level: LogLevel) -> Self {
        Self { output, min_level }
    }

    /// Forward to `tracing`; the subscriber does its own filtering.
    pub fn tracing() -> Self {
        Self::new(Arc::new(TracingOutput), LogLevel::Debug)
    }

    /// Drop everything.
    pub fn silent() -> Self {
        Self::new(Arc::new(NullOutput), LogLevel::Error)
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Emit `message` at `level`. Output failures are ignored.
    pub fn log(&self, level: LogLevel, message: impl fmt::Display) {
        if self.enabled(level) {
            let _ = self.output.write(level, &message.to_string());
        }
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(LogLevel::Error, message);
    }

    pub fn flush(&self) {
        let _ = self.output.flush();
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::tracing()
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("min_level", &self.min_level)
            .finish_non_exhaustive()
    }
}
