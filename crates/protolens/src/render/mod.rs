// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON rendering.
//!
//! Output follows the protobuf JSON mapping (64-bit integers as strings,
//! bytes as base64, enums by name) and is always a single line.

mod json;

pub use json::{CanonicalJsonRenderer, RenderFallback, RenderOptions, Rendered};
