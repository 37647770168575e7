// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic decoding of Protobuf payloads.
//!
//! Wire decoding is done by [`prost_reflect::DynamicMessage`]. On top of it
//! the decoder:
//!
//! - locates the top-level record that made a payload fail,
//! - bounds message nesting by a configurable depth limit,
//! - rejects messages that leave a proto2 `required` field unset,
//! - logs and drops unknown fields.
//!
//! Any error discards the partially built message.

mod decoder;

pub use decoder::{DecodeError, DynamicDecoder, DEFAULT_MAX_DEPTH};
