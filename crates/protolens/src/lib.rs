// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # protolens - schema-driven Protobuf decoding
//!
//! Decodes raw Protobuf payloads at runtime, with no generated bindings,
//! against the message types of a descriptor bundle (a serialized
//! `FileDescriptorSet`), and renders them as single-line JSON.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use protolens::{Diagnostics, Protolens, ProtolensConfig, Result};
//!
//! fn main() -> Result<()> {
//!     let config = ProtolensConfig::default().with_directory("/var/lib/descriptors");
//!     let lens = Protolens::new(config, Diagnostics::default());
//!
//!     let payload = [0x08, 0x2a];
//!     let json = lens.decode("orders", "shop.desc", "Order", &payload)?;
//!     println!("{json}");
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! bundle file --> bundle::load_bundle --> LoadedBundle { files, TypeIndex }
//!                                                             |
//! payload ------> DynamicDecoder ---> DynamicMessage ---> CanonicalJsonRenderer --> JSON line
//! ```
//!
//! | Type | Description |
//! |------|-------------|
//! | [`LoadedBundle`] | Linked file schemas plus their [`TypeIndex`] |
//! | [`DynamicDecoder`] | Descriptor-driven decoder, all-or-nothing |
//! | [`CanonicalJsonRenderer`] | Protobuf JSON mapping, one line per message |
//! | [`BundleCache`] | Reuses loads while the bundle file is unchanged |
//! | [`Protolens`] | Entry point tying configuration, cache and diagnostics together |

/// Descriptor bundle parsing and dependency-ordered linking.
pub mod bundle;
/// Bundle cache keyed by path and modification time.
pub mod cache;
/// YAML configuration (descriptor directory, decoder and render options).
pub mod config;
/// Runtime decoding of Protobuf wire data.
pub mod decode;
/// Decode entry point and the `MessageDeserializer` seam.
pub mod deserializer;
/// Crate error type.
pub mod error;
/// Name-keyed type lookup.
pub mod index;
/// Explicit diagnostics handle.
pub mod logging;
/// JSON rendering.
pub mod render;

#[cfg(test)]
mod test_support;

pub use bundle::{load_bundle, LoadedBundle, ResolvedFileSchema, SchemaError};
pub use cache::BundleCache;
pub use config::{ConfigError, ProtolensConfig};
pub use decode::{DecodeError, DynamicDecoder};
pub use deserializer::{MessageDeserializer, ProtobufMessageDeserializer, Protolens};
pub use error::{Error, ErrorKind, Result};
pub use index::{Lookup, SimpleNamePolicy, TypeIndex};
pub use logging::{Diagnostics, LogLevel};
pub use render::{CanonicalJsonRenderer, RenderFallback, RenderOptions, Rendered};

pub use prost_reflect;
pub use prost_reflect::{DescriptorPool, DynamicMessage, MessageDescriptor, Value};
