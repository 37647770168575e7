// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor bundle loading.
//!
//! A bundle is a serialized `FileDescriptorSet`. Loading parses the
//! container, adds every file to a descriptor pool in stored order, and
//! flattens all message types into a [`TypeIndex`](crate::index::TypeIndex).

mod container;
mod linker;
mod loader;

pub(crate) use linker::declared_messages;
pub use linker::SchemaError;
pub use loader::{load_bundle, load_bundle_bytes, LoadedBundle, ResolvedFileSchema};
