// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decode entry point.
//!
//! [`Protolens`] owns the configuration, the diagnostics handle and the
//! bundle cache. [`ProtobufMessageDeserializer`] binds one topic to one
//! bundle and message type behind the [`MessageDeserializer`] seam.

use crate::bundle::LoadedBundle;
use crate::cache::BundleCache;
use crate::config::ProtolensConfig;
use crate::decode::DynamicDecoder;
use crate::error::{Error, Result};
use crate::index::Lookup;
use crate::logging::Diagnostics;
use crate::render::{CanonicalJsonRenderer, Rendered};
use prost_reflect::MessageDescriptor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Turns one raw payload into display text.
pub trait MessageDeserializer: Send + Sync {
    fn deserialize_message(&self, payload: &[u8]) -> Result<String>;
}

/// Shared decoding context.
#[derive(Debug)]
pub struct Protolens {
    config: ProtolensConfig,
    diagnostics: Diagnostics,
    cache: BundleCache,
}

impl Protolens {
    pub fn new(config: ProtolensConfig, diagnostics: Diagnostics) -> Self {
        let cache = BundleCache::new(config.index.simple_name_policy, diagnostics.clone());
        Self {
            config,
            diagnostics,
            cache,
        }
    }

    pub fn config(&self) -> &ProtolensConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn cache(&self) -> &BundleCache {
        &self.cache
    }

    /// An existing path is used as-is; anything else is a name inside the
    /// configured descriptor directory.
    pub fn resolve_path(&self, bundle: &str) -> PathBuf {
        let direct = Path::new(bundle);
        if direct.exists() || self.config.protobufdesc.directory.is_none() {
            direct.to_path_buf()
        } else {
            self.config.full_path(bundle)
        }
    }

    /// Load (or reuse) a bundle by path or directory-relative name.
    pub fn bundle(&self, bundle: &str) -> Result<Arc<LoadedBundle>> {
        self.cache.load(self.resolve_path(bundle))
    }

    /// Bundle file names in the configured directory.
    pub fn desc_files(&self) -> Vec<String> {
        self.config.desc_files()
    }

    /// Simple names of every message type in one bundle.
    pub fn message_types(&self, bundle: &str) -> Result<Vec<String>> {
        let loaded = self.bundle(bundle)?;
        Ok(loaded
            .index()
            .message_types()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// `(bundle file, simple type name)` for every bundle in the directory.
    pub fn all_message_types(&self) -> Result<Vec<(String, String)>> {
        let mut types = Vec::new();
        for file in self.desc_files() {
            for name in self.message_types(&file)? {
                types.push((file.clone(), name));
            }
        }
        Ok(types)
    }

    /// Pick the target type for `type_name` under the configured policy.
    pub fn select_type(
        &self,
        bundle: &LoadedBundle,
        type_name: &str,
    ) -> Result<MessageDescriptor> {
        let err = match bundle.index().select(type_name) {
            Lookup::Found(descriptor) => return Ok(descriptor),
            Lookup::NotFound => Error::TypeNotFound {
                path: bundle.path().to_path_buf(),
                type_name: type_name.to_string(),
            },
            Lookup::Ambiguous(candidates) => Error::AmbiguousType {
                path: bundle.path().to_path_buf(),
                type_name: type_name.to_string(),
                candidates,
            },
        };
        self.diagnostics.error(&err);
        Err(err)
    }

    /// Decode `payload` and render it as one JSON line.
    pub fn decode(
        &self,
        topic: &str,
        bundle: &str,
        type_name: &str,
        payload: &[u8],
    ) -> Result<String> {
        Ok(self.decode_with_report(topic, bundle, type_name, payload)?.json)
    }

    /// Like [`Protolens::decode`], also reporting `Any` values that were
    /// rendered as raw bytes.
    pub fn decode_with_report(
        &self,
        topic: &str,
        bundle: &str,
        type_name: &str,
        payload: &[u8],
    ) -> Result<Rendered> {
        let loaded = self.bundle(bundle)?;
        let descriptor = self.select_type(&loaded, type_name)?;
        let index = loaded.index();
        let max_depth = self.config.decoder.max_depth;

        let decoded = DynamicDecoder::new(&self.diagnostics)
            .with_max_depth(max_depth)
            .decode(&descriptor, payload)
            .map_err(|source| {
                let err = Error::Decode {
                    path: loaded.path().to_path_buf(),
                    topic: topic.to_string(),
                    type_name: type_name.to_string(),
                    resolved: descriptor.full_name().to_string(),
                    source,
                };
                self.diagnostics.error(&err);
                err
            })?;

        Ok(CanonicalJsonRenderer::new(index, &self.diagnostics)
            .with_options(self.config.render)
            .with_max_depth(max_depth)
            .render(&decoded))
    }

    /// A deserializer bound to one topic, bundle and type.
    pub fn deserializer(
        self: &Arc<Self>,
        topic: impl Into<String>,
        bundle: impl Into<String>,
        type_name: impl Into<String>,
    ) -> ProtobufMessageDeserializer {
        ProtobufMessageDeserializer::new(Arc::clone(self), topic, bundle, type_name)
    }
}

/// [`MessageDeserializer`] for Protobuf payloads of one configured type.
#[derive(Debug, Clone)]
pub struct ProtobufMessageDeserializer {
    context: Arc<Protolens>,
    topic: String,
    bundle: String,
    type_name: String,
}

impl ProtobufMessageDeserializer {
    pub fn new(
        context: Arc<Protolens>,
        topic: impl Into<String>,
        bundle: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            context,
            topic: topic.into(),
            bundle: bundle.into(),
            type_name: type_name.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl MessageDeserializer for ProtobufMessageDeserializer {
    fn deserialize_message(&self, payload: &[u8]) -> Result<String> {
        self.context
            .decode(&self.topic, &self.bundle, &self.type_name, payload)
    }
}
