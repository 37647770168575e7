// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML configuration.
//!
//! ```yaml
//! protobufdesc:
//!   directory: /var/lib/protolens/descriptors
//!   suffix: .desc
//! decoder:
//!   max_depth: 100
//! index:
//!   simple_name_policy: first_wins   # first_wins | last_wins | reject
//! render:
//!   json_names: false
//!   emit_implicit_defaults: false
//! ```
//!
//! Every section and key is optional.

use crate::decode::DEFAULT_MAX_DEPTH;
use crate::index::SimpleNamePolicy;
use crate::render::RenderOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProtolensConfig {
    pub protobufdesc: DescriptorDirConfig,
    pub decoder: DecoderConfig,
    pub index: IndexConfig,
    pub render: RenderOptions,
}

/// Where descriptor bundles live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DescriptorDirConfig {
    pub directory: Option<PathBuf>,
    /// File name suffix of bundle files.
    pub suffix: String,
}

impl Default for DescriptorDirConfig {
    fn default() -> Self {
        Self {
            directory: None,
            suffix: ".desc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderConfig {
    /// Nesting limit for messages and groups.
    pub max_depth: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    pub simple_name_policy: SimpleNamePolicy,
}

impl ProtolensConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document means "all defaults".
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decoder.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "decoder.max_depth must be at least 1".to_string(),
            ));
        }
        if self.protobufdesc.suffix.is_empty() {
            return Err(ConfigError::Invalid(
                "protobufdesc.suffix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.protobufdesc.directory = Some(directory.into());
        self
    }

    pub fn with_policy(mut self, policy: SimpleNamePolicy) -> Self {
        self.index.simple_name_policy = policy;
        self
    }

    /// Names of bundle files in the descriptor directory, sorted.
    ///
    /// Symlinks count when they point at a regular file. Empty when no
    /// directory is configured or it cannot be listed.
    pub fn desc_files(&self) -> Vec<String> {
        let Some(directory) = &self.protobufdesc.directory else {
            return Vec::new();
        };
        let Ok(entries) = std::fs::read_dir(directory) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                std::fs::metadata(entry.path())
                    .map(|m| m.is_file())
                    .unwrap_or(false)
            })
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(&self.protobufdesc.suffix))
            .collect();
        names.sort();
        names
    }

    /// `name` joined onto the descriptor directory (or as-is without one).
    pub fn full_path(&self, name: &str) -> PathBuf {
        match &self.protobufdesc.directory {
            Some(directory) => directory.join(name),
            None => PathBuf::from(name),
        }
    }
}
