// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Crate error type.

use crate::bundle::SchemaError;
use crate::config::ConfigError;
use crate::decode::DecodeError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Hard failures. Each one aborts the call that raised it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot access descriptor file {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a valid descriptor set: {source}", .path.display())]
    ContainerParse {
        path: PathBuf,
        #[source]
        source: prost::DecodeError,
    },

    #[error("invalid schema in {}: {source}", .path.display())]
    SchemaValidation {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },

    #[error("message type {type_name} not found in {}", .path.display())]
    TypeNotFound { path: PathBuf, type_name: String },

    #[error(
        "message type {type_name} is ambiguous in {}: {}",
        .path.display(),
        .candidates.join(", ")
    )]
    AmbiguousType {
        path: PathBuf,
        type_name: String,
        candidates: Vec<String>,
    },

    #[error(
        "cannot decode {resolved} (requested as {type_name}) from topic {topic} with {}: {source}",
        .path.display()
    )]
    Decode {
        path: PathBuf,
        topic: String,
        /// Type name as the caller gave it.
        type_name: String,
        /// Fully-qualified name it selected.
        resolved: String,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Coarse classification of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    FileAccess,
    ContainerParse,
    SchemaValidation,
    TypeNotFound,
    Decode,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileAccess { .. } => ErrorKind::FileAccess,
            Self::ContainerParse { .. } => ErrorKind::ContainerParse,
            Self::SchemaValidation { .. } => ErrorKind::SchemaValidation,
            Self::TypeNotFound { .. } | Self::AmbiguousType { .. } => ErrorKind::TypeNotFound,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}
