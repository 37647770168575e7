// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Atomic loading of a descriptor bundle from disk.

use crate::bundle::{container, linker};
use crate::error::{Error, Result};
use crate::index::{SimpleNamePolicy, TypeIndex};
use crate::logging::Diagnostics;
use prost_reflect::Syntax;
use std::path::{Path, PathBuf};

/// A file schema whose imports are linked into the bundle arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFileSchema {
    pub name: String,
    pub package: String,
    pub syntax: Syntax,
    /// Direct imports, by file name.
    pub imports: Vec<String>,
    /// Subset of `imports` re-exported with `import public`.
    pub public_imports: Vec<String>,
    /// Fully-qualified names of the message types declared here, nested included.
    pub messages: Vec<String>,
    /// Fully-qualified names of the enums declared here, nested included.
    pub enums: Vec<String>,
}

/// A linked bundle and its type index. Immutable once built.
#[derive(Debug)]
pub struct LoadedBundle {
    path: PathBuf,
    files: Vec<ResolvedFileSchema>,
    index: TypeIndex,
}

impl LoadedBundle {
    /// Path the bundle was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolved file schemas in bundle order.
    pub fn files(&self) -> &[ResolvedFileSchema] {
        &self.files
    }

    pub fn index(&self) -> &TypeIndex {
        &self.index
    }

    pub fn file(&self, name: &str) -> Option<&ResolvedFileSchema> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Direct imports of `name`.
    pub fn dependencies_of(&self, name: &str) -> Option<&[String]> {
        self.file(name).map(|f| f.imports.as_slice())
    }
}

/// Read, parse and link the bundle at `path`.
///
/// Nothing is returned unless every file links.
pub fn load_bundle(
    path: impl AsRef<Path>,
    policy: SimpleNamePolicy,
    diagnostics: &Diagnostics,
) -> Result<LoadedBundle> {
    let path = path.as_ref();
    diagnostics.debug(format_args!("loading descriptor bundle {}", path.display()));
    let bytes = std::fs::read(path).map_err(|source| {
        diagnostics.error(format_args!("cannot read {}: {}", path.display(), source));
        Error::FileAccess {
            path: path.to_path_buf(),
            source,
        }
    })?;
    load_bundle_bytes(path, &bytes, policy, diagnostics)
}

/// Parse and link bundle bytes; `path` labels errors and the result.
pub fn load_bundle_bytes(
    path: impl AsRef<Path>,
    bytes: &[u8],
    policy: SimpleNamePolicy,
    diagnostics: &Diagnostics,
) -> Result<LoadedBundle> {
    let path = path.as_ref();
    let set = container::parse(bytes).map_err(|source| {
        diagnostics.error(format_args!(
            "{}: not a descriptor set: {}",
            path.display(),
            source
        ));
        Error::ContainerParse {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let linked = linker::link(set).map_err(|source| {
        diagnostics.error(format_args!("{}: {}", path.display(), source));
        Error::SchemaValidation {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let index = TypeIndex::new(linked.pool, policy);
    diagnostics.info(format_args!(
        "loaded {}: {} file(s), {} message type(s), {} enum(s)",
        path.display(),
        linked.files.len(),
        index.len(),
        index.enum_count()
    ));
    Ok(LoadedBundle {
        path: path.to_path_buf(),
        files: linked.files,
        index,
    })
}
