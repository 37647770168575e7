// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Memoized bundle loads.
//!
//! A cached bundle is reused while the file's modification time and length
//! are unchanged. Any change triggers a reload on the next [`BundleCache::load`].
//! Loads run outside the lock, so two threads missing at once may both parse
//! the file; the last insert wins and both results are equivalent.

use crate::bundle::{load_bundle, LoadedBundle};
use crate::error::{Error, Result};
use crate::index::SimpleNamePolicy;
use crate::logging::Diagnostics;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    fn of(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path).map_err(|source| Error::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

#[derive(Debug)]
struct CacheEntry {
    stamp: FileStamp,
    bundle: Arc<LoadedBundle>,
}

/// Thread-safe cache of loaded bundles keyed by path.
#[derive(Debug)]
pub struct BundleCache {
    entries: RwLock<HashMap<PathBuf, CacheEntry>>,
    policy: SimpleNamePolicy,
    diagnostics: Diagnostics,
}

impl BundleCache {
    pub fn new(policy: SimpleNamePolicy, diagnostics: Diagnostics) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            policy,
            diagnostics,
        }
    }

    /// Return the bundle at `path`, loading it if absent or changed on disk.
    ///
    /// A failed reload leaves the previous entry in place.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Arc<LoadedBundle>> {
        let path = path.as_ref();
        let stamp = FileStamp::of(path).map_err(|err| {
            self.diagnostics.error(&err);
            err
        })?;

        let stale = match self.entries.read().get(path) {
            Some(entry) if entry.stamp == stamp => {
                self.diagnostics
                    .debug(format_args!("bundle cache hit: {}", path.display()));
                return Ok(Arc::clone(&entry.bundle));
            }
            Some(_) => true,
            None => false,
        };
        self.diagnostics.debug(format_args!(
            "bundle cache {}: {}",
            if stale { "reload" } else { "miss" },
            path.display()
        ));

        let bundle = Arc::new(load_bundle(path, self.policy, &self.diagnostics)?);
        self.entries.write().insert(
            path.to_path_buf(),
            CacheEntry {
                stamp,
                bundle: Arc::clone(&bundle),
            },
        );
        Ok(bundle)
    }

    /// Cached bundle for `path`, without checking the file.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Arc<LoadedBundle>> {
        self.entries
            .read()
            .get(path.as_ref())
            .map(|entry| Arc::clone(&entry.bundle))
    }

    /// Drop the entry for `path`. Returns whether one existed.
    pub fn invalidate(&self, path: impl AsRef<Path>) -> bool {
        self.entries.write().remove(path.as_ref()).is_some()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
