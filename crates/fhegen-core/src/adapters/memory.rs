//! In-memory adapters for tests and dry runs.

use crate::assembler::Artifact;
use crate::errors::{CatalogError, EmitError};
use crate::ports::{ArtifactSink, CatalogSource};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Catalog text held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    text: String,
}

impl InMemoryCatalog {
    /// Source returning `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl CatalogSource for InMemoryCatalog {
    fn load(&self) -> Result<String, CatalogError> {
        Ok(self.text.clone())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}

/// Collects written artifacts keyed by relative path.
#[derive(Debug, Default)]
pub struct InMemorySink {
    files: RwLock<BTreeMap<PathBuf, String>>,
}

impl InMemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents written at `path`, if any.
    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        self.files.read().get(path.as_ref()).cloned()
    }

    /// Written paths in sorted order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.read().keys().cloned().collect()
    }

    /// Number of distinct paths written.
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// Whether nothing was written.
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl ArtifactSink for InMemorySink {
    fn write(&self, artifact: &Artifact) -> Result<(), EmitError> {
        self.files
            .write()
            .insert(artifact.path.clone(), artifact.contents.clone());
        Ok(())
    }
}
