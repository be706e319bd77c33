//! Filesystem adapters: catalog file source and artifact writer.

use crate::assembler::Artifact;
use crate::errors::{CatalogError, EmitError};
use crate::ports::{ArtifactSink, CatalogSource};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads the catalog from a file on disk.
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    /// Source reading `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path being read.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for FileCatalogSource {
    fn load(&self) -> Result<String, CatalogError> {
        fs::read_to_string(&self.path).map_err(|source| CatalogError::Read {
            path: self.path.clone(),
            source,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Writes artifacts below an output root, creating directories as needed.
///
/// Existing files are overwritten.
#[derive(Debug, Clone)]
pub struct FsEmitter {
    root: PathBuf,
}

impl FsEmitter {
    /// Emitter writing below `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Output root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactSink for FsEmitter {
    fn write(&self, artifact: &Artifact) -> Result<(), EmitError> {
        let path = self.root.join(&artifact.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| EmitError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, artifact.contents.as_bytes())
            .map_err(|source| EmitError::Write { path: path.clone(), source })?;
        debug!(path = %path.display(), bytes = artifact.len(), "wrote artifact");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::ArtifactKind;
    use std::io::Write;

    fn artifact(path: &str, contents: &str) -> Artifact {
        Artifact {
            kind: ArtifactKind::TestContract,
            path: PathBuf::from(path),
            contents: contents.to_string(),
        }
    }

    #[test]
    fn test_file_source_reads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"func Add() {}\n").unwrap();

        let source = FileCatalogSource::new(file.path());
        assert_eq!(source.load().unwrap(), "func Add() {}\n");
        assert_eq!(source.describe(), file.path().display().to_string());
    }

    #[test]
    fn test_file_source_missing() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileCatalogSource::new(dir.path().join("absent.go"));
        assert!(matches!(source.load(), Err(CatalogError::Read { .. })));
    }

    #[test]
    fn test_emitter_creates_dirs_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = FsEmitter::new(dir.path());

        emitter.write(&artifact("tests/AddTest.sol", "old")).unwrap();
        emitter.write(&artifact("tests/AddTest.sol", "new")).unwrap();

        let written = fs::read_to_string(dir.path().join("tests/AddTest.sol")).unwrap();
        assert_eq!(written, "new");
    }

    #[test]
    fn test_emitter_reports_blocked_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tests"), "not a directory").unwrap();

        let emitter = FsEmitter::new(dir.path());
        let err = emitter.write(&artifact("tests/AddTest.sol", "x")).unwrap_err();
        assert!(matches!(err, EmitError::CreateDir { .. }));
    }
}
