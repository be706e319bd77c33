//! Inbound Ports (Driving Ports)
//!
//! The API the command-line tool (or any embedding program) drives.

use crate::assembler::{Artifact, ArtifactKind};
use crate::errors::GeneratorResult;
use serde::Serialize;
use std::path::PathBuf;

/// One artifact of a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    /// Path relative to the output directory.
    pub path: PathBuf,
    /// Content category.
    pub kind: ArtifactKind,
    /// Size in bytes.
    pub bytes: usize,
}

impl From<&Artifact> for WrittenFile {
    fn from(artifact: &Artifact) -> Self {
        Self {
            path: artifact.path.clone(),
            kind: artifact.kind,
            bytes: artifact.len(),
        }
    }
}

/// Summary of a generation run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    /// Operations recognized in the catalog.
    pub operations: usize,
    /// Library functions generated (operations and casts).
    pub functions: usize,
    /// Artifacts produced, in emission order.
    pub files: Vec<WrittenFile>,
    /// `true` when nothing was written.
    pub dry_run: bool,
}

impl GenerationReport {
    /// Total bytes across all artifacts.
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.bytes).sum()
    }
}

/// Primary generator API (Driving Port)
pub trait CodeGenerator {
    /// Run the pipeline and write every artifact.
    ///
    /// # Errors
    ///
    /// Any fatal stage error; nothing is written when a stage before
    /// emission fails.
    fn generate(&self) -> GeneratorResult<GenerationReport>;

    /// Run the pipeline without writing and return the artifacts.
    ///
    /// # Errors
    ///
    /// Any fatal stage error before emission.
    fn plan(&self) -> GeneratorResult<Vec<Artifact>>;
}
