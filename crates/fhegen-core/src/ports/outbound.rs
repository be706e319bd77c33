//! Outbound Ports (Driven Ports)
//!
//! Dependencies of the generator: where the catalog text comes from, how it
//! is parsed, and where artifacts go.

use crate::assembler::Artifact;
use crate::domain::operation::OperationSpec;
use crate::errors::{CatalogError, EmitError};

/// Source of the operation catalog text.
pub trait CatalogSource: Send + Sync {
    /// Read the full catalog text.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Read`] when the text is unavailable.
    fn load(&self) -> Result<String, CatalogError>;

    /// Human-readable origin, for logs.
    fn describe(&self) -> String;
}

/// Turns catalog text into operation metadata.
pub trait OperationExtractor: Send + Sync {
    /// Extract every recognized operation, in catalog order.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NoOperations`] when nothing is recognized, or an
    /// annotation error.
    fn extract(&self, text: &str) -> Result<Vec<OperationSpec>, CatalogError>;
}

/// Destination of generated artifacts.
pub trait ArtifactSink: Send + Sync {
    /// Write one artifact, replacing any previous content at its path.
    ///
    /// # Errors
    ///
    /// [`EmitError`] on I/O failure.
    fn write(&self, artifact: &Artifact) -> Result<(), EmitError>;
}
