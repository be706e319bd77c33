//! # fhegen-core
//!
//! Generates the Solidity FHE library surface from an annotated operation
//! catalog: the `FHE` library with every typed overload, casting functions,
//! operator overloads and per-type binding libraries, plus one test contract
//! and one benchmark contract per operation and TypeScript ABI declarations.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure generation model, no I/O
//!   - `EncryptedType`, `PlaintextType`, `ValueType`: the type universe
//!   - `Catalog`: type tags, function ids, allowed-operation matrix, cast rules
//!   - `OperationSpec`: one catalog entry
//!   - `ConcreteSignature`: one overload to emit
//!
//! - **Expander** (`expander/`): operation × type combinations and casts
//!
//! - **Template Engine** (`template/`): body shape selection and rendering
//!
//! - **Assembler** (`assembler/`): library, test, benchmark and ABI files
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `CodeGenerator`: Driving port (inbound API)
//!   - `CatalogSource`, `OperationExtractor`, `ArtifactSink`: Driven ports
//!
//! - **Adapters Layer** (`adapters/`): Go catalog extractor, filesystem and
//!   in-memory sources and sinks
//!
//! - **Service Layer** (`service.rs`): `GeneratorService` implements
//!   `CodeGenerator`
//!
//! ## Guarantees
//!
//! - Output is byte-identical for identical inputs.
//! - No two emitted functions share a name and parameter-type list.
//! - Any fatal error stops the run before a file is written.
//!
//! ## Usage Example
//!
//! ```ignore
//! use fhegen_core::prelude::*;
//! use std::sync::Arc;
//!
//! let config = GeneratorConfig::default().apply_env();
//! let service = GeneratorService::new(
//!     Arc::new(FileCatalogSource::new(&config.catalog_path)),
//!     Arc::new(FsEmitter::new(&config.output_dir)),
//!     config,
//! )?;
//! let report = service.generate()?;
//! println!("{} functions", report.functions);
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod assembler;
pub mod config;
pub mod domain;
pub mod errors;
pub mod expander;
pub mod ports;
pub mod service;
pub mod template;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain
    pub use crate::domain::catalog::{Catalog, OperationFilter};
    pub use crate::domain::operation::{InputKind, OperationSpec, ReturnKind};
    pub use crate::domain::signature::{ConcreteSignature, Family, ReturnType};
    pub use crate::domain::types::{EncryptedType, FixedType, PlaintextType, ValueType};

    // Pipeline stages
    pub use crate::assembler::{Artifact, ArtifactKind, Assembler, Surface};
    pub use crate::expander::Expander;
    pub use crate::template::{GeneratedFunction, TemplateEngine};

    // Ports
    pub use crate::ports::{
        ArtifactSink, CatalogSource, CodeGenerator, GenerationReport, OperationExtractor,
        WrittenFile,
    };

    // Adapters
    pub use crate::adapters::{
        FileCatalogSource, FsEmitter, GoCatalogExtractor, InMemoryCatalog, InMemorySink,
    };

    // Configuration and errors
    pub use crate::config::GeneratorConfig;
    pub use crate::errors::{
        CatalogError, ConfigError, EmitError, ExpansionError, GeneratorError, GeneratorResult,
        TemplateError,
    };

    // Service
    pub use crate::service::GeneratorService;
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_exports() {
        use prelude::*;
        let catalog = Catalog::standard();
        assert_eq!(catalog.encrypted_types().len(), EncryptedType::ALL.len());
        let _ = GeneratorConfig::default();
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
