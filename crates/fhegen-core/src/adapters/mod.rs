//! # Adapters Module
//!
//! Implementations of the outbound ports.
//!
//! ## Modules
//!
//! - `go_catalog`: operation extraction from annotated Go source
//! - `fs_emitter`: catalog file reading and artifact writing on disk
//! - `memory`: in-memory source and sink for tests and dry runs

pub mod fs_emitter;
pub mod go_catalog;
pub mod memory;

pub use fs_emitter::{FileCatalogSource, FsEmitter};
pub use go_catalog::GoCatalogExtractor;
pub use memory::{InMemoryCatalog, InMemorySink};
