//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - API for callers such as the CLI
//! - Driven Ports (outbound) - catalog text source, catalog parser, artifact sink

pub mod inbound;
pub mod outbound;

pub use inbound::{CodeGenerator, GenerationReport, WrittenFile};
pub use outbound::{ArtifactSink, CatalogSource, OperationExtractor};
